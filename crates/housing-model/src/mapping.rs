//! Ordinal category tables.
//!
//! Each ordinal housing feature carries a [`CategoryMapping`] from a
//! lower-cased token to a 1-based rank. The rank order follows the quality or
//! condition scale the data dictionary documents, e.g. for the shared quality
//! scale:
//!
//! ```text
//! po (Poor) < fa (Fair) < ta (Typical) < gd (Good) < ex (Excellent)
//! ```
//!
//! Features whose "not present" state is meaningful (no basement, no pool)
//! rank the imputed `none` token first.
//!
//! The built-in tables ship as `data/ordinal_mappings.csv` with one
//! `feature,token,rank` row per level, grouped by feature in declaration
//! order.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;

use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, Result};

const BUILTIN_ORDINAL_TABLE: &str = include_str!("../data/ordinal_mappings.csv");

/// Normalizes a raw category value to its lookup token.
pub fn normalize_token(raw: &str) -> String {
    raw.to_lowercase()
}

/// Rank table for a single ordinal feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMapping {
    feature: String,
    ranks: BTreeMap<String, u32>,
}

impl CategoryMapping {
    /// Builds a mapping from `(token, rank)` pairs.
    ///
    /// Tokens are lower-cased. The mapping must be non-empty, tokens unique
    /// after normalization, and ranks exactly `1..=n`.
    pub fn new<I, S>(feature: impl Into<String>, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: AsRef<str>,
    {
        let feature = feature.into();
        if feature.trim().is_empty() {
            return Err(FeatureError::invalid("feature name must not be empty"));
        }

        let mut ranks = BTreeMap::new();
        for (token, rank) in entries {
            let token = normalize_token(token.as_ref());
            if token.is_empty() {
                return Err(FeatureError::invalid(format!(
                    "{feature}: category token must not be empty"
                )));
            }
            if ranks.insert(token.clone(), rank).is_some() {
                return Err(FeatureError::invalid(format!(
                    "{feature}: duplicate category token {token:?}"
                )));
            }
        }
        if ranks.is_empty() {
            return Err(FeatureError::invalid(format!(
                "{feature}: category mapping must not be empty"
            )));
        }

        let seen: BTreeSet<u32> = ranks.values().copied().collect();
        let expected: BTreeSet<u32> = (1..=ranks.len() as u32).collect();
        if seen != expected {
            return Err(FeatureError::invalid(format!(
                "{feature}: ranks must be contiguous from 1 to {}, got {:?}",
                ranks.len(),
                seen
            )));
        }

        Ok(Self { feature, ranks })
    }

    /// Builds a mapping where each level's rank is its 1-based position.
    pub fn from_levels<S: AsRef<str>>(feature: impl Into<String>, levels: &[S]) -> Result<Self> {
        Self::new(
            feature,
            levels
                .iter()
                .zip(1u32..)
                .map(|(level, rank)| (level.as_ref(), rank)),
        )
    }

    pub fn feature(&self) -> &str {
        &self.feature
    }

    /// Looks up the rank of a raw value, normalizing it first.
    pub fn rank(&self, raw: &str) -> Option<u32> {
        self.ranks.get(&normalize_token(raw)).copied()
    }

    /// Tokens ordered from rank 1 upward.
    pub fn levels(&self) -> Vec<&str> {
        let mut levels: Vec<(&str, u32)> = self
            .ranks
            .iter()
            .map(|(token, rank)| (token.as_str(), *rank))
            .collect();
        levels.sort_by_key(|(_, rank)| *rank);
        levels.into_iter().map(|(token, _)| token).collect()
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct OrdinalRow {
    feature: String,
    token: String,
    rank: u32,
}

/// Ordered collection of ordinal mappings, one per feature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdinalCatalog {
    mappings: Vec<CategoryMapping>,
}

impl OrdinalCatalog {
    /// Loads the 21 built-in housing mappings.
    pub fn builtin() -> Result<Self> {
        Self::from_csv_reader(BUILTIN_ORDINAL_TABLE.as_bytes())
    }

    /// Loads mappings from `feature,token,rank` CSV rows.
    ///
    /// Features keep the order of their first row.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut order: Vec<String> = Vec::new();
        let mut grouped: BTreeMap<String, Vec<(String, u32)>> = BTreeMap::new();
        for row in reader.deserialize::<OrdinalRow>() {
            let row = row?;
            let entries = grouped.entry(row.feature.clone()).or_insert_with(|| {
                order.push(row.feature.clone());
                Vec::new()
            });
            entries.push((row.token, row.rank));
        }

        let mut catalog = Self::default();
        for feature in order {
            let entries = grouped.remove(&feature).unwrap_or_default();
            catalog.push(CategoryMapping::new(feature, entries)?)?;
        }
        tracing::debug!(features = catalog.len(), "Loaded ordinal category tables");
        Ok(catalog)
    }

    /// Appends a mapping; a feature may only be mapped once.
    pub fn push(&mut self, mapping: CategoryMapping) -> Result<()> {
        if self.get(mapping.feature()).is_some() {
            return Err(FeatureError::invalid(format!(
                "feature {} already has a category mapping",
                mapping.feature()
            )));
        }
        self.mappings.push(mapping);
        Ok(())
    }

    pub fn get(&self, feature: &str) -> Option<&CategoryMapping> {
        self.mappings.iter().find(|m| m.feature() == feature)
    }

    /// Feature names in declaration order.
    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.mappings.iter().map(CategoryMapping::feature)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryMapping> {
        self.mappings.iter()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}
