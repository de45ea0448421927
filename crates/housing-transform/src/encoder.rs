//! Categorical encoding for imputed housing data.
//!
//! The encoder splits columns by [`FeatureRole`]:
//!
//! - **passthrough** columns are copied unchanged, in input order
//! - **ordinal** columns are lower-cased and replaced by their rank
//!   (pre-ranked features such as `OverallQual` are copied as-is)
//! - **nominal** columns expand to one `UInt8` indicator per level, minus the
//!   lexicographically first level, named `{column}_{level}`
//!
//! The output is passthrough, then ordinal, then indicators.
//!
//! # Vocabulary
//!
//! Indicator columns depend on the nominal levels seen. After
//! [`CategoricalEncoder::fit`] the learned levels are reused by every
//! `transform`, so training and scoring frames share one schema. Without a
//! fit, each `transform` learns the levels of the batch it is given.

use std::collections::BTreeSet;

use housing_common::column_tokens;
use housing_common::logging::redact_value;
use housing_model::{
    CategoryMapping, EncoderOptions, FeatureError, FeatureRole, FeatureRoles, OrdinalCatalog,
    Result,
};
use polars::prelude::*;

/// Sorted nominal levels per column, learned from a frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NominalVocabulary {
    columns: Vec<(String, Vec<String>)>,
}

impl NominalVocabulary {
    /// Learns the observed levels of each named column. Nulls are ignored.
    pub fn learn<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> Result<Self> {
        let mut learned = Vec::with_capacity(columns.len());
        for name in columns {
            let name = name.as_ref();
            let levels: BTreeSet<String> = column_tokens(df, name)?.into_iter().flatten().collect();
            tracing::debug!(column = name, levels = levels.len(), "Learned nominal levels");
            learned.push((name.to_string(), levels.into_iter().collect()));
        }
        Ok(Self { columns: learned })
    }

    /// All levels of a column, baseline first.
    pub fn levels(&self, column: &str) -> Option<&[String]> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, levels)| levels.as_slice())
    }

    /// The dropped level of a column.
    pub fn baseline(&self, column: &str) -> Option<&str> {
        self.levels(column)
            .and_then(|levels| levels.first())
            .map(String::as_str)
    }

    /// Indicator column names emitted for a column.
    pub fn indicator_names(&self, column: &str) -> Vec<String> {
        self.levels(column)
            .map(|levels| {
                levels
                    .iter()
                    .skip(1)
                    .map(|level| indicator_name(column, level))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }
}

fn indicator_name(column: &str, level: &str) -> String {
    format!("{column}_{level}")
}

/// Ordinal and one-hot encoder for housing features.
#[derive(Debug, Clone)]
pub struct CategoricalEncoder {
    catalog: OrdinalCatalog,
    roles: FeatureRoles,
    vocabulary: Option<NominalVocabulary>,
    feature_names: Vec<String>,
}

impl CategoricalEncoder {
    /// Builds an encoder over the built-in tables plus any extra features.
    ///
    /// Extra features are appended to the ordinal role after the built-in
    /// ones.
    pub fn new(options: &EncoderOptions) -> Result<Self> {
        let mut catalog = OrdinalCatalog::builtin()?;
        for mapping in options.extra_mappings()? {
            tracing::info!(
                feature = mapping.feature(),
                levels = mapping.len(),
                "Adding extra ordinal feature"
            );
            catalog.push(mapping)?;
        }
        let roles = FeatureRoles::for_catalog(&catalog);
        Self::with_catalog(catalog, roles)
    }

    /// Builds an encoder from explicit tables and roles.
    ///
    /// Every ordinal role needs a mapping in `catalog`.
    pub fn with_catalog(catalog: OrdinalCatalog, roles: FeatureRoles) -> Result<Self> {
        roles.validate()?;
        if let Some(unmapped) = roles.ordinal.iter().find(|f| catalog.get(f).is_none()) {
            return Err(FeatureError::invalid(format!(
                "ordinal feature {unmapped} has no category mapping"
            )));
        }
        Ok(Self {
            catalog,
            roles,
            vocabulary: None,
            feature_names: Vec::new(),
        })
    }

    pub fn roles(&self) -> &FeatureRoles {
        &self.roles
    }

    pub fn catalog(&self) -> &OrdinalCatalog {
        &self.catalog
    }

    /// Learned nominal levels, if [`fit`](Self::fit) has run.
    pub fn vocabulary(&self) -> Option<&NominalVocabulary> {
        self.vocabulary.as_ref()
    }

    pub fn is_fitted(&self) -> bool {
        self.vocabulary.is_some()
    }

    /// Output column names of the last `transform`.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Learns the nominal vocabulary that later transforms reuse.
    pub fn fit(&mut self, df: &DataFrame) -> Result<()> {
        let _span = tracing::info_span!("encoder_fit", rows = df.height()).entered();
        self.require_columns(df)?;
        let prepared = self.coerce_string_coded(df)?;
        let vocabulary = NominalVocabulary::learn(&prepared, &self.roles.nominal)?;
        tracing::info!(
            columns = self.roles.nominal.len(),
            "Fitted nominal vocabulary"
        );
        self.vocabulary = Some(vocabulary);
        Ok(())
    }

    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Encodes `df` into a new frame and records its column names.
    ///
    /// A frame that is already encoded (no nominal column present and every
    /// ordinal column present and numeric) is returned unchanged.
    ///
    /// # Errors
    ///
    /// - `MissingColumn` if a declared ordinal or nominal column is absent
    /// - `UnmappableCategory` if an ordinal value is missing or unknown
    pub fn transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        let _span = tracing::info_span!("encode", rows = df.height()).entered();

        if self.is_already_encoded(df) {
            tracing::debug!("No categorical columns left to encode");
            self.feature_names = column_names(df);
            return Ok(df.clone());
        }

        self.require_columns(df)?;
        let prepared = self.coerce_string_coded(df)?;

        let passthrough: Vec<Column> = prepared
            .get_columns()
            .iter()
            .filter(|c| self.roles.role_of(c.name().as_str()) == FeatureRole::Passthrough)
            .cloned()
            .collect();
        let ordinal = self.encode_ordinal(&prepared)?;

        let batch_vocabulary;
        let vocabulary = match &self.vocabulary {
            Some(fitted) => fitted,
            None => {
                batch_vocabulary = NominalVocabulary::learn(&prepared, &self.roles.nominal)?;
                &batch_vocabulary
            }
        };
        let indicators = encode_nominal(&prepared, &self.roles.nominal, vocabulary)?;

        let counts = (passthrough.len(), ordinal.len(), indicators.len());
        let mut columns = passthrough;
        columns.extend(ordinal);
        columns.extend(indicators);
        let encoded = DataFrame::new(columns)?;

        tracing::info!(
            rows = encoded.height(),
            passthrough = counts.0,
            ordinal = counts.1,
            indicators = counts.2,
            fitted = self.is_fitted(),
            "Encoded categorical features"
        );
        self.feature_names = column_names(&encoded);
        Ok(encoded)
    }

    fn is_already_encoded(&self, df: &DataFrame) -> bool {
        let has_nominal = self
            .roles
            .nominal
            .iter()
            .any(|name| df.get_column_index(name).is_some());
        if has_nominal {
            return false;
        }
        self.roles.ordinal_output_order().all(|name| {
            df.column(name)
                .is_ok_and(|column| housing_common::is_numeric_dtype(column.dtype()))
        })
    }

    fn require_columns(&self, df: &DataFrame) -> Result<()> {
        let declared = self
            .roles
            .ordinal_output_order()
            .chain(self.roles.nominal.iter().map(String::as_str))
            .chain(self.roles.string_coded.iter().map(String::as_str));
        for name in declared {
            if df.get_column_index(name).is_none() {
                return Err(FeatureError::missing_column(name));
            }
        }
        Ok(())
    }

    /// Rewrites numeric-looking categorical codes as strings on a copy.
    fn coerce_string_coded(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut prepared = df.clone();
        for name in &self.roles.string_coded {
            let tokens = column_tokens(df, name)?;
            prepared.with_column(Column::new(name.as_str().into(), tokens))?;
        }
        Ok(prepared)
    }

    fn encode_ordinal(&self, df: &DataFrame) -> Result<Vec<Column>> {
        let mut columns = Vec::with_capacity(self.roles.ordinal.len() + self.roles.pre_ranked.len());
        for feature in &self.roles.ordinal {
            let mapping = self
                .catalog
                .get(feature)
                .ok_or_else(|| FeatureError::invalid(format!("no mapping for {feature}")))?;
            columns.push(map_ordinal(df, mapping)?);
        }
        for feature in &self.roles.pre_ranked {
            columns.push(df.column(feature)?.clone());
        }
        Ok(columns)
    }
}

fn map_ordinal(df: &DataFrame, mapping: &CategoryMapping) -> Result<Column> {
    let feature = mapping.feature();
    let tokens = column_tokens(df, feature)?;
    let mut ranks: Vec<i64> = Vec::with_capacity(tokens.len());
    for token in &tokens {
        let rank = token
            .as_deref()
            .and_then(|value| mapping.rank(value))
            .ok_or_else(|| {
                tracing::trace!(
                    feature,
                    value = redact_value(token.as_deref().unwrap_or_default()),
                    "Unmappable ordinal value"
                );
                FeatureError::unmappable(feature, token.as_deref())
            })?;
        ranks.push(i64::from(rank));
    }
    Ok(Column::new(feature.into(), ranks))
}

fn encode_nominal(
    df: &DataFrame,
    columns: &[String],
    vocabulary: &NominalVocabulary,
) -> Result<Vec<Column>> {
    let mut indicators = Vec::new();
    for name in columns {
        let tokens = column_tokens(df, name)?;
        let levels = vocabulary.levels(name).unwrap_or_default();

        let unseen = tokens
            .iter()
            .flatten()
            .filter(|token| !levels.contains(token))
            .count();
        if unseen > 0 {
            tracing::warn!(
                column = name.as_str(),
                rows = unseen,
                "Levels not in the fitted vocabulary encode as the baseline"
            );
        }

        for level in levels.iter().skip(1) {
            let values: Vec<u8> = tokens
                .iter()
                .map(|token| u8::from(token.as_deref() == Some(level.as_str())))
                .collect();
            indicators.push(Column::new(indicator_name(name, level).into(), values));
        }
    }
    Ok(indicators)
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}
