//! Feature role classification.
//!
//! Every housing column is exactly one of ordinal, nominal, or passthrough.
//! Ordinal columns either have a [`CategoryMapping`](crate::CategoryMapping)
//! or are already integer ranks on a 1-10 scale ("pre-ranked").

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, Result};
use crate::mapping::OrdinalCatalog;

/// Unordered categorical features, expanded to indicator columns.
pub const NOMINAL_FEATURES: &[&str] = &[
    "HouseStyle",
    "Street",
    "MSZoning",
    "LotConfig",
    "Neighborhood",
    "Condition1",
    "Condition2",
    "BldgType",
    "RoofStyle",
    "RoofMatl",
    "Exterior1st",
    "Exterior2nd",
    "MasVnrType",
    "Foundation",
    "Heating",
    "CentralAir",
    "Electrical",
    "GarageType",
    "Fence",
    "MiscFeature",
    "SaleType",
    "SaleCondition",
    "MSSubClass",
    "MoSold",
    "YrSold",
];

/// Ordinal features whose values are already ranks.
pub const PRE_RANKED_FEATURES: &[&str] = &["OverallQual", "OverallCond"];

/// Numeric-looking codes that are categorical and must be read as strings.
pub const STRING_CODED_FEATURES: &[&str] = &["MSSubClass", "MoSold", "YrSold"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureRole {
    Ordinal,
    Nominal,
    Passthrough,
}

/// Declared role lists for one encoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRoles {
    /// Ordinal features with a category mapping, in mapping order.
    pub ordinal: Vec<String>,
    /// Ordinal features passed through as ranks.
    pub pre_ranked: Vec<String>,
    pub nominal: Vec<String>,
    /// Columns converted to strings before encoding.
    pub string_coded: Vec<String>,
}

impl FeatureRoles {
    /// Default housing roles with ordinal features taken from `catalog`.
    pub fn for_catalog(catalog: &OrdinalCatalog) -> Self {
        Self {
            ordinal: catalog.features().map(str::to_string).collect(),
            pre_ranked: to_owned(PRE_RANKED_FEATURES),
            nominal: to_owned(NOMINAL_FEATURES),
            string_coded: to_owned(STRING_CODED_FEATURES),
        }
    }

    /// Role of a column name; anything undeclared is passthrough.
    pub fn role_of(&self, name: &str) -> FeatureRole {
        if self.ordinal.iter().chain(&self.pre_ranked).any(|f| f == name) {
            FeatureRole::Ordinal
        } else if self.nominal.iter().any(|f| f == name) {
            FeatureRole::Nominal
        } else {
            FeatureRole::Passthrough
        }
    }

    /// Ordinal output order: mapped features, then pre-ranked ones.
    pub fn ordinal_output_order(&self) -> impl Iterator<Item = &str> {
        self.ordinal
            .iter()
            .chain(&self.pre_ranked)
            .map(String::as_str)
    }

    /// Checks the role lists are disjoint.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::BTreeSet::new();
        for name in self.ordinal.iter().chain(&self.pre_ranked).chain(&self.nominal) {
            if !seen.insert(name.as_str()) {
                return Err(FeatureError::invalid(format!(
                    "feature {name} is declared with more than one role"
                )));
            }
        }
        Ok(())
    }
}

fn to_owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_string()).collect()
}
