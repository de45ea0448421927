//! Configuration options for imputation and encoding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FeatureError, Result};
use crate::mapping::CategoryMapping;

/// Options for the missing-value imputer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImputerOptions {
    /// Run the full rule set, `LotFrontage` median included, even when
    /// `impute_lot_frontage` is set.
    #[serde(default)]
    pub impute_all: bool,

    /// Fill only `LotFrontage` with its median and stop. Ignored when
    /// `impute_all` is set; with both flags off the full rule set runs.
    #[serde(default, alias = "impute_lotfrontage")]
    pub impute_lot_frontage: bool,
}

impl ImputerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_impute_all(mut self, enable: bool) -> Self {
        self.impute_all = enable;
        self
    }

    pub fn with_impute_lot_frontage(mut self, enable: bool) -> Self {
        self.impute_lot_frontage = enable;
        self
    }

    /// True when the call stops after the `LotFrontage` median.
    pub fn lot_frontage_only(&self) -> bool {
        self.impute_lot_frontage && !self.impute_all
    }
}

/// An additional ordinal feature supplied at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraFeature {
    pub name: String,
    /// Raw token to 1-based rank.
    pub mapping: BTreeMap<String, u32>,
}

impl ExtraFeature {
    pub fn new(name: impl Into<String>, mapping: BTreeMap<String, u32>) -> Self {
        Self {
            name: name.into(),
            mapping,
        }
    }

    /// Validates into a [`CategoryMapping`].
    pub fn to_mapping(&self) -> Result<CategoryMapping> {
        CategoryMapping::new(
            self.name.clone(),
            self.mapping
                .iter()
                .map(|(token, rank)| (token.as_str(), *rank)),
        )
    }
}

/// Options for the categorical encoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderOptions {
    /// Extra ordinal features appended after the built-in ones.
    #[serde(default)]
    pub extra_features: Option<Vec<ExtraFeature>>,
}

impl EncoderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extra_feature(mut self, feature: ExtraFeature) -> Self {
        self.extra_features.get_or_insert_with(Vec::new).push(feature);
        self
    }

    /// Parses the `{"extra_feats": [[name, {token: rank}], ...]}` shape.
    ///
    /// `extra_feats` may be absent or null. Anything other than a list of
    /// `[name, mapping]` pairs is an `InvalidArgument`.
    pub fn from_json(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(FeatureError::invalid(format!(
                "encoder options must be an object, got {} instead",
                json_type(value)
            )));
        };

        let extra = match map.get("extra_feats") {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => Some(
                items
                    .iter()
                    .enumerate()
                    .map(|(idx, item)| parse_extra_feature(idx, item))
                    .collect::<Result<Vec<_>>>()?,
            ),
            Some(other) => {
                return Err(FeatureError::invalid(format!(
                    "extra_feats must be a list, got {} instead",
                    json_type(other)
                )));
            }
        };

        Ok(Self {
            extra_features: extra,
        })
    }

    /// Validates every extra feature into a mapping.
    pub fn extra_mappings(&self) -> Result<Vec<CategoryMapping>> {
        self.extra_features
            .iter()
            .flatten()
            .map(ExtraFeature::to_mapping)
            .collect()
    }
}

fn parse_extra_feature(idx: usize, item: &Value) -> Result<ExtraFeature> {
    let pair_error = || {
        FeatureError::invalid(format!(
            "extra_feats[{idx}] must be a [name, mapping] pair, got {}",
            json_type(item)
        ))
    };

    let Value::Array(pair) = item else {
        return Err(pair_error());
    };
    let [Value::String(name), Value::Object(entries)] = pair.as_slice() else {
        return Err(pair_error());
    };

    let mut mapping = BTreeMap::new();
    for (token, rank) in entries {
        let rank = rank
            .as_u64()
            .and_then(|r| u32::try_from(r).ok())
            .filter(|r| *r > 0)
            .ok_or_else(|| {
                FeatureError::invalid(format!(
                    "extra_feats[{idx}]: rank for {token:?} must be a positive integer"
                ))
            })?;
        mapping.insert(token.clone(), rank);
    }
    Ok(ExtraFeature::new(name.clone(), mapping))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn imputer_flags() {
        let options = ImputerOptions::new().with_impute_lot_frontage(true);
        assert!(options.lot_frontage_only());
        assert!(!options.with_impute_all(true).lot_frontage_only());
        assert!(!ImputerOptions::default().lot_frontage_only());
    }

    #[test]
    fn imputer_options_accept_legacy_key() {
        let options: ImputerOptions =
            serde_json::from_value(json!({"impute_lotfrontage": true})).unwrap();
        assert!(options.impute_lot_frontage);
        assert!(!options.impute_all);
    }

    #[test]
    fn parses_extra_feats_pairs() {
        let value = json!({"extra_feats": [["Roof", {"low": 1, "high": 2}]]});
        let options = EncoderOptions::from_json(&value).unwrap();
        let mappings = options.extra_mappings().unwrap();
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].feature(), "Roof");
        assert_eq!(mappings[0].rank("High"), Some(2));
    }

    #[test]
    fn absent_extra_feats_is_none() {
        assert_eq!(
            EncoderOptions::from_json(&json!({})).unwrap(),
            EncoderOptions::default()
        );
        assert_eq!(
            EncoderOptions::from_json(&json!({"extra_feats": null})).unwrap(),
            EncoderOptions::default()
        );
    }

    #[test]
    fn non_list_extra_feats_is_invalid() {
        let err = EncoderOptions::from_json(&json!({"extra_feats": {"Roof": {}}})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument: extra_feats must be a list, got object instead"
        );
    }

    #[test]
    fn malformed_pair_is_invalid() {
        let err = EncoderOptions::from_json(&json!({"extra_feats": [["Roof"]]})).unwrap_err();
        assert!(matches!(err, FeatureError::InvalidArgument(_)));

        let err =
            EncoderOptions::from_json(&json!({"extra_feats": [["Roof", {"low": 0}]]})).unwrap_err();
        assert!(err.to_string().contains("positive integer"));
    }
}
