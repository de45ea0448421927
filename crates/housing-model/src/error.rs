use polars::prelude::PolarsError;
use thiserror::Error;

/// Placeholder reported for a null cell that could not be mapped.
pub const MISSING_VALUE: &str = "<missing>";

#[derive(Debug, Error)]
pub enum FeatureError {
    /// A rule or role references a column that is not in the dataset.
    #[error("column not found: {column}")]
    MissingColumn { column: String },

    /// An ordinal value has no rank in its feature's mapping.
    #[error("value {value:?} of feature {feature} is not in its category mapping")]
    UnmappableCategory { feature: String, value: String },

    /// Configuration has the wrong shape or violates a mapping invariant.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A statistic was requested over a column with no observed values.
    #[error("column {column} has no observed values")]
    NoObservedValues { column: String },

    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("category table error: {0}")]
    Csv(#[from] csv::Error),
}

impl FeatureError {
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    pub fn unmappable(feature: impl Into<String>, value: Option<&str>) -> Self {
        Self::UnmappableCategory {
            feature: feature.into(),
            value: value.unwrap_or(MISSING_VALUE).to_string(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

pub type Result<T> = std::result::Result<T, FeatureError>;
