//! Data model for housing feature engineering.
//!
//! - **error**: [`FeatureError`] taxonomy shared by the transform crates
//! - **mapping**: ordinal [`CategoryMapping`] tables and the built-in catalog
//! - **roles**: ordinal / nominal / passthrough classification
//! - **options**: imputer and encoder configuration

pub mod error;
pub mod mapping;
pub mod options;
pub mod roles;

pub use error::{FeatureError, MISSING_VALUE, Result};
pub use mapping::{CategoryMapping, OrdinalCatalog, normalize_token};
pub use options::{EncoderOptions, ExtraFeature, ImputerOptions};
pub use roles::{
    FeatureRole, FeatureRoles, NOMINAL_FEATURES, PRE_RANKED_FEATURES, STRING_CODED_FEATURES,
};
