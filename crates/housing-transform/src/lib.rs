//! Imputation and categorical encoding for housing data.
//!
//! - **imputer**: fixed per-column fill rules plus the `LotFrontage` median
//! - **encoder**: ordinal ranks and one-hot indicators with a reusable
//!   nominal vocabulary
//! - **pipeline**: imputer and encoder run in sequence
//!
//! Every operation takes a `&DataFrame` and returns a new one.

pub mod encoder;
pub mod imputer;
pub mod pipeline;

pub use encoder::{CategoricalEncoder, NominalVocabulary};
pub use imputer::{FILL_RULES, FillRule, FillValue, Imputer, LOT_FRONTAGE};
pub use pipeline::FeaturePipeline;
