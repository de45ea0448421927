//! Loading raw housing data into Polars frames.
//!
//! - **csv_frame**: CSV to `DataFrame` with per-column type inference
//! - **target**: separating the label column from the features

pub mod csv_frame;
pub mod target;

pub use csv_frame::{MISSING_TOKENS, read_housing_csv, read_housing_csv_from_reader};
pub use target::{TARGET_COLUMN, split_target};
