//! Shared utilities for the housing feature crates.
//!
//! This crate provides the Polars `AnyValue` helpers used when reading
//! raw housing columns, plus the `tracing` subscriber setup shared by
//! binaries and tests.

pub mod logging;
pub mod values;

// Re-export commonly used functions at crate root for convenience
pub use values::{
    any_to_f64, any_to_string, column_f64, column_tokens, format_numeric, is_numeric_dtype,
    parse_f64,
};
