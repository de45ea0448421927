//! Raw housing frames for integration tests.

#![allow(dead_code)]

use housing_model::{NOMINAL_FEATURES, OrdinalCatalog, PRE_RANKED_FEATURES, STRING_CODED_FEATURES};
use housing_transform::{FILL_RULES, FillValue, LOT_FRONTAGE};
use polars::prelude::*;

/// Numeric columns that no rule or role touches.
pub const PASSTHROUGH: &[&str] = &["Id", "LotArea", "GrLivArea"];

/// A frame with every column the imputer and encoder read, fully populated
/// with valid values. Nominal columns hold the single level `"A"`, string
/// coded columns hold `1`.
pub fn raw_housing_frame(height: usize) -> DataFrame {
    let catalog = OrdinalCatalog::builtin().expect("builtin catalog");
    let mut columns: Vec<Column> = Vec::new();

    for (offset, name) in PASSTHROUGH.iter().enumerate() {
        let values: Vec<i64> = (0..height as i64).map(|i| i + 1 + offset as i64 * 1000).collect();
        columns.push(Column::new((*name).into(), values));
    }
    columns.push(Column::new(LOT_FRONTAGE.into(), vec![65.0; height]));

    for rule in FILL_RULES {
        if matches!(rule.fill, FillValue::Zero) {
            columns.push(Column::new(rule.column.into(), vec![1.0; height]));
        }
    }
    for mapping in catalog.iter() {
        let level = mapping.levels()[0].to_string();
        columns.push(Column::new(mapping.feature().into(), vec![level; height]));
    }
    for name in PRE_RANKED_FEATURES {
        columns.push(Column::new((*name).into(), vec![5i64; height]));
    }
    for name in NOMINAL_FEATURES {
        if STRING_CODED_FEATURES.contains(name) {
            columns.push(Column::new((*name).into(), vec![1i64; height]));
        } else {
            columns.push(Column::new((*name).into(), vec!["A"; height]));
        }
    }
    DataFrame::new(columns).expect("raw housing frame")
}

/// Replaces a column with string values (`None` is missing).
pub fn set_strings(df: &mut DataFrame, name: &str, values: &[Option<&str>]) {
    df.with_column(Column::new(name.into(), values.to_vec()))
        .expect("replace string column");
}

/// Replaces a column with float values (`None` is missing).
pub fn set_floats(df: &mut DataFrame, name: &str, values: &[Option<f64>]) {
    df.with_column(Column::new(name.into(), values.to_vec()))
        .expect("replace float column");
}

/// Replaces a column with nulls of the given dtype.
pub fn set_missing(df: &mut DataFrame, name: &str, dtype: &DataType) {
    let height = df.height();
    df.with_column(Column::full_null(name.into(), height, dtype))
        .expect("replace with nulls");
}
