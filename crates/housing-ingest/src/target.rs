use anyhow::{Context, Result, bail};
use housing_common::column_f64;
use polars::prelude::DataFrame;

/// Label column of the housing data.
pub const TARGET_COLUMN: &str = "SalePrice";

/// Removes the label column and returns it as numbers.
///
/// Every label must be present and numeric.
pub fn split_target(df: &DataFrame, target: &str) -> Result<(DataFrame, Vec<f64>)> {
    let values = column_f64(df, target).with_context(|| format!("read target {target}"))?;
    let mut labels = Vec::with_capacity(values.len());
    for (row, value) in values.into_iter().enumerate() {
        let Some(value) = value else {
            bail!("target {target} is missing or not numeric at row {row}");
        };
        labels.push(value);
    }
    let features = df
        .drop(target)
        .with_context(|| format!("drop target {target}"))?;
    tracing::debug!(column = target, rows = labels.len(), "Split target column");
    Ok((features, labels))
}
