//! Regression estimators and feature matrices.

use housing_common::{column_f64, is_numeric_dtype};
use ndarray::{Array1, Array2};
use polars::prelude::{DataFrame, DataType};

use crate::error::{ReportError, Result};

/// A regressor that can be fitted and queried.
///
/// The learning curve clones the estimator for every fit, so an
/// implementation only needs to handle one training set per value.
pub trait Estimator {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Coefficient of determination on `(x, y)`.
    fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let predicted = self.predict(x)?;
        r2_score(y, &predicted)
    }
}

/// Predicts the mean of the training labels for every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeanRegressor {
    mean: Option<f64>,
}

impl MeanRegressor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mean(&self) -> Option<f64> {
        self.mean
    }
}

impl Estimator for MeanRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(ReportError::Shape(format!(
                "{} feature rows but {} labels",
                x.nrows(),
                y.len()
            )));
        }
        self.mean = Some(
            y.mean()
                .ok_or_else(|| ReportError::invalid("cannot fit on zero samples"))?,
        );
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let mean = self
            .mean
            .ok_or_else(|| ReportError::Estimator("MeanRegressor is not fitted".to_string()))?;
        Ok(Array1::from_elem(x.nrows(), mean))
    }
}

fn check_lengths(actual: &Array1<f64>, predicted: &Array1<f64>) -> Result<()> {
    if actual.len() != predicted.len() {
        return Err(ReportError::Shape(format!(
            "{} labels but {} predictions",
            actual.len(),
            predicted.len()
        )));
    }
    if actual.is_empty() {
        return Err(ReportError::invalid("cannot score zero samples"));
    }
    Ok(())
}

/// Root-mean-squared error.
pub fn rmse(actual: &Array1<f64>, predicted: &Array1<f64>) -> Result<f64> {
    check_lengths(actual, predicted)?;
    let mse = (actual - predicted).mapv(|r| r * r).sum() / actual.len() as f64;
    Ok(mse.sqrt())
}

/// Coefficient of determination. A constant target scores 1.0 when
/// predicted exactly and 0.0 otherwise.
pub fn r2_score(actual: &Array1<f64>, predicted: &Array1<f64>) -> Result<f64> {
    check_lengths(actual, predicted)?;
    let mean = actual.sum() / actual.len() as f64;
    let residual: f64 = (actual - predicted).mapv(|r| r * r).sum();
    let total: f64 = actual.mapv(|v| (v - mean) * (v - mean)).sum();
    if total == 0.0 {
        return Ok(if residual == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - residual / total)
}

/// Converts an encoded frame into a row-major feature matrix.
///
/// Every column must be numeric or boolean with no missing cells.
pub fn feature_matrix(df: &DataFrame) -> Result<Array2<f64>> {
    let mut matrix = Array2::<f64>::zeros((df.height(), df.width()));
    for (col_idx, column) in df.get_columns().iter().enumerate() {
        let name = column.name().as_str();
        let dtype = column.dtype();
        if !is_numeric_dtype(dtype) && dtype != &DataType::Boolean {
            return Err(ReportError::invalid(format!(
                "column {name} has non-numeric type {dtype}"
            )));
        }
        let values = column_f64(df, name)
            .map_err(|err| ReportError::invalid(format!("column {name}: {err}")))?;
        for (row_idx, value) in values.into_iter().enumerate() {
            matrix[[row_idx, col_idx]] = value.ok_or_else(|| {
                ReportError::invalid(format!("column {name} is missing a value at row {row_idx}"))
            })?;
        }
    }
    tracing::debug!(
        rows = matrix.nrows(),
        columns = matrix.ncols(),
        "Built feature matrix"
    );
    Ok(matrix)
}
