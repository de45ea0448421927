//! Missing-value imputation with fixed housing rules.
//!
//! Most gaps in the housing data mean "feature not present" (no pool, no
//! garage) and are filled with the `"None"` category or `0`. A handful of
//! categorical columns get the dominant level from the data dictionary, and
//! `LotFrontage` gets the median of the batch being transformed.
//!
//! All fills are applied in one pass over a copy of the input frame.

use housing_common::column_f64;
use housing_model::{FeatureError, ImputerOptions, Result};
use polars::prelude::*;

/// Continuous column filled with its batch median.
pub const LOT_FRONTAGE: &str = "LotFrontage";

/// Value written into missing cells of a rule column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillValue {
    /// Categorical literal.
    Text(&'static str),
    /// Numeric zero.
    Zero,
}

/// One column and its fill value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillRule {
    pub column: &'static str,
    pub fill: FillValue,
}

const fn none(column: &'static str) -> FillRule {
    FillRule {
        column,
        fill: FillValue::Text("None"),
    }
}

const fn zero(column: &'static str) -> FillRule {
    FillRule {
        column,
        fill: FillValue::Zero,
    }
}

const fn text(column: &'static str, value: &'static str) -> FillRule {
    FillRule {
        column,
        fill: FillValue::Text(value),
    }
}

/// The fixed-value rules. The full rule set is these plus the `LotFrontage`
/// median, applied unless only `LotFrontage` was requested.
pub const FILL_RULES: &[FillRule] = &[
    // Absent amenities
    none("PoolQC"),
    none("MiscFeature"),
    none("Alley"),
    none("Fence"),
    none("FireplaceQu"),
    // Garage
    zero("GarageYrBlt"),
    zero("GarageCars"),
    zero("GarageArea"),
    none("GarageType"),
    none("GarageFinish"),
    none("GarageQual"),
    none("GarageCond"),
    // Basement
    zero("BsmtFinSF1"),
    zero("BsmtFinSF2"),
    zero("BsmtUnfSF"),
    zero("TotalBsmtSF"),
    none("BsmtQual"),
    none("BsmtCond"),
    none("BsmtExposure"),
    none("BsmtFinType1"),
    none("BsmtFinType2"),
    // Masonry veneer
    zero("MasVnrArea"),
    none("MasVnrType"),
    zero("BsmtHalfBath"),
    zero("BsmtFullBath"),
    // Dominant levels
    text("Electrical", "SBrkr"),
    text("MSZoning", "RL"),
    text("Functional", "Typ"),
    text("Utilities", "AllPub"),
    text("SaleType", "WD"),
    text("KitchenQual", "TA"),
    text("Exterior1st", "VinylSd"),
    text("Exterior2nd", "VinylSd"),
];

/// Fills missing values according to [`FILL_RULES`] and [`ImputerOptions`].
#[derive(Debug, Clone, Default)]
pub struct Imputer {
    options: ImputerOptions,
}

impl Imputer {
    pub fn new(options: ImputerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ImputerOptions {
        &self.options
    }

    /// Returns a copy of `df` with the configured columns filled.
    ///
    /// # Errors
    ///
    /// - `MissingColumn` if `LotFrontage` or a rule column is absent
    /// - `NoObservedValues` if `LotFrontage` has no observed values
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let _span = tracing::info_span!("impute", rows = df.height()).entered();

        require_column(df, LOT_FRONTAGE)?;
        let median = batch_median(df, LOT_FRONTAGE)?;
        tracing::debug!(column = LOT_FRONTAGE, median, "Filling with batch median");
        let mut fills: Vec<Expr> = vec![
            col(LOT_FRONTAGE)
                .cast(DataType::Float64)
                .fill_nan(lit(median))
                .fill_null(lit(median)),
        ];
        if self.options.lot_frontage_only() {
            return apply_fills(df, fills);
        }

        for rule in FILL_RULES {
            require_column(df, rule.column)?;
        }
        let schema = df.schema();
        for rule in FILL_RULES {
            let dtype = schema.get(rule.column).unwrap_or(&DataType::Null);
            tracing::debug!(column = rule.column, fill = ?rule.fill, "Filling missing values");
            fills.push(fill_expr(rule, dtype));
        }

        let filled = apply_fills(df, fills)?;
        tracing::info!(
            rows = filled.height(),
            rules = FILL_RULES.len() + 1,
            "Imputed missing values"
        );
        Ok(filled)
    }
}

fn require_column(df: &DataFrame, name: &str) -> Result<()> {
    if df.get_column_index(name).is_some() {
        Ok(())
    } else {
        Err(FeatureError::missing_column(name))
    }
}

/// Median of the observed values; NaN counts as missing.
fn batch_median(df: &DataFrame, name: &str) -> Result<f64> {
    let observed: Vec<f64> = column_f64(df, name)?.into_iter().flatten().collect();
    Float64Chunked::from_vec(name.into(), observed)
        .median()
        .ok_or_else(|| FeatureError::NoObservedValues {
            column: name.to_string(),
        })
}

fn fill_expr(rule: &FillRule, dtype: &DataType) -> Expr {
    match rule.fill {
        FillValue::Text(value) => col(rule.column)
            .cast(DataType::String)
            .fill_null(lit(value)),
        FillValue::Zero if dtype.is_float() => col(rule.column)
            .fill_nan(lit(0.0))
            .fill_null(lit(0.0))
            .strict_cast(dtype.clone()),
        FillValue::Zero if dtype.is_integer() => col(rule.column)
            .fill_null(lit(0i64))
            .strict_cast(dtype.clone()),
        // Text or all-null input; unparseable cells fail instead of becoming 0.
        FillValue::Zero => col(rule.column)
            .strict_cast(DataType::Float64)
            .fill_nan(lit(0.0))
            .fill_null(lit(0.0)),
    }
}

fn apply_fills(df: &DataFrame, fills: Vec<Expr>) -> Result<DataFrame> {
    Ok(df.clone().lazy().with_columns(fills).collect()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_all_rule_columns(height: usize) -> DataFrame {
        let mut columns: Vec<Column> = FILL_RULES
            .iter()
            .map(|rule| {
                let dtype = match rule.fill {
                    FillValue::Text(_) => DataType::String,
                    FillValue::Zero => DataType::Float64,
                };
                Column::full_null(rule.column.into(), height, &dtype)
            })
            .collect();
        columns.push(Column::new(
            LOT_FRONTAGE.into(),
            [Some(60.0), None, Some(80.0), Some(70.0)][..height].to_vec(),
        ));
        DataFrame::new(columns).unwrap()
    }

    #[test]
    fn rule_columns_are_unique() {
        let mut names: Vec<&str> = FILL_RULES.iter().map(|r| r.column).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FILL_RULES.len());
    }

    #[test]
    fn lot_frontage_only_leaves_other_columns() {
        let df = frame_with_all_rule_columns(4);
        let imputer = Imputer::new(ImputerOptions::new().with_impute_lot_frontage(true));
        let out = imputer.transform(&df).unwrap();

        let lot = out.column(LOT_FRONTAGE).unwrap().f64().unwrap();
        assert_eq!(lot.get(1), Some(70.0));
        assert_eq!(out.column("PoolQC").unwrap().null_count(), 4);
    }

    #[test]
    fn lot_frontage_only_does_not_need_rule_columns() {
        let df = DataFrame::new(vec![Column::new(
            LOT_FRONTAGE.into(),
            [Some(50.0), None, Some(70.0)],
        )])
        .unwrap();
        let imputer = Imputer::new(ImputerOptions::new().with_impute_lot_frontage(true));
        let out = imputer.transform(&df).unwrap();
        assert_eq!(out.column(LOT_FRONTAGE).unwrap().f64().unwrap().get(1), Some(60.0));
    }

    #[test]
    fn full_rule_set_includes_lot_frontage() {
        let df = frame_with_all_rule_columns(4);
        for options in [
            ImputerOptions::default(),
            ImputerOptions::new().with_impute_all(true),
        ] {
            let out = Imputer::new(options).transform(&df).unwrap();
            let lot = out.column(LOT_FRONTAGE).unwrap().f64().unwrap();
            assert_eq!(lot.get(1), Some(70.0));
            assert_eq!(out.column("PoolQC").unwrap().null_count(), 0);
        }
    }

    #[test]
    fn float32_zero_fill_keeps_dtype() {
        let mut df = frame_with_all_rule_columns(2);
        df.with_column(Column::new("GarageArea".into(), [Some(480.0f32), None]))
            .unwrap();
        let out = Imputer::default().transform(&df).unwrap();
        let area = out.column("GarageArea").unwrap();
        assert_eq!(area.dtype(), &DataType::Float32);
        assert_eq!(area.f32().unwrap().get(1), Some(0.0));
    }

    #[test]
    fn unparseable_zero_fill_text_is_an_error() {
        let mut df = frame_with_all_rule_columns(2);
        df.with_column(Column::new("MasVnrArea".into(), [Some("196"), Some("unknown")]))
            .unwrap();
        let err = Imputer::default().transform(&df).unwrap_err();
        assert!(matches!(err, FeatureError::Polars(_)));

        df.with_column(Column::new("MasVnrArea".into(), [Some("196"), None]))
            .unwrap();
        let out = Imputer::default().transform(&df).unwrap();
        let area = out.column("MasVnrArea").unwrap().f64().unwrap();
        assert_eq!(area.get(0), Some(196.0));
        assert_eq!(area.get(1), Some(0.0));
    }

    #[test]
    fn integer_zero_fill_keeps_dtype() {
        let mut df = frame_with_all_rule_columns(2);
        df.with_column(Column::new("GarageCars".into(), [Some(2i64), None]))
            .unwrap();
        let out = Imputer::default().transform(&df).unwrap();
        let cars = out.column("GarageCars").unwrap();
        assert_eq!(cars.dtype(), &DataType::Int64);
        assert_eq!(cars.i64().unwrap().get(1), Some(0));
    }

    #[test]
    fn all_missing_lot_frontage_has_no_median() {
        let df = DataFrame::new(vec![Column::full_null(
            LOT_FRONTAGE.into(),
            3,
            &DataType::Float64,
        )])
        .unwrap();
        let imputer = Imputer::new(ImputerOptions::new().with_impute_lot_frontage(true));
        let err = imputer.transform(&df).unwrap_err();
        assert!(matches!(err, FeatureError::NoObservedValues { .. }));
    }
}
