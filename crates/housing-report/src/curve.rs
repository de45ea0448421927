//! Cross-validated learning curves.
//!
//! For each training-set size the estimator is fitted on the first `size`
//! training rows of every fold and scored by RMSE on that subset and on the
//! fold's held-out rows. Folds are contiguous and unshuffled.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::estimator::{Estimator, rmse};

const DEFAULT_CV: usize = 5;
const DEFAULT_FRACTION_START: f64 = 0.1;
const DEFAULT_FRACTION_END: f64 = 1.0;
const DEFAULT_FRACTION_COUNT: usize = 11;

/// Learning-curve and chart settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportOptions {
    /// Number of folds.
    pub cv: usize,
    /// Fractions of the largest training set, each in `(0, 1]`.
    pub train_fractions: Vec<f64>,
    /// Chart width in pixels.
    pub width: f64,
    /// Chart height in pixels.
    pub height: f64,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            cv: DEFAULT_CV,
            train_fractions: linspace(
                DEFAULT_FRACTION_START,
                DEFAULT_FRACTION_END,
                DEFAULT_FRACTION_COUNT,
            ),
            width: 640.0,
            height: 480.0,
        }
    }
}

impl ReportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cv(mut self, cv: usize) -> Self {
        self.cv = cv;
        self
    }

    pub fn with_train_fractions(mut self, fractions: Vec<f64>) -> Self {
        self.train_fractions = fractions;
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// Evenly spaced points; the last point is exactly `end`.
fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    if count < 2 {
        return vec![end; count];
    }
    let step = (end - start) / (count - 1) as f64;
    (0..count)
        .map(|i| {
            if i == count - 1 {
                end
            } else {
                start + step * i as f64
            }
        })
        .collect()
}

/// Row indices of one train/validation split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Contiguous K-fold splits; the first `n_samples % n_splits` folds hold
/// one extra validation row.
pub fn k_fold(n_samples: usize, n_splits: usize) -> Result<Vec<Fold>> {
    if n_splits < 2 {
        return Err(ReportError::invalid(format!(
            "cv must be at least 2, got {n_splits}"
        )));
    }
    if n_samples < n_splits {
        return Err(ReportError::invalid(format!(
            "cannot split {n_samples} samples into {n_splits} folds"
        )));
    }

    let base = n_samples / n_splits;
    let remainder = n_samples % n_splits;
    let mut folds = Vec::with_capacity(n_splits);
    let mut start = 0;
    for fold_idx in 0..n_splits {
        let size = if fold_idx < remainder { base + 1 } else { base };
        let end = start + size;
        folds.push(Fold {
            train: (0..start).chain(end..n_samples).collect(),
            test: (start..end).collect(),
        });
        start = end;
    }
    Ok(folds)
}

/// Absolute training sizes for `fractions` of `n_max_train`.
///
/// Sizes are floored, clipped to `[1, n_max_train]`, sorted and
/// de-duplicated.
pub fn train_sizes(fractions: &[f64], n_max_train: usize) -> Result<Vec<usize>> {
    if fractions.is_empty() {
        return Err(ReportError::invalid("no training-set fractions given"));
    }
    if n_max_train == 0 {
        return Err(ReportError::invalid("training folds are empty"));
    }
    let mut sizes = Vec::with_capacity(fractions.len());
    for &fraction in fractions {
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(ReportError::invalid(format!(
                "training-set fraction {fraction} is outside (0, 1]"
            )));
        }
        let size = (fraction * n_max_train as f64).floor() as usize;
        sizes.push(size.clamp(1, n_max_train));
    }
    sizes.sort_unstable();
    sizes.dedup();
    if sizes.len() < fractions.len() {
        tracing::warn!(
            requested = fractions.len(),
            distinct = sizes.len(),
            "Some training-set sizes coincide and were merged"
        );
    }
    Ok(sizes)
}

/// RMSE per training size and fold, with fold statistics.
///
/// Score matrices are `sizes x folds`. Standard deviations are population
/// (divide by the fold count).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningCurve {
    pub train_sizes: Vec<usize>,
    pub train_scores: Array2<f64>,
    pub test_scores: Array2<f64>,
    pub train_mean: Array1<f64>,
    pub train_std: Array1<f64>,
    pub test_mean: Array1<f64>,
    pub test_std: Array1<f64>,
}

impl LearningCurve {
    fn from_scores(
        train_sizes: Vec<usize>,
        train_scores: Array2<f64>,
        test_scores: Array2<f64>,
    ) -> Result<Self> {
        let no_folds = || ReportError::invalid("learning curve has no folds");
        Ok(Self {
            train_mean: train_scores.mean_axis(Axis(1)).ok_or_else(no_folds)?,
            train_std: train_scores.std_axis(Axis(1), 0.0),
            test_mean: test_scores.mean_axis(Axis(1)).ok_or_else(no_folds)?,
            test_std: test_scores.std_axis(Axis(1), 0.0),
            train_sizes,
            train_scores,
            test_scores,
        })
    }

    pub fn len(&self) -> usize {
        self.train_sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.train_sizes.is_empty()
    }

    /// Training sizes as chart coordinates.
    pub fn sizes_f64(&self) -> Vec<f64> {
        self.train_sizes.iter().map(|&size| size as f64).collect()
    }
}

/// Learning curve with `cv` folds and the default training fractions.
pub fn learning_curve<E>(
    estimator: &E,
    x: &Array2<f64>,
    y: &Array1<f64>,
    cv: usize,
) -> Result<LearningCurve>
where
    E: Estimator + Clone,
{
    learning_curve_with_options(estimator, x, y, &ReportOptions::default().with_cv(cv))
}

pub fn learning_curve_with_options<E>(
    estimator: &E,
    x: &Array2<f64>,
    y: &Array1<f64>,
    options: &ReportOptions,
) -> Result<LearningCurve>
where
    E: Estimator + Clone,
{
    let _span = tracing::info_span!("learning_curve", rows = x.nrows(), cv = options.cv).entered();
    if x.nrows() != y.len() {
        return Err(ReportError::Shape(format!(
            "{} feature rows but {} labels",
            x.nrows(),
            y.len()
        )));
    }

    let folds = k_fold(x.nrows(), options.cv)?;
    let n_max_train = folds.first().map_or(0, |fold| fold.train.len());
    let sizes = train_sizes(&options.train_fractions, n_max_train)?;

    let mut train_scores = Array2::<f64>::zeros((sizes.len(), folds.len()));
    let mut test_scores = Array2::<f64>::zeros((sizes.len(), folds.len()));
    for (fold_idx, fold) in folds.iter().enumerate() {
        let x_test = x.select(Axis(0), &fold.test);
        let y_test = y.select(Axis(0), &fold.test);
        for (size_idx, &size) in sizes.iter().enumerate() {
            let subset = &fold.train[..size];
            let x_train = x.select(Axis(0), subset);
            let y_train = y.select(Axis(0), subset);

            let mut model = estimator.clone();
            model.fit(&x_train, &y_train)?;
            let train_rmse = rmse(&y_train, &model.predict(&x_train)?)?;
            let test_rmse = rmse(&y_test, &model.predict(&x_test)?)?;
            train_scores[[size_idx, fold_idx]] = train_rmse;
            test_scores[[size_idx, fold_idx]] = test_rmse;
        }
        tracing::debug!(
            fold = fold_idx,
            train_rows = fold.train.len(),
            test_rows = fold.test.len(),
            "Scored fold"
        );
    }

    let curve = LearningCurve::from_scores(sizes, train_scores, test_scores)?;
    tracing::info!(
        sizes = curve.len(),
        folds = folds.len(),
        "Computed learning curve"
    );
    Ok(curve)
}
