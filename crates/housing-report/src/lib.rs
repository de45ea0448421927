//! Learning-curve diagnostics for housing regressors.
//!
//! - **estimator**: the [`Estimator`] capability trait, a mean baseline, and
//!   conversion of an encoded frame into a feature matrix
//! - **curve**: unshuffled K-fold learning curves scored by RMSE
//! - **render**: the [`DrawingSurface`] trait and an SVG implementation
//!
//! ```no_run
//! use housing_report::{MeanRegressor, SvgSurface, learning_curve, render_learning_curve};
//! use ndarray::{Array1, Array2};
//!
//! let x = Array2::<f64>::zeros((20, 3));
//! let y = Array1::<f64>::linspace(1.0, 20.0, 20);
//! let curve = learning_curve(&MeanRegressor::new(), &x, &y, 5)?;
//! let mut svg = SvgSurface::new(640.0, 480.0);
//! render_learning_curve(&curve, &mut svg)?;
//! std::fs::write("curve.svg", svg.to_svg()?)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod curve;
pub mod error;
pub mod estimator;
pub mod render;

pub use curve::{
    Fold, LearningCurve, ReportOptions, k_fold, learning_curve, learning_curve_with_options,
    train_sizes,
};
pub use error::{ReportError, Result};
pub use estimator::{Estimator, MeanRegressor, feature_matrix, r2_score, rmse};
pub use render::{
    Bounds, Color, DrawingSurface, LineStyle, Marker, SeriesStyle, SvgSurface,
    render_learning_curve,
};
