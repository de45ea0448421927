use housing_report::{
    DrawingSurface, Estimator, MeanRegressor, ReportError, ReportOptions, SvgSurface,
    learning_curve, learning_curve_with_options, render_learning_curve,
};
use ndarray::{Array1, Array2, Axis};
use tempfile::TempDir;

fn ramp(n: usize) -> (Array2<f64>, Array1<f64>) {
    let y = Array1::from_iter((0..n).map(|i| i as f64));
    let x = y.clone().insert_axis(Axis(1));
    (x, y)
}

/// Memorizes labels by the single feature value; unknown rows predict zero.
#[derive(Debug, Clone, Default)]
struct Lookup {
    seen: Vec<(f64, f64)>,
}

impl Estimator for Lookup {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> housing_report::Result<()> {
        self.seen = x.column(0).iter().copied().zip(y.iter().copied()).collect();
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> housing_report::Result<Array1<f64>> {
        Ok(x.column(0).mapv(|key| {
            self.seen
                .iter()
                .find(|(seen, _)| *seen == key)
                .map_or(0.0, |(_, label)| *label)
        }))
    }
}

#[test]
fn mean_baseline_on_a_ramp() {
    let (x, y) = ramp(10);
    let curve = learning_curve(&MeanRegressor::new(), &x, &y, 2).unwrap();

    assert_eq!(curve.train_sizes, [1, 2, 3, 4, 5]);
    assert_eq!(curve.train_scores.dim(), (5, 2));
    assert_eq!(curve.test_scores.dim(), (5, 2));

    // One sample: zero training error, validation error against the far fold.
    assert_eq!(curve.train_mean[0], 0.0);
    let expected = (11f64.sqrt() + 51f64.sqrt()) / 2.0;
    assert!((curve.test_mean[0] - expected).abs() < 1e-9);

    // Full folds are mirror images, so their scores agree.
    assert!((curve.train_mean[4] - 2f64.sqrt()).abs() < 1e-9);
    assert!((curve.test_mean[4] - 27f64.sqrt()).abs() < 1e-9);
    assert!(curve.test_std[4].abs() < 1e-9);
}

#[test]
fn population_std_over_folds() {
    let (x, y) = ramp(10);
    let curve = learning_curve(&MeanRegressor::new(), &x, &y, 2).unwrap();
    let spread = (51f64.sqrt() - 11f64.sqrt()) / 2.0;
    assert!((curve.test_std[0] - spread).abs() < 1e-9);
}

#[test]
fn memorizing_estimator_has_no_training_error() {
    let (x, y) = ramp(12);
    let curve = learning_curve(&Lookup::default(), &x, &y, 3).unwrap();
    assert!(curve.train_scores.iter().all(|score| *score == 0.0));
    assert!(curve.test_mean.iter().all(|score| *score > 0.0));
}

#[test]
fn custom_fractions_and_folds() {
    let (x, y) = ramp(20);
    let options = ReportOptions::new()
        .with_cv(4)
        .with_train_fractions(vec![0.5, 1.0]);
    let curve = learning_curve_with_options(&MeanRegressor::new(), &x, &y, &options).unwrap();
    assert_eq!(curve.train_sizes, [7, 15]);
    assert_eq!(curve.train_scores.dim(), (2, 4));
}

#[test]
fn mismatched_labels_are_rejected() {
    let (x, _) = ramp(10);
    let y = Array1::zeros(9);
    let err = learning_curve(&MeanRegressor::new(), &x, &y, 5).unwrap_err();
    assert!(matches!(err, ReportError::Shape(_)));
}

#[test]
fn too_few_samples_for_folds() {
    let (x, y) = ramp(3);
    let err = learning_curve(&MeanRegressor::new(), &x, &y, 5).unwrap_err();
    assert!(matches!(err, ReportError::InvalidArgument(_)));
}

#[test]
fn curve_serializes_for_storage() {
    let (x, y) = ramp(10);
    let curve = learning_curve(&MeanRegressor::new(), &x, &y, 2).unwrap();
    let value = serde_json::to_value(&curve).unwrap();
    assert_eq!(value["train_sizes"], serde_json::json!([1, 2, 3, 4, 5]));
    assert!(value.get("test_std").is_some());
}

#[test]
fn svg_chart_has_both_series_and_labels() {
    let (x, y) = ramp(10);
    let curve = learning_curve(&MeanRegressor::new(), &x, &y, 2).unwrap();
    let mut surface = SvgSurface::from_options(&ReportOptions::default());
    render_learning_curve(&curve, &mut surface).unwrap();

    assert_eq!(surface.legend_labels(), ["training RMSE", "validation RMSE"]);
    let svg = surface.to_svg().unwrap();
    assert!(svg.starts_with("<?xml"));
    assert!(svg.contains("<svg xmlns=\"http://www.w3.org/2000/svg\""));
    assert!(svg.contains("Number of training samples"));
    assert!(svg.contains(">RMSE<"));
    assert!(svg.contains("stroke=\"#0000ff\""));
    assert!(svg.contains("stroke=\"#008000\""));
    assert!(svg.contains("stroke-dasharray=\"6,4\""));
    assert!(svg.contains("fill-opacity=\"0.15\""));
    assert!(svg.contains("<circle"));
}

#[test]
fn chart_writes_to_disk() {
    let (x, y) = ramp(10);
    let curve = learning_curve(&MeanRegressor::new(), &x, &y, 5).unwrap();
    let mut surface = SvgSurface::new(320.0, 240.0);
    render_learning_curve(&curve, &mut surface).unwrap();

    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("curve.svg");
    surface.write_to(&path).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("validation RMSE"));
}

#[derive(Default)]
struct CallLog {
    calls: Vec<String>,
}

impl DrawingSurface for CallLog {
    fn set_bounds(&mut self, _bounds: housing_report::Bounds) {
        self.calls.push("bounds".to_string());
    }

    fn fill_between(
        &mut self,
        _xs: &[f64],
        _lower: &[f64],
        _upper: &[f64],
        color: housing_report::Color,
        alpha: f64,
    ) {
        self.calls.push(format!("band {} {alpha}", color.hex()));
    }

    fn plot(&mut self, _xs: &[f64], _ys: &[f64], style: &housing_report::SeriesStyle) {
        self.calls.push(format!("plot {}", style.label));
    }

    fn grid(&mut self) {
        self.calls.push("grid".to_string());
    }

    fn axis_labels(&mut self, x_label: &str, y_label: &str) {
        self.calls.push(format!("labels {x_label} / {y_label}"));
    }

    fn legend(&mut self) {
        self.calls.push("legend".to_string());
    }
}

#[test]
fn render_issues_calls_in_order() {
    let (x, y) = ramp(10);
    let curve = learning_curve(&MeanRegressor::new(), &x, &y, 2).unwrap();
    let mut log = CallLog::default();
    render_learning_curve(&curve, &mut log).unwrap();
    assert_eq!(
        log.calls,
        [
            "bounds",
            "plot training RMSE",
            "band #0000ff 0.15",
            "plot validation RMSE",
            "band #008000 0.15",
            "grid",
            "labels Number of training samples / RMSE",
            "legend",
        ]
    );
}
