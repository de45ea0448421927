mod common;

use common::{raw_housing_frame, set_strings};
use housing_model::{EncoderOptions, ImputerOptions};
use housing_transform::FeaturePipeline;

#[test]
fn fitted_pipeline_scores_with_training_schema() {
    let mut train = raw_housing_frame(4);
    set_strings(
        &mut train,
        "GarageType",
        &[Some("Attchd"), None, Some("Detchd"), Some("Attchd")],
    );
    let mut test = raw_housing_frame(2);
    set_strings(&mut test, "GarageType", &[None, Some("BuiltIn")]);

    let mut pipeline = FeaturePipeline::new(
        ImputerOptions::new().with_impute_all(true),
        &EncoderOptions::default(),
    )
    .unwrap();
    let train_out = pipeline.fit_transform(&train).unwrap();
    let train_names = pipeline.feature_names().to_vec();
    let test_out = pipeline.transform(&test).unwrap();

    assert_eq!(pipeline.feature_names(), train_names.as_slice());
    assert_eq!(train_out.width(), test_out.width());
    assert!(pipeline.encoder().is_fitted());

    // Levels sort as Attchd, Detchd, None.
    let vocabulary = pipeline.encoder().vocabulary().unwrap();
    assert_eq!(vocabulary.baseline("GarageType"), Some("Attchd"));
    let none = test_out.column("GarageType_None").unwrap().u8().unwrap();
    assert_eq!(none.get(0), Some(1));
    assert_eq!(none.get(1), Some(0));
}

#[test]
fn unfitted_pipeline_learns_each_batch() {
    let mut first = raw_housing_frame(2);
    set_strings(&mut first, "CentralAir", &[Some("Y"), Some("N")]);
    let second = raw_housing_frame(2);

    let mut pipeline = FeaturePipeline::new(
        ImputerOptions::new().with_impute_all(true),
        &EncoderOptions::default(),
    )
    .unwrap();
    let wide = pipeline.transform(&first).unwrap();
    let narrow = pipeline.transform(&second).unwrap();

    assert!(!pipeline.encoder().is_fitted());
    assert_eq!(wide.width(), narrow.width() + 1);
    assert!(wide.column("CentralAir_Y").is_ok());
}
