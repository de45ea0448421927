//! Imputation followed by encoding.

use housing_model::{EncoderOptions, ImputerOptions, Result};
use polars::prelude::DataFrame;

use crate::encoder::CategoricalEncoder;
use crate::imputer::Imputer;

/// Runs the [`Imputer`] and then the [`CategoricalEncoder`].
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    imputer: Imputer,
    encoder: CategoricalEncoder,
}

impl FeaturePipeline {
    pub fn new(imputer: ImputerOptions, encoder: &EncoderOptions) -> Result<Self> {
        Ok(Self {
            imputer: Imputer::new(imputer),
            encoder: CategoricalEncoder::new(encoder)?,
        })
    }

    pub fn from_parts(imputer: Imputer, encoder: CategoricalEncoder) -> Self {
        Self { imputer, encoder }
    }

    pub fn imputer(&self) -> &Imputer {
        &self.imputer
    }

    pub fn encoder(&self) -> &CategoricalEncoder {
        &self.encoder
    }

    /// Learns the nominal vocabulary from the imputed training frame.
    pub fn fit(&mut self, df: &DataFrame) -> Result<()> {
        let imputed = self.imputer.transform(df)?;
        self.encoder.fit(&imputed)
    }

    pub fn transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        let imputed = self.imputer.transform(df)?;
        self.encoder.transform(&imputed)
    }

    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        let imputed = self.imputer.transform(df)?;
        self.encoder.fit_transform(&imputed)
    }

    /// Output column names of the last transform.
    pub fn feature_names(&self) -> &[String] {
        self.encoder.feature_names()
    }
}
