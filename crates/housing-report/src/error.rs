use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    /// Bad fold count, fraction, or empty input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The estimator failed to fit or predict.
    #[error("estimator error: {0}")]
    Estimator(String),

    /// Feature rows and labels disagree in length.
    #[error("shape mismatch: {0}")]
    Shape(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReportError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
