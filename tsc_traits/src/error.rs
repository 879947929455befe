//! The error taxonomy shared by every component that consumes or produces a
//! capability defined in this crate.
use thiserror::Error;

/// Errors observable at the core's boundary.
///
/// `ClassifierFailure`/`KernelFailure` wrap whatever a consumed capability
/// raised, boxed, since the core cannot know a consumer's concrete error
/// type.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("dataset is empty")]
    EmptyDataset,

    #[error("incomparable series: lengths {len_a} and {len_b}")]
    IncomparableSeries { len_a: usize, len_b: usize },

    #[error("evaluation cancelled")]
    Cancelled,

    #[error("classifier failure: {0}")]
    ClassifierFailure(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("kernel failure: {0}")]
    KernelFailure(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<tsc_data::DataError> for CoreError {
    fn from(e: tsc_data::DataError) -> Self {
        match e {
            tsc_data::DataError::InvalidParameter(msg) => CoreError::InvalidParameter(msg),
            tsc_data::DataError::EmptyDataset => CoreError::EmptyDataset,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
