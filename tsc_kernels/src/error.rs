//! Errors raised while constructing or evaluating a distance kernel.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum KernelError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("incomparable series: lengths {len_a} and {len_b}")]
    IncomparableSeries { len_a: usize, len_b: usize },
}

pub type Result<T> = std::result::Result<T, KernelError>;

/// Lets kernel implementations use `?` against `tsc_traits`' boundary
/// error type without `tsc_traits` knowing about this crate.
impl From<KernelError> for tsc_traits::error::CoreError {
    fn from(e: KernelError) -> Self {
        match e {
            KernelError::InvalidParameter(msg) => tsc_traits::error::CoreError::InvalidParameter(msg),
            KernelError::IncomparableSeries { len_a, len_b } => {
                tsc_traits::error::CoreError::IncomparableSeries { len_a, len_b }
            }
        }
    }
}
