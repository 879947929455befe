//! Errors raised while building or splitting the data model.
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("dataset is empty")]
    EmptyDataset,
}

pub type Result<T> = std::result::Result<T, DataError>;
