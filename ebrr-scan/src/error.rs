//! Error types for ebrr-scan

use crate::services::SourceError;
use thiserror::Error;

/// Scan error type
#[derive(Debug, Error)]
pub enum ScanError {
    /// Remote data source failure (after retries, if transient)
    #[error("Data source error: {0}")]
    Source(#[from] SourceError),

    /// ebrr-common error (I/O, checkpoint, configuration, input)
    #[error(transparent)]
    Common(#[from] ebrr_common::Error),
}

impl From<std::io::Error> for ScanError {
    fn from(err: std::io::Error) -> Self {
        ScanError::Common(err.into())
    }
}

impl From<serde_json::Error> for ScanError {
    fn from(err: serde_json::Error) -> Self {
        ScanError::Common(err.into())
    }
}

/// Result type for scan operations
pub type ScanResult<T> = Result<T, ScanError>;
