//! Error types for NRRD volume operations

use thiserror::Error;

/// Main error type for loading and querying volumes
#[derive(Error, Debug)]
pub enum NrrdError {
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    #[error("Unsupported format: field '{key}' must be '{expected}', found '{actual}'")]
    UnsupportedFormat {
        key: String,
        expected: String,
        actual: String,
    },

    #[error("Corrupt payload: {0}")]
    CorruptPayload(String),

    #[error("Index {coords:?} out of range for volume of size {sizes:?}")]
    IndexOutOfRange { coords: [usize; 3], sizes: [usize; 3] },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error category, independent of the message payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedHeader,
    UnsupportedFormat,
    CorruptPayload,
    IndexOutOfRange,
    InvalidGeometry,
    LimitExceeded,
    Io,
}

impl NrrdError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NrrdError::MalformedHeader(_) => ErrorKind::MalformedHeader,
            NrrdError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            NrrdError::CorruptPayload(_) => ErrorKind::CorruptPayload,
            NrrdError::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            NrrdError::InvalidGeometry(_) => ErrorKind::InvalidGeometry,
            NrrdError::LimitExceeded(_) => ErrorKind::LimitExceeded,
            NrrdError::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn unsupported(key: &str, expected: &str, actual: Option<&str>) -> Self {
        NrrdError::UnsupportedFormat {
            key: key.to_string(),
            expected: expected.to_string(),
            actual: actual.unwrap_or("<missing>").to_string(),
        }
    }
}

/// Specialized Result type for NRRD operations
pub type Result<T> = std::result::Result<T, NrrdError>;
