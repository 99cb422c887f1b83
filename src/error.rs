//! Error type shared by the whole crate.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The payload needs more slots than the carrier offers.
    #[error("payload too large: needs {needed} bits, carrier holds {available}")]
    CapacityExceeded { needed: usize, available: usize },

    /// Two geometries that have to agree do not.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    /// The image codec could not decode or encode the file.
    #[error("unsupported image format for {path}: {source}")]
    UnsupportedFormat {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A text header claims more bytes than were recovered.
    #[error("truncated payload: header announces {expected} bits, only {available} recovered")]
    TruncatedPayload { expected: usize, available: usize },

    /// Slots that still read back wrong after every embedding pass.
    #[error("{failing} slots of channel {channel} unreadable after {attempts} passes")]
    EmbeddingFailed {
        channel: usize,
        failing: usize,
        attempts: usize,
    },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn dimensions(expected: (usize, usize), actual: (usize, usize)) -> Self {
        Error::DimensionMismatch {
            expected: format!("{}x{}", expected.0, expected.1),
            actual: format!("{}x{}", actual.0, actual.1),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
