//! Error types for mnist-ingest

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of a [`DatasetError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Storage could not be opened or ran out of bytes.
    Io,
    /// The container's header is not what the caller asked for.
    Format,
}

/// Errors raised while reading or pairing dataset containers
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to open {path:?}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("Failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error(
        "Unexpected end of stream in {path:?} while reading {section}: expected {expected} bytes, got {available}"
    )]
    ShortRead {
        path: PathBuf,
        section: &'static str,
        expected: usize,
        available: usize,
    },

    #[error("Invalid magic number in {path:?}: expected {expected}, got {actual}")]
    InvalidMagic {
        path: PathBuf,
        expected: u32,
        actual: u32,
    },

    #[error("Record payload of {path:?} declares {requested} bytes, limit is {limit}")]
    PayloadTooLarge {
        path: PathBuf,
        requested: u64,
        limit: u64,
    },

    #[error("Sample and label counts differ: {samples} samples, {labels} labels")]
    CountMismatch { samples: usize, labels: usize },
}

impl DatasetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DatasetError::Open { .. }
            | DatasetError::Read { .. }
            | DatasetError::ShortRead { .. } => ErrorKind::Io,
            DatasetError::InvalidMagic { .. }
            | DatasetError::PayloadTooLarge { .. }
            | DatasetError::CountMismatch { .. } => ErrorKind::Format,
        }
    }
}

/// Errors raised by the loss functions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LossError {
    #[error("Predictions and targets must have the same length: {predictions} vs {targets}")]
    LengthMismatch { predictions: usize, targets: usize },

    #[error("Predictions cannot be empty")]
    EmptyPredictions,

    #[error("Class index {index} out of bounds for {len} predictions")]
    ClassOutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, DatasetError>;
