use crate::record::RecordFormatError;
use std::io;
use thiserror::Error;

/// Why a rename was refused or did not reach storage.
#[derive(Error, Debug)]
pub enum RenameError {
    #[error("A run named \"{0}\" already exists")]
    DuplicateName(String),

    #[error("Run record '{key}' could not be read: {source}")]
    StorageUnavailable {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("Run record '{key}' is malformed: {reason}")]
    MalformedRecord { key: String, reason: String },

    #[error("Failed to write run record '{key}': {source}")]
    WriteFailed {
        key: String,
        #[source]
        source: io::Error,
    },
}

impl RenameError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, RenameError::DuplicateName(_))
    }
}

#[derive(Error, Debug)]
pub enum RunlogError {
    #[error(transparent)]
    Rename(#[from] RenameError),

    #[error("Run record not found: {0}")]
    RecordNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid run record '{key}': {source}")]
    InvalidRecord {
        key: String,
        #[source]
        source: RecordFormatError,
    },

    #[error("Name is {len} characters long; the limit is {max}")]
    NameTooLong { len: usize, max: usize },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RunlogError>;
