use thiserror::Error;

use crate::media::MediaKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RatingError {
    #[error("Rating must be between 1 and 5, got {0}")]
    OutOfRange(i64),

    #[error("Rating requires an authenticated user")]
    Unauthenticated,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TitleError {
    #[error("Title cannot be empty")]
    Empty,

    #[error("Title must be at most {max} characters")]
    TooLong { max: usize },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upload request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Storage provider returned error: {status} - {message}")]
    Provider { status: u16, message: String },

    #[error("Invalid storage provider response: {0}")]
    InvalidResponse(String),
}

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Failed to store {kind}: {source}")]
    Storage {
        kind: MediaKind,
        #[source]
        source: StorageError,
    },
}

impl MediaError {
    pub fn kind(&self) -> MediaKind {
        match self {
            MediaError::Storage { kind, .. } => *kind,
        }
    }
}
