//! Error types for loading and saving index artifacts and the corpus.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure while reading, writing or validating a persisted artifact.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corrupt artifact {path:?}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("cannot decode {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("cannot encode artifact: {0}")]
    Encode(String),

    #[error("invalid artifact: {0}")]
    Invalid(String),
}

impl IndexError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        IndexError::Io {
            path: path.into(),
            source,
        }
    }
}
