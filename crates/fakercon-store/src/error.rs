//! Error types for the persistent store.

use std::path::PathBuf;

/// Errors that can occur while reading or writing the cache file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A filesystem operation on the cache file or its directory failed.
    #[error("cache file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line did not have the `identity=timestamp` shape, or its identity
    /// is not acceptable.
    #[error("malformed cache line: {0:?}")]
    MalformedLine(String),

    /// The timestamp part of a line did not parse, or lies in the future.
    #[error("invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
