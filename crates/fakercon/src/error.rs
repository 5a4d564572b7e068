//! Unified error type for the Fake RCON plugin.

use std::path::PathBuf;

use fakercon_auth::AuthError;
use fakercon_store::StoreError;

/// Errors reading or creating `config.json`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file or its directory could not be read or written.
    #[error("config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not a valid config document.
    #[error("config file {} is not valid: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level error that wraps all crate-specific errors.
///
/// Returned by plugin lifecycle calls (load, unload) and by
/// [`Caller::from_raw`](crate::Caller::from_raw). Command handling never
/// fails: a rejected command is a normal
/// [`CommandOutcome`](crate::CommandOutcome).
#[derive(Debug, thiserror::Error)]
pub enum FakeRconError {
    /// Reading or writing the cache file failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Reading or creating the config file failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An identity supplied by the host was not usable.
    #[error(transparent)]
    Auth(#[from] AuthError),
}
