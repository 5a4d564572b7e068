//! Error types for the authorization cache.

/// Errors raised while building authorization data.
///
/// Cache operations themselves never fail: authorizing always succeeds and
/// revoking an unknown identity is a no-op. The only fallible step is turning
/// raw host input into an [`Identity`](crate::Identity).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The identity is empty or contains bytes the cache file cannot hold
    /// (`=`, carriage return, or newline).
    #[error("invalid identity {0:?}")]
    InvalidIdentity(String),
}
