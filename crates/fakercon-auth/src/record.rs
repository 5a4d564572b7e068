//! Record types: what the cache remembers about each client.
//!
//! An authorization record answers two questions:
//! - WHO authenticated (`Identity`)
//! - WHEN they last did so (`authorized_at`, UTC)
//!
//! Validity is derived from the record's age, never stored.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::AuthError;

// ---------------------------------------------------------------------------
// AuthConfig
// ---------------------------------------------------------------------------

/// Configuration for the expiry policy.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// How long a successful authentication stays valid.
    ///
    /// The boundary is inclusive: a record whose age equals `expiry` is
    /// still valid. Default: 120 minutes.
    pub expiry: Duration,
}

impl AuthConfig {
    /// Default expiry window.
    pub const DEFAULT_EXPIRY: Duration = Duration::from_secs(120 * 60);

    /// The expiry window as a signed chrono delta, for timestamp arithmetic.
    ///
    /// Windows too large for chrono saturate to [`TimeDelta::MAX`], which
    /// simply means records never expire.
    pub fn expiry_delta(&self) -> TimeDelta {
        TimeDelta::from_std(self.expiry).unwrap_or(TimeDelta::MAX)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            expiry: Self::DEFAULT_EXPIRY,
        }
    }
}

// ---------------------------------------------------------------------------
// AuthState
// ---------------------------------------------------------------------------

/// Per-identity authorization state as seen by the command gateway.
///
/// ```text
///   Unauthenticated ──(correct password)──→ Authorized
///         ↑                                     │
///         └──(wrong password / expiry / clear)──┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No record, or the record has aged out.
    Unauthenticated,
    /// A record exists and is within the expiry window.
    Authorized,
}

impl AuthState {
    /// Returns `true` for [`AuthState::Authorized`].
    pub fn is_authorized(self) -> bool {
        matches!(self, Self::Authorized)
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "Unauthenticated"),
            Self::Authorized => write!(f, "Authorized"),
        }
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A stable per-client account identifier, used as the cache key.
///
/// In practice this is a decimal account number serialized as text, but the
/// cache treats it as opaque. Construction rejects values the cache file
/// format cannot represent: the store writes `identity=timestamp` lines and
/// splits on the first `=` and trims both halves, so `=`, line breaks and
/// leading or trailing whitespace are not allowed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity(String);

impl Identity {
    /// Validates and wraps a raw identity string.
    ///
    /// # Errors
    /// Returns [`AuthError::InvalidIdentity`] for empty values, values with
    /// leading or trailing whitespace, and values containing `=`, `\r`, or
    /// `\n`.
    pub fn new(raw: impl Into<String>) -> Result<Self, AuthError> {
        let raw = raw.into();
        if raw.is_empty() || raw.trim() != raw || raw.contains(['=', '\r', '\n']) {
            return Err(AuthError::InvalidIdentity(raw));
        }
        Ok(Self(raw))
    }

    /// The identity as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for Identity {
    /// Numeric account ids are always valid identities.
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl FromStr for Identity {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// AuthorizationRecord
// ---------------------------------------------------------------------------

/// One identity's most recent successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRecord {
    /// Whose authorization this is.
    pub identity: Identity,

    /// When the identity last submitted the correct password (UTC).
    pub authorized_at: DateTime<Utc>,
}

impl AuthorizationRecord {
    /// Creates a record authorized at the given instant.
    pub fn new(identity: Identity, authorized_at: DateTime<Utc>) -> Self {
        Self {
            identity,
            authorized_at,
        }
    }

    /// How long ago the record was authorized, relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        now.signed_duration_since(self.authorized_at)
    }

    /// Returns `true` while `age(now) <= expiry`.
    pub fn is_valid(&self, now: DateTime<Utc>, expiry: TimeDelta) -> bool {
        self.age(now) <= expiry
    }
}
