//! The authorization cache: identity → most recent authorization.
//!
//! All validity and eviction logic lives here. Call sites never compute a
//! record's age themselves; they ask [`AuthCache::is_authorized`] for a pure
//! read, or [`AuthCache::check`] when a stale record should be evicted as
//! part of the same operation.
//!
//! # Concurrency note
//!
//! `AuthCache` is a plain `HashMap` wrapper and is NOT thread-safe by
//! itself. The gateway owns it behind one mutex shared with the sweep task,
//! so a mutation and the save that follows it are a single critical section.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};

use crate::{AuthConfig, AuthState, AuthorizationRecord, Identity};

/// In-memory authorization cache.
///
/// ## Lifecycle
///
/// ```text
/// authorize() ──→ [valid] ──(age > expiry)──→ [stale] ──→ purge_expired()
///                    │                           │
///                    ├── revoke() ───────────────┼──→ removed
///                    └── clear_except(other) ────┘
/// ```
#[derive(Debug, Clone)]
pub struct AuthCache {
    /// Records keyed by identity. At most one record per identity.
    records: HashMap<Identity, AuthorizationRecord>,

    config: AuthConfig,

    /// `config.expiry` converted once for timestamp arithmetic.
    expiry: TimeDelta,
}

impl AuthCache {
    /// Creates an empty cache with the given expiry policy.
    pub fn new(config: AuthConfig) -> Self {
        let expiry = config.expiry_delta();
        Self {
            records: HashMap::new(),
            config,
            expiry,
        }
    }

    /// The expiry policy in effect.
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Returns `true` if `identity` has a record no older than the expiry
    /// window at `now`.
    ///
    /// Read-only: a stale record is reported as unauthorized but left in
    /// place. Use [`check`](Self::check) to evict it in the same step.
    pub fn is_authorized(&self, identity: &Identity, now: DateTime<Utc>) -> bool {
        self.records
            .get(identity)
            .is_some_and(|record| record.is_valid(now, self.expiry))
    }

    /// Reports the identity's state and evicts its record if it has expired.
    ///
    /// This is the check-then-revoke sequence the command handlers need,
    /// done as one `&mut self` call so it stays atomic under the caller's lock.
    pub fn check(&mut self, identity: &Identity, now: DateTime<Utc>) -> AuthState {
        if self.is_authorized(identity, now) {
            return AuthState::Authorized;
        }
        if self.records.remove(identity).is_some() {
            tracing::info!(%identity, "authorization expired, record evicted");
        }
        AuthState::Unauthenticated
    }

    /// Records a successful authentication at `now`.
    ///
    /// Inserts a new record or refreshes the timestamp of an existing one.
    /// Always succeeds.
    pub fn authorize(&mut self, identity: Identity, now: DateTime<Utc>) -> &AuthorizationRecord {
        tracing::info!(%identity, "identity authorized");
        let record = AuthorizationRecord::new(identity.clone(), now);
        self.records.insert(identity.clone(), record);
        // The entry was inserted on the line above.
        &self.records[&identity]
    }

    /// Removes the record for `identity`, if any.
    ///
    /// Idempotent. Returns `true` if a record was removed.
    pub fn revoke(&mut self, identity: &Identity) -> bool {
        let removed = self.records.remove(identity).is_some();
        if removed {
            tracing::info!(%identity, "authorization revoked");
        }
        removed
    }

    /// Removes every record older than the expiry window at `now`.
    ///
    /// Returns how many records were removed. Zero is the common case, and
    /// callers skip persisting when nothing changed.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.records.len();
        let expiry = self.expiry;
        self.records.retain(|_, record| record.is_valid(now, expiry));
        let removed = before - self.records.len();
        if removed > 0 {
            tracing::info!(removed, "purged expired authorizations");
        }
        removed
    }

    /// Removes every record except the one for `identity`.
    ///
    /// Used to force everyone else to re-authenticate while the caller stays
    /// logged in. If `identity` has no record this is a no-op; the caller is
    /// expected to have checked authorization first. Returns how many records
    /// were removed.
    pub fn clear_except(&mut self, identity: &Identity) -> usize {
        if !self.records.contains_key(identity) {
            return 0;
        }
        let before = self.records.len();
        self.records.retain(|key, _| key == identity);
        let removed = before - self.records.len();
        tracing::info!(%identity, removed, "authorization cache cleared for all other identities");
        removed
    }

    /// Replaces the whole cache with `records`, e.g. after reading the store.
    ///
    /// Later duplicates of the same identity win.
    pub fn replace_all(&mut self, records: impl IntoIterator<Item = AuthorizationRecord>) {
        self.records = records
            .into_iter()
            .map(|record| (record.identity.clone(), record))
            .collect();
    }

    /// Looks up the record for `identity`, valid or not.
    pub fn get(&self, identity: &Identity) -> Option<&AuthorizationRecord> {
        self.records.get(identity)
    }

    /// All records, in no particular order.
    pub fn records(&self) -> impl Iterator<Item = &AuthorizationRecord> {
        self.records.values()
    }

    /// A copy of all records sorted by identity, for deterministic saves.
    pub fn snapshot(&self) -> Vec<AuthorizationRecord> {
        let mut records: Vec<_> = self.records.values().cloned().collect();
        records.sort_by(|a, b| a.identity.cmp(&b.identity));
        records
    }

    /// Number of records (valid or stale).
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the cache holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for AuthCache {
    fn default() -> Self {
        Self::new(AuthConfig::default())
    }
}

// =========================================================================
// Tests
// =========================================================================
