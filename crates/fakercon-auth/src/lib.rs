//! Authorization cache for Fake RCON.
//!
//! This crate owns the only real state machine in the plugin: who is
//! currently allowed to run privileged commands, and for how long.
//!
//! 1. **Identity**: a stable per-client key ([`Identity`])
//! 2. **Records**: when each identity last authenticated ([`AuthorizationRecord`])
//! 3. **Expiry**: a record is valid for [`AuthConfig::expiry`] (120 minutes
//!    by default) and then ages out ([`AuthCache`])
//! 4. **Time**: every timestamp comes from a [`Clock`], so expiry can be
//!    driven by a [`ManualClock`] in tests
//!
//! # How it fits in the stack
//!
//! ```text
//! Command Gateway (fakercon)     ← authorizes, revokes, checks
//!     ↕
//! Auth Cache (this crate)        ← identity → record, expiry policy
//!     ↕
//! Persistent Store (fakercon-store) ← encodes records as text lines
//! ```
//!
//! The cache itself is not synchronized. The gateway keeps it behind a
//! single mutex together with the store so that every mutation and the
//! save that follows it happen as one step.

mod cache;
mod clock;
mod error;
mod record;

pub use cache::AuthCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::AuthError;
pub use record::{AuthConfig, AuthState, AuthorizationRecord, Identity};
