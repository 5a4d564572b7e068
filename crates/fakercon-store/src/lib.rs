//! Persistent store for the Fake RCON authorization cache.
//!
//! The cache is saved as UTF-8 text, one record per line:
//!
//! ```text
//! 76561198000000001=2024-05-01 18:30:00
//! 76561198000000002=2024-05-01 19:02:41
//! ```
//!
//! - **Codec** ([`CacheCodec`]): converts records to and from lines.
//!   Timestamps are UTC with second precision and no zone suffix.
//! - **File** ([`CacheFile`]): owns the path, creates it on first use,
//!   and performs full rewrites on save.
//! - **Errors** ([`StoreError`]): I/O failures and malformed lines.
//!
//! The store is a convenience, not a system of record: malformed lines and
//! records that expired while on disk are dropped on load without error.

mod codec;
mod error;
mod file;

pub use codec::{CacheCodec, TIMESTAMP_FORMAT};
pub use error::StoreError;
pub use file::CacheFile;
