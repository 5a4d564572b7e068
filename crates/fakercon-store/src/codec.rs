//! Line codec for the cache file.
//!
//! One record per line, `identity=timestamp`. The identity is split off at
//! the FIRST `=`; everything after it must be a timestamp in
//! [`TIMESTAMP_FORMAT`]. Timestamps carry no zone suffix and are always
//! interpreted as UTC, the same way they are written.

use chrono::{DateTime, NaiveDateTime, SubsecRound, TimeDelta, Utc};
use fakercon_auth::{AuthorizationRecord, Identity};

use crate::StoreError;

/// `yyyy-MM-dd HH:mm:ss`, second precision, UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Encodes records as cache-file lines and decodes them back.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheCodec;

impl CacheCodec {
    /// Formats one record as `identity=timestamp` (no line terminator).
    ///
    /// Sub-second precision is dropped.
    pub fn encode_line(&self, record: &AuthorizationRecord) -> String {
        format!(
            "{}={}",
            record.identity,
            record.authorized_at.format(TIMESTAMP_FORMAT)
        )
    }

    /// Formats every record, one newline-terminated line each.
    pub fn encode<'a>(
        &self,
        records: impl IntoIterator<Item = &'a AuthorizationRecord>,
    ) -> String {
        records.into_iter().fold(String::new(), |mut out, record| {
            out.push_str(&self.encode_line(record));
            out.push('\n');
            out
        })
    }

    /// Parses a single line.
    ///
    /// Both halves are trimmed. `now` is only used to reject timestamps
    /// from the future, which can't have been written by this codec.
    ///
    /// # Errors
    /// - [`StoreError::MalformedLine`]: no `=`, or an unusable identity
    /// - [`StoreError::InvalidTimestamp`]: unparsable or future timestamp
    pub fn decode_line(
        &self,
        line: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthorizationRecord, StoreError> {
        let (identity, timestamp) = line
            .split_once('=')
            .ok_or_else(|| StoreError::MalformedLine(line.to_string()))?;

        let identity = Identity::new(identity.trim())
            .map_err(|_| StoreError::MalformedLine(line.to_string()))?;

        let timestamp = timestamp.trim();
        let authorized_at = NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
            .map_err(|e| StoreError::InvalidTimestamp {
                value: timestamp.to_string(),
                reason: e.to_string(),
            })?
            .and_utc();

        if authorized_at > now {
            return Err(StoreError::InvalidTimestamp {
                value: timestamp.to_string(),
                reason: "timestamp is in the future".into(),
            });
        }

        Ok(AuthorizationRecord::new(identity, authorized_at))
    }

    /// Parses a whole file, keeping only records still valid at `now`.
    ///
    /// Blank lines, malformed lines, and stale records are skipped. Validity
    /// is judged against `now` rounded down to the second, matching the
    /// precision the timestamps were written with, so a record that was
    /// valid when saved survives a reload at the same instant.
    pub fn decode(
        &self,
        text: &str,
        now: DateTime<Utc>,
        expiry: TimeDelta,
    ) -> Vec<AuthorizationRecord> {
        let now_secs = now.trunc_subsecs(0);
        let mut records = Vec::new();

        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let record = match self.decode_line(line, now) {
                Ok(record) => record,
                Err(e) => {
                    tracing::debug!(error = %e, "skipping cache line");
                    continue;
                }
            };
            if !record.is_valid(now_secs, expiry) {
                tracing::debug!(identity = %record.identity, "dropping expired cache entry");
                continue;
            }
            records.push(record);
        }

        records
    }
}
