//! The cache file on disk.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use fakercon_auth::AuthorizationRecord;

use crate::{CacheCodec, StoreError};

/// Owns the path of the cache file and reads/writes it with [`CacheCodec`].
///
/// Every save is a full rewrite of the file: the in-memory cache is the
/// source of truth, and the file must never accumulate revoked or expired
/// entries. The rewrite goes through a sibling temp file and a rename, so a
/// crash mid-write leaves the previous contents in place.
#[derive(Debug, Clone)]
pub struct CacheFile {
    path: PathBuf,
    codec: CacheCodec,
}

impl CacheFile {
    /// Opens the cache file at `path`, creating its directory and an empty
    /// file if they don't exist yet.
    ///
    /// Safe to call on every startup: existing contents are never touched.
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] if the directory or file cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;

        tracing::debug!(path = %path.display(), "cache file ready");

        Ok(Self {
            path,
            codec: CacheCodec,
        })
    }

    /// Where the cache lives.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record that is still valid at `now`.
    ///
    /// A missing file is an empty cache. Malformed lines and records older
    /// than `expiry` are skipped silently.
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] if the file exists but cannot be read.
    pub fn load(
        &self,
        now: DateTime<Utc>,
        expiry: TimeDelta,
    ) -> Result<Vec<AuthorizationRecord>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        let records = self.codec.decode(&text, now, expiry);
        tracing::debug!(
            path = %self.path.display(),
            loaded = records.len(),
            "cache file loaded"
        );
        Ok(records)
    }

    /// Overwrites the file with exactly `records`.
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] if the temp file cannot be written or
    /// renamed over the cache file.
    pub fn save<'a>(
        &self,
        records: impl IntoIterator<Item = &'a AuthorizationRecord>,
    ) -> Result<(), StoreError> {
        let text = self.codec.encode(records);
        let tmp = self.tmp_path();

        fs::write(&tmp, text.as_bytes()).map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e))?;

        tracing::trace!(path = %self.path.display(), bytes = text.len(), "cache file saved");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
