//! Durable Tier Module
//!
//! File-backed tier that survives process restarts. One file per key,
//! named by a one-way hash of the key, bounded by total on-disk size
//! with oldest-first cleanup.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::cache::{CacheEntry, PersistentTier, PersistentUsage};
use crate::error::{CacheError, Result};

/// Suffix for entry files; temp siblings use `.tmp` and are never scanned.
const ENTRY_FILE_SUFFIX: &str = ".cache";

/// Cleanup drains to this fraction of the byte budget so that the pass
/// does not fire again on the very next write.
const CLEANUP_HYSTERESIS_PERCENT: u64 = 80;

// == Durable Tier ==
/// Filesystem-backed cache tier.
///
/// Filenames carry no recoverable key information, so invalidation by
/// key pattern is structurally impossible here; only tag invalidation
/// works, by inspecting every stored payload. All I/O and parse
/// failures are absorbed and reported as "entry not present".
#[derive(Debug)]
pub struct DurableTier {
    directory: PathBuf,
    max_size_bytes: u64,
    lock: Mutex<()>,
}

impl DurableTier {
    // == Constructor ==
    /// Creates a tier over `directory`, creating it if needed.
    ///
    /// This is the one failure that surfaces: a directory that cannot be
    /// created or written is a configuration error, reported at
    /// construction time rather than downgraded to misses later.
    pub fn new(directory: impl Into<PathBuf>, max_size_bytes: u64) -> Result<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory).map_err(|err| {
            CacheError::Configuration(format!(
                "cannot create cache directory {}: {}",
                directory.display(),
                err
            ))
        })?;

        Ok(Self {
            directory,
            max_size_bytes,
            lock: Mutex::new(()),
        })
    }

    /// Maps a key to its entry file; the hash is one-directional.
    fn entry_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.directory
            .join(format!("{}{}", hex::encode(digest), ENTRY_FILE_SUFFIX))
    }

    /// Lists entry files, absorbing directory read failures.
    fn entry_files(&self) -> Vec<PathBuf> {
        let Ok(dir) = fs::read_dir(&self.directory) else {
            return Vec::new();
        };
        dir.flatten()
            .map(|item| item.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.ends_with(ENTRY_FILE_SUFFIX))
            })
            .collect()
    }

    fn read_entry(path: &Path) -> Option<CacheEntry> {
        let bytes = fs::read(path).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    // == Get ==
    /// Reads an entry from disk.
    ///
    /// An expired entry is deleted and reported as a miss. The read
    /// counter is incremented on the returned copy only; nothing is
    /// written back to disk.
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        let _guard = self.lock.lock();
        let path = self.entry_path(key);

        let mut entry = Self::read_entry(&path)?;
        if entry.is_expired() {
            let _ = fs::remove_file(&path);
            return None;
        }

        entry.record_hit();
        Some(entry)
    }

    // == Set ==
    /// Writes an entry to disk, running the size-budget cleanup first.
    ///
    /// The write goes to a temporary sibling and is renamed into place,
    /// so a concurrent reader never observes a partial file.
    pub fn set(&self, key: &str, entry: &CacheEntry) {
        let _guard = self.lock.lock();
        self.cleanup_if_needed();

        let raw = match serde_json::to_vec(entry) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("durable tier could not serialize entry: {}", err);
                return;
            }
        };

        let path = self.entry_path(key);
        let tmp = path.with_extension("tmp");
        if let Err(err) = fs::write(&tmp, &raw).and_then(|_| fs::rename(&tmp, &path)) {
            warn!("durable tier write failed for {}: {}", path.display(), err);
            let _ = fs::remove_file(&tmp);
        }
    }

    // == Cleanup If Needed ==
    /// Enforces the byte budget: when the total size of entry files
    /// exceeds it, deletes files oldest-first until the total is at or
    /// below the hysteresis floor. Caller must hold the tier lock.
    fn cleanup_if_needed(&self) {
        let mut files: Vec<(PathBuf, u64, SystemTime)> = self
            .entry_files()
            .into_iter()
            .filter_map(|path| {
                let meta = fs::metadata(&path).ok()?;
                let modified = meta.modified().ok()?;
                Some((path, meta.len(), modified))
            })
            .collect();

        let mut total: u64 = files.iter().map(|(_, size, _)| size).sum();
        if total <= self.max_size_bytes {
            return;
        }

        let floor = self.max_size_bytes * CLEANUP_HYSTERESIS_PERCENT / 100;
        files.sort_by_key(|(_, _, modified)| *modified);

        let mut removed = 0u64;
        for (path, size, _) in files {
            if total <= floor {
                break;
            }
            if fs::remove_file(&path).is_ok() {
                total = total.saturating_sub(size);
                removed += 1;
            }
        }

        debug!(
            "durable tier cleanup removed {} files, {} bytes remain",
            removed, total
        );
    }

    // == Invalidate ==
    /// Tag-based invalidation; returns the number of files removed.
    ///
    /// The key pattern selector is ignored: filenames are one-way hashes
    /// and the original keys cannot be recovered. Tag matching opens and
    /// inspects every stored payload.
    pub fn invalidate(&self, _pattern: Option<&str>, tags: Option<&[String]>) -> u64 {
        let Some(tags) = tags else {
            return 0;
        };

        let _guard = self.lock.lock();
        let mut removed = 0u64;
        for path in self.entry_files() {
            let matches = Self::read_entry(&path)
                .map(|entry| entry.has_any_tag(tags))
                .unwrap_or(false);
            if matches && fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
        removed
    }

    // == Clear ==
    /// Removes every entry file unconditionally.
    pub fn clear(&self) {
        let _guard = self.lock.lock();
        for path in self.entry_files() {
            let _ = fs::remove_file(&path);
        }
    }

    // == Cleanup Expired ==
    /// Removes all expired entry files; returns the number removed.
    /// Unparseable files are skipped, not deleted.
    pub fn cleanup_expired(&self) -> u64 {
        let _guard = self.lock.lock();
        let mut removed = 0u64;
        for path in self.entry_files() {
            let expired = Self::read_entry(&path)
                .map(|entry| entry.is_expired())
                .unwrap_or(false);
            if expired && fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
        removed
    }

    // == Usage ==
    /// Returns file count and total on-disk bytes.
    pub fn usage(&self) -> PersistentUsage {
        let _guard = self.lock.lock();
        let files = self.entry_files();
        let total_bytes = files
            .iter()
            .filter_map(|path| fs::metadata(path).ok())
            .map(|meta| meta.len())
            .sum();

        PersistentUsage {
            entries: files.len(),
            total_bytes,
            max_size_bytes: self.max_size_bytes,
        }
    }
}

impl PersistentTier for DurableTier {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        DurableTier::get(self, key)
    }

    fn set(&self, key: &str, entry: &CacheEntry) {
        DurableTier::set(self, key, entry)
    }

    fn invalidate(&self, pattern: Option<&str>, tags: Option<&[String]>) -> u64 {
        DurableTier::invalidate(self, pattern, tags)
    }

    fn clear(&self) {
        DurableTier::clear(self)
    }

    fn cleanup_expired(&self) -> u64 {
        DurableTier::cleanup_expired(self)
    }

    fn usage(&self) -> PersistentUsage {
        DurableTier::usage(self)
    }
}
