//! # Cache Manager
//!
//! Downloads remote resources into deterministic cache files. Concurrent
//! requests for the same entry, from this process or others, are serialized
//! through an advisory lock on a sidecar file; losers poll until the winner
//! has renamed the finished file into place.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::CacheConfig;
use crate::cache::fetcher::{Fetcher, HttpFetcher};
use crate::cache::lock::{EntryLock, lock_path_for};
use crate::cache::types::{CacheError, CacheResult, CacheStatus};
use crate::url::{CACHE_FILE_PREFIX, cached_file_path};

const TEMP_PREFIX: &str = ".cached_";
const TEMP_SUFFIX: &str = ".tmp";

/// File-backed cache for remote sources
#[derive(Clone)]
pub struct CacheManager {
    config: Arc<CacheConfig>,
    fetcher: Arc<dyn Fetcher>,
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CacheManager {
    /// Create a cache manager using a custom transport
    pub fn new(config: CacheConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            config: Arc::new(config),
            fetcher,
        }
    }

    /// Create a cache manager that downloads over HTTP(S)
    pub fn with_http(config: CacheConfig) -> CacheResult<Self> {
        let fetcher = HttpFetcher::from_config(&config)?;
        Ok(Self::new(config, Arc::new(fetcher)))
    }

    /// Get configuration reference
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn cache_dir(&self) -> &Path {
        &self.config.cache_dir
    }

    /// Cache path for `url` under this manager's directory and extension
    pub fn cache_path_for(&self, url: &str) -> PathBuf {
        cached_file_path(url, &self.config.cache_dir, &self.config.extension)
    }

    /// Make sure `target` holds the complete content of `url`.
    ///
    /// Downloads at most once across cooperating processes. When another
    /// holder of the entry lock is found, waits up to `max_wait_time` for the
    /// file to appear.
    pub async fn ensure_cached(&self, url: &str, target: &Path) -> CacheResult<CacheStatus> {
        if fs::try_exists(target).await? {
            debug!(url, path = ?target, "Cache hit");
            return Ok(CacheStatus::Hit);
        }

        fs::create_dir_all(&self.config.cache_dir).await?;
        let entry_dir = entry_dir(target);
        fs::create_dir_all(entry_dir).await?;

        let lock_path = lock_path_for(target);
        let Some(lock) = acquire_lock(lock_path).await? else {
            self.wait_for_concurrent_download(target).await?;
            return Ok(CacheStatus::Waited);
        };

        // Another process may have finished between the first check and the lock
        if fs::try_exists(target).await? {
            debug!(url, path = ?target, "Cache entry appeared while acquiring lock");
            drop(lock);
            return Ok(CacheStatus::Hit);
        }

        info!(url, "Downloading data");
        let result = self.download(url, target).await;
        drop(lock);

        let bytes = result?;
        info!(url, path = ?target, bytes, "Cached data");
        Ok(CacheStatus::Downloaded)
    }

    /// Download `url` into a temporary file next to `target`, then rename it into place
    async fn download(&self, url: &str, target: &Path) -> CacheResult<u64> {
        let temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(entry_dir(target))?;
        let (file, temp_path) = temp.into_parts();
        let mut file = fs::File::from_std(file);

        // On error the temp path is dropped, which deletes the partial file
        let written = self.fetcher.fetch(url, &mut file).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        temp_path.persist(target).map_err(|e| CacheError::Io(e.error))?;
        Ok(written)
    }

    /// Poll for `target` until it exists or `max_wait_time` elapses
    async fn wait_for_concurrent_download(&self, target: &Path) -> CacheResult<()> {
        info!(path = ?target, "Another process is downloading the file, waiting");

        let started = Instant::now();
        loop {
            if fs::try_exists(target).await? {
                debug!(path = ?target, waited = ?started.elapsed(), "Concurrent download finished");
                return Ok(());
            }
            if started.elapsed() >= self.config.max_wait_time {
                break;
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }

        warn!(path = ?target, max_wait = ?self.config.max_wait_time, "Gave up waiting for concurrent download");
        Err(CacheError::LockTimeout {
            path: target.to_path_buf(),
            waited: self.config.max_wait_time,
        })
    }

    /// Remove a cached file. Returns whether a file was deleted.
    pub async fn remove_cached(&self, path: &Path) -> bool {
        match fs::remove_file(path).await {
            Ok(()) => {
                debug!(path = ?path, "Removed cached file");
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                warn!(path = ?path, error = %e, "Failed to remove cached file");
                false
            }
        }
    }

    /// Remove every cache entry in the cache directory. Returns the number removed.
    pub async fn clear_all(&self) -> usize {
        let mut entries = match fs::read_dir(&self.config.cache_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = ?self.config.cache_dir, error = %e, "Failed to read cache directory");
                return 0;
            }
        };

        let mut removed = 0;
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(dir = ?self.config.cache_dir, error = %e, "Failed to enumerate cache directory");
                    break;
                }
            };

            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !self.is_entry_name(name) {
                continue;
            }
            if self.remove_cached(&entry.path()).await {
                removed += 1;
            }
        }

        debug!(count = removed, "Cleared cache entries");
        removed
    }

    fn is_entry_name(&self, name: &str) -> bool {
        name.starts_with(CACHE_FILE_PREFIX)
            && name.ends_with(self.config.extension.as_str())
            && name.len() > CACHE_FILE_PREFIX.len() + self.config.extension.len()
    }
}

/// Take the entry lock on the blocking pool; opening and locking the sidecar are blocking calls
async fn acquire_lock(lock_path: PathBuf) -> CacheResult<Option<EntryLock>> {
    tokio::task::spawn_blocking(move || EntryLock::try_acquire(&lock_path))
        .await
        .map_err(|e| CacheError::Lock(std::io::Error::other(format!("lock task failed: {e}"))))?
        .map_err(CacheError::Lock)
}

fn entry_dir(target: &Path) -> &Path {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
