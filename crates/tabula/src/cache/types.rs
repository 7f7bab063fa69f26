//! # Cache Types
//!
//! Common types used across the caching system.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::DownloadError;

/// How a cache entry became available to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    /// Entry was already on disk, no network access happened
    Hit,
    /// This call performed the download
    Downloaded,
    /// Another process downloaded the entry while this call waited
    Waited,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Downloaded => "downloaded",
            Self::Waited => "waited",
        }
    }
}

/// Errors raised by [`crate::CacheManager`]
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("Timeout waiting for file download after {} seconds: {}", .waited.as_secs(), .path.display())]
    LockTimeout { path: PathBuf, waited: Duration },

    #[error("Failed to lock cache entry: {0}")]
    Lock(std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of a cache operation
pub type CacheResult<T> = std::result::Result<T, CacheError>;
