use std::path::PathBuf;
use std::time::Duration;

use crate::url::DEFAULT_EXTENSION;

const DEFAULT_USER_AGENT: &str = concat!("tabula/", env!("CARGO_PKG_VERSION"));

/// Configurable options for the download cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Directory holding cache entries and their lock sidecars
    pub cache_dir: PathBuf,

    /// Overall timeout for a single download
    pub timeout: Duration,

    /// Connection timeout (time to establish initial connection)
    pub connect_timeout: Duration,

    /// Upper bound for waiting on a download owned by another process
    pub max_wait_time: Duration,

    /// How often the cache entry is checked while waiting
    pub poll_interval: Duration,

    /// Extension appended to cache entry names, including the dot
    pub extension: String,

    /// User agent string
    pub user_agent: String,

    /// Whether to follow redirects
    pub follow_redirects: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("data/cache"),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_wait_time: Duration::from_secs(300),
            poll_interval: Duration::from_secs(1),
            extension: DEFAULT_EXTENSION.to_owned(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            follow_redirects: true,
        }
    }
}

impl CacheConfig {
    pub fn builder() -> crate::builder::CacheConfigBuilder {
        crate::builder::CacheConfigBuilder::new()
    }
}
