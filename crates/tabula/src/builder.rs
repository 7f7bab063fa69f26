//! # Builder for CacheConfig
//!
//! Fluent construction of [`CacheConfig`] instances.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use tabula_engine::CacheConfig;
//!
//! let config = CacheConfig::builder()
//!     .with_cache_dir("/tmp/tabula-cache")
//!     .with_timeout(Duration::from_secs(60))
//!     .with_max_wait_time(Duration::from_secs(120))
//!     .with_extension(".tsv")
//!     .build();
//!
//! assert_eq!(config.extension, ".tsv");
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::CacheConfig;

/// Builder for creating CacheConfig instances with a fluent API
#[derive(Debug, Clone)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: CacheConfig::default(),
        }
    }

    /// Set the directory holding cache entries
    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.config.cache_dir = cache_dir.into();
        self
    }

    /// Set the overall timeout for a download
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set how long to wait for a download running in another process
    pub fn with_max_wait_time(mut self, max_wait_time: Duration) -> Self {
        self.config.max_wait_time = max_wait_time;
        self
    }

    /// Set the polling interval used while waiting
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.config.poll_interval = poll_interval;
        self
    }

    /// Set the cache entry extension. A missing leading dot is added.
    pub fn with_extension(mut self, extension: impl AsRef<str>) -> Self {
        let extension = extension.as_ref();
        self.config.extension = if extension.is_empty() || extension.starts_with('.') {
            extension.to_owned()
        } else {
            format!(".{extension}")
        };
        self
    }

    /// Set the user agent string
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set whether to follow redirects
    pub fn with_follow_redirects(mut self, follow: bool) -> Self {
        self.config.follow_redirects = follow;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> CacheConfig {
        self.config
    }
}

impl Default for CacheConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
