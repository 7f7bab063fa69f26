//! # Tabula Engine
//!
//! Loads CSV data from local files or remote URLs into in-memory tables.
//!
//! ## Features
//!
//! - URL classification and deterministic cache file naming
//! - File-backed download cache, safe under concurrent processes
//! - Typed CSV parsing with head/tail slicing and summary statistics
//! - Source metadata and cache refresh for remote sources

pub mod builder;
pub mod cache;
pub mod config;
pub mod downloader;
pub mod error;
pub mod source;
pub mod table;
pub mod url;

#[cfg(test)]
mod test_utils;

pub use builder::CacheConfigBuilder;
pub use cache::{CacheError, CacheManager, CacheResult, CacheStatus, Fetcher, HttpFetcher};
pub use config::CacheConfig;
pub use error::DownloadError;
pub use source::{DataSource, SourceError, SourceKind, SourceMetadata};
pub use table::{DType, DataFrame, Describe, ReadOptions, TableError, Value};
pub use url::{DEFAULT_EXTENSION, cache_file_name, cached_file_path, is_url, validate_url};

pub use downloader::create_client;
