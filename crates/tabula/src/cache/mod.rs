//! # Cache System
//!
//! File-backed cache for remote sources. Each remote URL maps to one
//! `cached_<hash>` file; downloads are coordinated across processes through
//! a `.lock` sidecar holding an exclusive advisory lock.

mod fetcher;
mod lock;
mod manager;
mod types;

pub use fetcher::{Fetcher, HttpFetcher};
pub use lock::{LOCK_EXTENSION, lock_path_for};
pub use manager::CacheManager;
pub use types::{CacheError, CacheResult, CacheStatus};
