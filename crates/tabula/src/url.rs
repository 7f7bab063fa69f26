//! # Source URL helpers
//!
//! Classification of source strings into remote resources and local paths,
//! and the deterministic mapping from a remote URL to its cache file.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use url::Url;

/// Extension used for cache entries when the caller does not pick one
pub const DEFAULT_EXTENSION: &str = ".csv";

/// Prefix shared by every cache entry file name
pub const CACHE_FILE_PREFIX: &str = "cached_";

/// Schemes treated as remote sources
pub const REMOTE_SCHEMES: &[&str] = &["http", "https"];

const LOOPBACK_HOSTS: &[&str] = &["localhost", "127.0.0.1", "0.0.0.0"];

/// Parse `source` and return it only if it has a scheme from `allowed` and a non-empty host.
fn parse_remote(source: &str, allowed: &[&str]) -> Option<Url> {
    let url = Url::parse(source).ok()?;

    if !allowed.contains(&url.scheme()) {
        return None;
    }

    // `http:example.com` is accepted by the WHATWG parser but carries no authority
    let rest = source.trim().get(url.scheme().len()..)?;
    let authority = rest.strip_prefix("://")?;
    // `http:///example.com` has an empty authority; the parser would promote the path to host
    if authority.is_empty() || authority.starts_with(['/', '\\']) {
        return None;
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Some(url),
        _ => None,
    }
}

/// Check whether `source` is an http(s) URL with a non-empty authority.
///
/// Any parse failure yields `false`.
pub fn is_url(source: &str) -> bool {
    parse_remote(source, REMOTE_SCHEMES).is_some()
}

/// Stricter variant of [`is_url`] with a caller supplied scheme list.
///
/// Loopback hosts are always rejected.
pub fn validate_url(source: &str, allowed_schemes: &[&str]) -> bool {
    match parse_remote(source, allowed_schemes) {
        Some(url) => url
            .host_str()
            .map(|host| {
                let host = host.to_ascii_lowercase();
                !LOOPBACK_HOSTS.contains(&host.as_str())
            })
            .unwrap_or(false),
        None => false,
    }
}

/// Resolve a local source string to a filesystem path.
///
/// `file://` URLs are converted to the path they name, everything else is
/// taken verbatim.
pub fn local_path(source: &str) -> PathBuf {
    match Url::parse(source) {
        Ok(url) if url.scheme() == "file" => url
            .to_file_path()
            .unwrap_or_else(|_| PathBuf::from(source)),
        _ => PathBuf::from(source),
    }
}

/// Cache file name for `url`: `cached_<sha256 hex><extension>`
pub fn cache_file_name(url: &str, extension: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let hash = hex::encode(hasher.finalize());
    format!("{CACHE_FILE_PREFIX}{hash}{extension}")
}

/// Full cache path for `url` inside `cache_dir`
pub fn cached_file_path(url: &str, cache_dir: &Path, extension: &str) -> PathBuf {
    cache_dir.join(cache_file_name(url, extension))
}
