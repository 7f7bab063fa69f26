//! # Data Sources
//!
//! A [`DataSource`] is a loaded table together with where it came from.
//! Remote sources are materialised through the [`CacheManager`] first, local
//! sources are read in place.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Map;
use tokio::fs;
use tracing::{debug, info};

use crate::cache::{CacheError, CacheManager, CacheStatus};
use crate::table::{DataFrame, Describe, ReadOptions, TableError, read_csv};
use crate::url::{is_url, local_path};

/// Errors raised while opening or querying a data source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("No such file or directory: {}", .0.display())]
    NotFound(PathBuf),

    #[error("{0}")]
    EmptyOrMalformed(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    InvalidOperation(String),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<TableError> for SourceError {
    fn from(err: TableError) -> Self {
        match err {
            TableError::InvalidOption(msg) => Self::InvalidArgument(msg),
            TableError::Io(e) => Self::Io(e),
            other => Self::EmptyOrMalformed(other.to_string()),
        }
    }
}

/// Where a source is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Url,
    LocalFile,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::LocalFile => "local_file",
        }
    }
}

/// Descriptive information about a loaded source
#[derive(Debug, Clone, Serialize)]
pub struct SourceMetadata {
    pub file_path: PathBuf,
    pub original_source: String,
    pub separator: String,
    pub decimal: char,
    pub header: bool,
    pub columns: Vec<String>,
    pub shape: (usize, usize),
    /// Column name to type name, in column order
    pub dtypes: Map<String, serde_json::Value>,
    pub source_type: SourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_cached: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_status: Option<CacheStatus>,
}

/// A table loaded from a local file or a cached remote resource
#[derive(Debug)]
pub struct DataSource {
    original_source: String,
    kind: SourceKind,
    file_path: PathBuf,
    options: ReadOptions,
    frame: DataFrame,
    cache: Option<CacheManager>,
    cache_status: Option<CacheStatus>,
}

impl DataSource {
    /// Resolve `source` to a local file and load it.
    ///
    /// http(s) URLs go through the cache; anything else, including
    /// `file://` URLs, is read from the filesystem.
    pub async fn open(
        source: &str,
        options: ReadOptions,
        cache: &CacheManager,
    ) -> Result<Self, SourceError> {
        // reject bad options before touching the network
        options.delimiter()?;

        if is_url(source) {
            let file_path = cache.cache_path_for(source);
            let status = cache.ensure_cached(source, &file_path).await?;
            debug!(source, path = ?file_path, status = status.as_str(), "Resolved remote source");
            let frame = load(&file_path, &options).await?;

            Ok(Self {
                original_source: source.to_owned(),
                kind: SourceKind::Url,
                file_path,
                options,
                frame,
                cache: Some(cache.clone()),
                cache_status: Some(status),
            })
        } else {
            let file_path = local_path(source);
            if !fs::try_exists(&file_path).await? {
                return Err(SourceError::NotFound(file_path));
            }
            let frame = load(&file_path, &options).await?;

            Ok(Self {
                original_source: source.to_owned(),
                kind: SourceKind::LocalFile,
                file_path,
                options,
                frame,
                cache: None,
                cache_status: None,
            })
        }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn original_source(&self) -> &str {
        &self.original_source
    }

    /// How the cache entry was obtained, `None` for local sources
    pub fn cache_status(&self) -> Option<CacheStatus> {
        self.cache_status
    }

    pub fn head(&self, n: i64) -> DataFrame {
        self.frame.head(n)
    }

    pub fn tail(&self, n: i64) -> DataFrame {
        self.frame.tail(n)
    }

    pub fn describe(&self) -> Result<Describe, SourceError> {
        Ok(self.frame.describe()?)
    }

    pub fn metadata(&self) -> SourceMetadata {
        let dtypes = self
            .frame
            .dtypes()
            .into_iter()
            .map(|(name, dtype)| (name, serde_json::Value::from(dtype.as_str())))
            .collect();

        SourceMetadata {
            file_path: self.file_path.clone(),
            original_source: self.original_source.clone(),
            separator: self.options.separator.clone(),
            decimal: self.options.decimal,
            header: self.options.header,
            columns: self.frame.column_names(),
            shape: self.frame.shape(),
            dtypes,
            source_type: self.kind,
            cache_dir: self.cache.as_ref().map(|c| c.cache_dir().to_path_buf()),
            is_cached: self.cache.as_ref().map(|_| self.file_path.exists()),
            cache_status: self.cache_status,
        }
    }

    /// Drop the cached copy of a remote source, download it again and reload.
    pub async fn refresh(&mut self) -> Result<(), SourceError> {
        let Some(cache) = &self.cache else {
            return Err(SourceError::InvalidOperation(
                "Cannot refresh cache for local file sources".to_owned(),
            ));
        };

        if !cache.remove_cached(&self.file_path).await && fs::try_exists(&self.file_path).await? {
            return Err(SourceError::Io(std::io::Error::other(format!(
                "Failed to remove cached file before refresh: {}",
                self.file_path.display()
            ))));
        }
        let status = cache
            .ensure_cached(&self.original_source, &self.file_path)
            .await?;
        self.frame = load(&self.file_path, &self.options).await?;
        self.cache_status = Some(status);

        info!(source = %self.original_source, shape = ?self.frame.shape(), "Refreshed source");
        Ok(())
    }
}

async fn load(path: &Path, options: &ReadOptions) -> Result<DataFrame, SourceError> {
    match read_csv(path, options).await {
        Ok(frame) => Ok(frame),
        Err(TableError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SourceError::NotFound(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::DownloadError;
    use crate::test_utils::{CountingFetcher, FailingFetcher, init_tracing, test_config};

    const PEOPLE: &str = "name,age,city\nAlice,30,NYC\nBob,25,LA\nCharlie,35,Chicago\n";
    const REMOTE: &str = "https://example.com/people.csv";

    fn header() -> ReadOptions {
        ReadOptions::default().with_header(true)
    }

    fn names(frame: &DataFrame) -> Vec<String> {
        frame
            .column("name")
            .unwrap()
            .values()
            .iter()
            .map(|v| v.to_string())
            .collect()
    }

    async fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, text).await.unwrap();
        path
    }

    fn local_cache(dir: &Path) -> CacheManager {
        CacheManager::new(test_config(&dir.join("cache")), Arc::new(FailingFetcher))
    }

    #[tokio::test]
    async fn test_local_file_end_to_end() {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "people.csv", PEOPLE).await;
        let cache = local_cache(dir.path());

        let source = DataSource::open(path.to_str().unwrap(), header(), &cache)
            .await
            .unwrap();

        assert_eq!(source.kind(), SourceKind::LocalFile);
        assert_eq!(source.frame().shape(), (3, 3));
        assert_eq!(names(&source.head(2)), ["Alice", "Bob"]);
        assert_eq!(names(&source.tail(1)), ["Charlie"]);

        let summary = source.describe().unwrap();
        assert_eq!(summary.columns(), ["age"]);
        assert_eq!(summary.get("age", "mean").and_then(|v| v.as_f64()), Some(30.0));

        let metadata = source.metadata();
        assert_eq!(metadata.columns, ["name", "age", "city"]);
        assert_eq!(metadata.shape, (3, 3));
        assert_eq!(metadata.dtypes["age"], "int64");
        assert_eq!(metadata.source_type, SourceKind::LocalFile);
        assert!(metadata.cache_dir.is_none());
        assert!(metadata.cache_status.is_none());

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["source_type"], "local_file");
        assert_eq!(json["shape"], serde_json::json!([3, 3]));
        assert!(json.get("is_cached").is_none());
    }

    #[tokio::test]
    async fn test_file_url_reads_local_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "people.csv", PEOPLE).await;
        let url = ::url::Url::from_file_path(&path).unwrap();

        let source = DataSource::open(url.as_str(), header(), &local_cache(dir.path()))
            .await
            .unwrap();
        assert_eq!(source.kind(), SourceKind::LocalFile);
        assert_eq!(source.file_path(), path);
        assert_eq!(source.frame().height(), 3);
    }

    #[tokio::test]
    async fn test_missing_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.csv");

        let err = DataSource::open(missing.to_str().unwrap(), header(), &local_cache(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::NotFound(ref p) if p == &missing));
        assert!(err.to_string().starts_with("No such file or directory"));
    }

    #[tokio::test]
    async fn test_empty_file_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "empty.csv", "").await;

        let err = DataSource::open(path.to_str().unwrap(), header(), &local_cache(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::EmptyOrMalformed(ref msg) if msg == "No columns to parse from file"));
    }

    #[tokio::test]
    async fn test_invalid_separator_is_rejected_before_download() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(CountingFetcher::new(PEOPLE));
        let cache = CacheManager::new(test_config(dir.path()), fetcher.clone());

        let err = DataSource::open(REMOTE, header().with_separator("::"), &cache)
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::InvalidArgument(_)));
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_refresh_local_source_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "people.csv", PEOPLE).await;
        let mut source = DataSource::open(path.to_str().unwrap(), header(), &local_cache(dir.path()))
            .await
            .unwrap();

        let err = source.refresh().await.unwrap_err();
        assert!(matches!(err, SourceError::InvalidOperation(_)));
        assert_eq!(err.to_string(), "Cannot refresh cache for local file sources");
    }

    #[tokio::test]
    async fn test_remote_source_is_cached_and_refreshed() {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(CountingFetcher::new(PEOPLE));
        let cache = CacheManager::new(test_config(dir.path()), fetcher.clone());

        let first = DataSource::open(REMOTE, header(), &cache).await.unwrap();
        assert_eq!(first.kind(), SourceKind::Url);
        assert_eq!(first.cache_status(), Some(CacheStatus::Downloaded));
        assert_eq!(first.file_path(), cache.cache_path_for(REMOTE));
        assert_eq!(first.frame().shape(), (3, 3));

        let mut second = DataSource::open(REMOTE, header(), &cache).await.unwrap();
        assert_eq!(second.cache_status(), Some(CacheStatus::Hit));
        assert_eq!(fetcher.calls(), 1);

        let metadata = second.metadata();
        assert_eq!(metadata.source_type, SourceKind::Url);
        assert_eq!(metadata.cache_dir.as_deref(), Some(dir.path()));
        assert_eq!(metadata.is_cached, Some(true));
        assert_eq!(metadata.cache_status, Some(CacheStatus::Hit));

        second.refresh().await.unwrap();
        assert_eq!(fetcher.calls(), 2);
        assert_eq!(second.cache_status(), Some(CacheStatus::Downloaded));
        assert_eq!(second.frame().shape(), (3, 3));
    }

    #[tokio::test]
    async fn test_refresh_fails_when_cache_entry_cannot_be_removed() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(CountingFetcher::new(PEOPLE));
        let cache = CacheManager::new(test_config(dir.path()), fetcher.clone());
        let mut source = DataSource::open(REMOTE, header(), &cache).await.unwrap();

        // a directory in place of the entry makes removal fail
        let entry = source.file_path().to_path_buf();
        fs::remove_file(&entry).await.unwrap();
        fs::create_dir(&entry).await.unwrap();

        let err = source.refresh().await.unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(source.frame().shape(), (3, 3));
    }

    #[tokio::test]
    async fn test_remote_download_failure() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(test_config(dir.path()), Arc::new(FailingFetcher));

        let err = DataSource::open(REMOTE, header(), &cache).await.unwrap_err();
        assert!(matches!(
            err,
            SourceError::Cache(CacheError::Download(DownloadError::IoError(_)))
        ));
        assert!(!cache.cache_path_for(REMOTE).exists());
    }
}
