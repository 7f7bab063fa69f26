//! Server test utilities.

use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tabula::{AppState, ServerConfig, create_router};
use tabula_engine::CacheManager;
use tempfile::TempDir;
use tower::ServiceExt;

pub const PEOPLE_CSV: &str = "name,age,city\nAlice,30,NYC\nBob,25,LA\nCharlie,35,Chicago\n";

/// A router over a temporary cache directory.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a test server with custom config modifications.
    pub fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut ServerConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        let mut config = ServerConfig {
            cache_dir: temp_dir.path().join("cache"),
            download_timeout: 5,
            max_wait: 5,
            ..Default::default()
        };
        modifier(&mut config);

        let cache_config = tabula_engine::CacheConfig::builder()
            .with_cache_dir(&config.cache_dir)
            .with_timeout(Duration::from_secs(config.download_timeout))
            .with_max_wait_time(Duration::from_secs(config.max_wait))
            .with_poll_interval(Duration::from_millis(20))
            .build();
        let cache = CacheManager::with_http(cache_config).expect("Failed to build cache manager");

        let state = AppState::new(config, cache);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            temp_dir,
        }
    }

    /// Scratch directory for local source files
    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn cache_dir(&self) -> &Path {
        self.state.cache.cache_dir()
    }

    /// Write a local CSV file and return its path as a string
    pub fn write_csv(&self, name: &str, contents: &str) -> String {
        let path: PathBuf = self.dir().join(name);
        std::fs::write(&path, contents).expect("Failed to write CSV fixture");
        path.to_string_lossy().into_owned()
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, Some(body)).await
    }

    /// Send a request with an optional JSON body and decode the JSON response
    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = match body {
            Some(v) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(serde_json::to_vec(&v).unwrap())
            }
            None => Body::empty(),
        };

        let request = builder.body(body).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }
}
