//! Shared fixtures for unit tests.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{Mutex, mpsc, oneshot};

use crate::cache::Fetcher;
use crate::{CacheConfig, DownloadError};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Cache config rooted at `dir` with short polling for tests
pub fn test_config(dir: &Path) -> CacheConfig {
    CacheConfig::builder()
        .with_cache_dir(dir)
        .with_max_wait_time(Duration::from_secs(5))
        .with_poll_interval(Duration::from_millis(20))
        .build()
}

/// Serves a fixed body and counts transfers
pub struct CountingFetcher {
    body: Vec<u8>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl CountingFetcher {
    pub fn new(body: impl AsRef<[u8]>) -> Self {
        Self {
            body: body.as_ref().to_vec(),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for CountingFetcher {
    async fn fetch(
        &self,
        _url: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64, DownloadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        sink.write_all(&self.body).await?;
        Ok(self.body.len() as u64)
    }
}

/// Always fails like an unreachable host
pub struct FailingFetcher;

#[async_trait]
impl Fetcher for FailingFetcher {
    async fn fetch(
        &self,
        url: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64, DownloadError> {
        sink.write_all(b"partial").await?;
        Err(DownloadError::IoError(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            format!("connection refused: {url}"),
        )))
    }
}

/// Writes `first`, signals, then waits for a release before writing `second`
pub struct GatedFetcher {
    first: Vec<u8>,
    second: Vec<u8>,
    started: mpsc::UnboundedSender<()>,
    release: Mutex<Option<oneshot::Receiver<()>>>,
}

impl GatedFetcher {
    pub fn new(
        first: &[u8],
        second: &[u8],
    ) -> (Self, mpsc::UnboundedReceiver<()>, oneshot::Sender<()>) {
        let (started_tx, started_rx) = mpsc::unbounded_channel();
        let (release_tx, release_rx) = oneshot::channel();
        let fetcher = Self {
            first: first.to_vec(),
            second: second.to_vec(),
            started: started_tx,
            release: Mutex::new(Some(release_rx)),
        };
        (fetcher, started_rx, release_tx)
    }
}

#[async_trait]
impl Fetcher for GatedFetcher {
    async fn fetch(
        &self,
        _url: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64, DownloadError> {
        sink.write_all(&self.first).await?;
        sink.flush().await?;
        let _ = self.started.send(());

        if let Some(release) = self.release.lock().await.take() {
            release
                .await
                .map_err(|_| DownloadError::IoError(std::io::Error::other("released without signal")))?;
        }

        sink.write_all(&self.second).await?;
        Ok((self.first.len() + self.second.len()) as u64)
    }
}
