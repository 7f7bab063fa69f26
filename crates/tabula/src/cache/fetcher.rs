//! # Fetcher
//!
//! Transport used by the cache manager to pull a remote resource.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::downloader::create_client;
use crate::{CacheConfig, DownloadError};

/// A transport that can stream a remote resource into a writer
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Write the full body of `url` into `sink`, returning the number of bytes written
    async fn fetch(
        &self,
        url: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64, DownloadError>;
}

/// HTTP(S) fetcher backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a fetcher whose client honors the timeouts in `config`
    pub fn from_config(config: &CacheConfig) -> Result<Self, DownloadError> {
        Ok(Self::new(create_client(config)?))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64, DownloadError> {
        let parsed =
            reqwest::Url::parse(url).map_err(|e| DownloadError::UrlError(format!("{url}: {e}")))?;
        let response = self.client.get(parsed).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::StatusCode(status));
        }

        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            sink.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        sink.flush().await?;

        debug!(url, bytes = written, "Fetched remote resource");
        Ok(written)
    }
}
