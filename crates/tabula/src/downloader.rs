use reqwest::Client;
use tracing::debug;

use crate::{CacheConfig, DownloadError};

/// Create a reqwest Client with the provided configuration
pub fn create_client(config: &CacheConfig) -> Result<Client, DownloadError> {
    let mut client_builder = Client::builder()
        .pool_max_idle_per_host(5)
        .user_agent(&config.user_agent)
        .redirect(if config.follow_redirects {
            reqwest::redirect::Policy::limited(10)
        } else {
            reqwest::redirect::Policy::none()
        });

    if !config.timeout.is_zero() {
        client_builder = client_builder.timeout(config.timeout);
    }

    if !config.connect_timeout.is_zero() {
        client_builder = client_builder.connect_timeout(config.connect_timeout);
    }

    debug!(
        timeout = ?config.timeout,
        connect_timeout = ?config.connect_timeout,
        "Building HTTP client for cache downloads"
    );

    client_builder.build().map_err(DownloadError::from)
}
