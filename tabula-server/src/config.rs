use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tabula_engine::CacheConfig;

/// Server settings, read from flags, environment variables and `.env`
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tabula",
    version,
    about = "Load and inspect CSV data from local files and remote URLs",
    long_about = "Serves a JSON API that loads CSV data from local paths or http(s) URLs.\n\
                  Remote files are downloaded once into a shared cache directory; concurrent\n\
                  requests for the same URL wait for the first download instead of repeating it."
)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "SERVER_HOST", default_value = "localhost")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "SERVER_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Directory for cached remote files
    #[arg(long, env = "TABULA_CACHE_DIR", default_value = "data/cache")]
    pub cache_dir: PathBuf,

    /// Download timeout in seconds
    #[arg(long, env = "TABULA_DOWNLOAD_TIMEOUT", default_value_t = 30)]
    pub download_timeout: u64,

    /// Maximum seconds to wait for a download started by another process
    #[arg(long, env = "TABULA_MAX_WAIT", default_value_t = 300)]
    pub max_wait: u64,

    /// Cap on rows returned in the preview of /data/load; all rows when unset
    #[arg(long, env = "TABULA_PREVIEW_LIMIT")]
    pub preview_limit: Option<usize>,

    /// Refuse sources pointing at loopback hosts
    #[arg(long, env = "TABULA_REJECT_LOOPBACK", default_value_t = false)]
    pub reject_loopback: bool,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable detailed debug logging")]
    pub verbose: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: 8000,
            cache_dir: PathBuf::from("data/cache"),
            download_timeout: 30,
            max_wait: 300,
            preview_limit: None,
            reject_loopback: false,
            verbose: false,
        }
    }
}

impl ServerConfig {
    /// Load `.env` if present, then parse flags and environment
    pub fn load() -> Self {
        // a missing .env is normal
        let _ = dotenvy::dotenv();
        Self::parse()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::builder()
            .with_cache_dir(&self.cache_dir)
            .with_timeout(Duration::from_secs(self.download_timeout))
            .with_max_wait_time(Duration::from_secs(self.max_wait))
            .build()
    }
}
