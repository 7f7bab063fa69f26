use tabula::{AppError, AppState, ServerConfig, create_router};
use tabula_engine::CacheManager;
use tracing::{error, info};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

fn main() {
    if let Err(e) = bootstrap() {
        eprintln!("Error: {e}");
        error!(error = ?e, "Server failed");
        std::process::exit(1);
    }
}

#[tokio::main]
async fn bootstrap() -> Result<(), AppError> {
    let config = ServerConfig::load();
    init_logging(config.verbose)?;

    info!("Tabula v{}", env!("CARGO_PKG_VERSION"));
    info!(
        cache_dir = ?config.cache_dir,
        download_timeout = config.download_timeout,
        max_wait = config.max_wait,
        "Cache configuration"
    );

    let cache = CacheManager::with_http(config.cache_config())?;
    let address = config.bind_address();
    let router = create_router(AppState::new(config, cache));

    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(address = %listener.local_addr()?, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn init_logging(verbose: bool) -> Result<(), AppError> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init()
        .map_err(|e| AppError::Initialization(e.to_string()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
