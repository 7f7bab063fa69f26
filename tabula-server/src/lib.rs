//! # Tabula
//!
//! JSON API over the tabula engine: load CSV data from local files or
//! http(s) URLs, then slice, summarise and inspect it.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult, AppError};
pub use routes::create_router;
pub use state::AppState;
