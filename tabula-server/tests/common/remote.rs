//! A throwaway HTTP server that serves CSV files to the cache.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Clone, Default)]
struct Files {
    contents: Arc<HashMap<String, String>>,
    hits: Arc<AtomicUsize>,
}

/// Serves fixed files at `/files/{name}` and counts successful downloads.
#[allow(dead_code)]
pub struct RemoteFiles {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

#[allow(dead_code)]
impl RemoteFiles {
    pub async fn start(files: &[(&str, &str)]) -> Self {
        let state = Files {
            contents: Arc::new(
                files
                    .iter()
                    .map(|(name, body)| ((*name).to_owned(), (*body).to_owned()))
                    .collect(),
            ),
            hits: Arc::new(AtomicUsize::new(0)),
        };
        let hits = state.hits.clone();

        let app = Router::new()
            .route("/files/{name}", get(serve_file))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test file server");
        let addr = listener.local_addr().expect("Failed to read local address");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test file server failed");
        });

        Self { addr, hits, handle }
    }

    pub fn url(&self, name: &str) -> String {
        format!("http://{}/files/{name}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for RemoteFiles {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_file(
    State(files): State<Files>,
    Path(name): Path<String>,
) -> Result<String, StatusCode> {
    let body = files.contents.get(&name).cloned().ok_or(StatusCode::NOT_FOUND)?;
    files.hits.fetch_add(1, Ordering::SeqCst);
    Ok(body)
}
