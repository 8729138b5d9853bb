//! API module for the video transcription service
//!
//! Provides the REST endpoints that drive the pipeline: upload, status
//! polling, chunk record retrieval, and health.

use anyhow::Result;
use tokio::task::JoinHandle;
use tracing::info;

pub mod handlers;
pub mod models;
pub mod server;

pub use server::AppState;

/// API server wrapper over the shared application state
#[derive(Clone)]
pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Start the API server in the background
    pub fn start_background(self) -> JoinHandle<Result<()>> {
        tokio::spawn(async move { self.start().await })
    }

    /// Start the API server
    pub async fn start(self) -> Result<()> {
        info!(
            "🚀 Starting API server on port {}",
            self.state.config.server.port
        );
        server::start_http_server(self.state).await
    }
}
