//! HTTP serving adapter
//!
//! Exposes a checkpoint-loaded model for single-row predictions. The request
//! record mirrors the dataset's feature columns one to one; the adapter's
//! own preprocessing applies, so serving and batch inference agree.

mod error;
mod handlers;
mod state;

pub use error::ServerError;
pub use handlers::{create_router, PredictRequest, PredictResponse};
pub use state::AppState;

use crate::config::RunConfig;
use crate::models::ModelAdapter;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Bind address configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
        }
    }
}

/// Load the configured checkpoint and serve it until ctrl+c
pub async fn run_server(server: ServerConfig, run_config: RunConfig) -> anyhow::Result<()> {
    let checkpoint_path = run_config
        .data
        .checkpoint_dir
        .join(run_config.model.checkpoint_name());
    let adapter = ModelAdapter::load_checkpoint(&checkpoint_path)?;
    info!(
        model = %adapter.kind(),
        checkpoint = %checkpoint_path.display(),
        "loaded checkpoint for serving"
    );

    let state = Arc::new(AppState::new(adapter));
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", server.host, server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "server listening");
    info!(url = %format!("http://{}/api/predict", addr), "prediction endpoint");
    info!(url = %format!("http://{}/api/health", addr), "health endpoint");

    let shutdown_signal = async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;
    info!("server shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
    }
}
