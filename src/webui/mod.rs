//! Browser dashboard served over HTTP.
//!
//! Every request rebuilds the report from disk, so edits to the CSV files
//! show up on the next page load.

use axum::{Router, routing::get};
use sheetwise_core::{Config, Report};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod handlers;
pub mod page;

use error::AppError;

/// The shared application state that all handlers can access.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Config,
}

impl AppState {
    /// Build the report off the async runtime; loading reads files.
    pub async fn build_report(&self) -> Result<Report, AppError> {
        let config = self.config.clone();
        let report = tokio::task::spawn_blocking(move || Report::build(&config)).await?;
        Ok(report)
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/report", get(handlers::report_json))
        .route("/api/sections/:group", get(handlers::section_json))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Bind `addr` and serve the dashboard until the process is stopped.
pub async fn run_server(addr: SocketAddr, config: Config) -> anyhow::Result<()> {
    let app = router(Arc::new(AppState { config }));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web UI listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
