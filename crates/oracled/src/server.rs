//! HTTP server for oracled.

use crate::config::ServerConfig;
use crate::pipeline::Pipeline;
use crate::routes;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers.
pub struct AppState {
    pub pipeline: Pipeline,
}

/// Run the HTTP server until the process is stopped.
pub async fn run(config: &ServerConfig, pipeline: Pipeline) -> Result<()> {
    let state = Arc::new(AppState { pipeline });

    let app = Router::new()
        .merge(routes::api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
