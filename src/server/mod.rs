pub mod error;
pub mod routes;
pub mod state;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub use error::ApiError;
pub use state::AppState;

use crate::Result;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let index = ServeFile::new(state.frontend_dir.join("index.html"));
    let assets = ServeDir::new(&state.frontend_dir);

    Router::new()
        .route_service("/", index)
        .route("/healthz", get(routes::healthz))
        .route("/transcribir", post(routes::transcribe))
        .fallback_service(assets)
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}

/// Bind `host:port` and serve until Ctrl-C
pub async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
