mod clubs;
mod db_connection;
mod error;
mod extract;
mod settings;
mod sqlite;

use std::time::Duration;

use anyhow::Result;
use axum::{extract::FromRef, http::StatusCode, routing::get, serve, Json, Router};
use serde_json::{json, Value};
use settings::Settings;
use sqlx::SqlitePool;
use tokio::{net::TcpListener, signal, time::Instant};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, FromRef)]
pub(crate) struct AppState {
    pub(crate) db: SqlitePool,
}

fn create_app(db: SqlitePool, request_timeout: Duration) -> Router {
    let app_state = AppState { db };

    // The browser front-end is served from another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .merge(clubs::router())
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(cors)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    dotenv::from_path("./api/.env").ok();

    let start = Instant::now();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::load()?;
    let db = sqlite::create_pool(&settings.sqlite).await?;

    let app = create_app(db.clone(), settings.server.request_timeout());

    let listener = TcpListener::bind(settings.server.bind_addr()).await?;
    info!("Listening on {}", listener.local_addr()?);

    // Create a shutdown signal handler
    let shutdown = async move {
        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    tracing::warn!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = signal::ctrl_c() => {},
            _ = terminate => {},
        }
        let duration = start.elapsed();
        info!("Shutting down gracefully... in {:?}", duration);
    };

    serve(listener, app).with_graceful_shutdown(shutdown).await?;

    db.close().await;
    info!("Server shutdown complete");

    Ok(())
}
