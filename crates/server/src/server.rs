//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration with all endpoints
//! - Middleware stack (request id, logging, compression, CORS, timeout)
//! - Graceful shutdown handling

use crate::config::ServerConfig;
use crate::metrics::install_recorder;
use crate::middleware::{log_requests, request_id};
use crate::routes::{auth, events, health, payments, upload};
use crate::routes::{landing, not_found};
use crate::state::ServerState;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use docgate::GatewayConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes and middleware
///
/// Uploads carry their own bearer-token check inside the pipeline, so
/// there is no router-level auth layer.
///
/// Middleware stack (outermost first):
/// 1. Tracing
/// 2. Request ID tracking
/// 3. Request logging
/// 4. CORS
/// 5. Compression (skips `text/event-stream`)
/// 6. Timeout handling
pub fn build_router(state: Arc<ServerState>) -> Router {
    // CORS layer
    let cors = if state.config.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    let mut router = Router::new()
        .route("/", get(landing))
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .route("/sse", get(events::sse))
        .route("/verify_dev", get(auth::verify_dev))
        .route("/create_payment", post(payments::create_payment))
        .route(
            "/upload_document",
            post(upload::upload_document)
                .layer(DefaultBodyLimit::max(state.config.max_body_size())),
        );

    let static_dir = &state.config.static_dir;
    if static_dir.is_dir() {
        router = router.nest_service("/static", ServeDir::new(static_dir));
    } else {
        tracing::warn!(dir = %static_dir.display(), "static directory not found");
    }

    router
        .fallback(not_found)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.timeout(),
        ))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(from_fn(log_requests))
        .layer(from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the docgate HTTP server
///
/// Initializes logging and metrics, builds the shared state from both
/// configurations and serves until SIGTERM or Ctrl+C.
///
/// # Example
///
/// ```rust,no_run
/// use docgate::GatewayConfig;
/// use server::ServerConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ServerConfig::load()?;
///     let gateway = GatewayConfig::from_env()?;
///     server::start_server(config, gateway).await?;
///     Ok(())
/// }
/// ```
pub async fn start_server(config: ServerConfig, gateway: GatewayConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .json()
        .init();

    let mut state = ServerState::new(config.clone(), gateway).await?;
    if config.metrics_enabled {
        state = state.with_prometheus(install_recorder()?);
    }

    let app = build_router(Arc::new(state));

    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!(
        addr = %addr,
        timeout_secs = config.timeout_secs,
        max_body_mb = config.max_body_size_mb,
        cors = config.enable_cors,
        metrics = config.metrics_enabled,
        "Starting docgate server"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
