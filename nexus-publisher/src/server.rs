//! HTTP server setup and routing.
//!
//! `/api/*` is handled by [`crate::api`]; every other path belongs to the web
//! client. Existing files under the static directory are served as-is and
//! anything else gets the client's entry document, so client-side routes
//! survive a page reload.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    response::Html,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{api, config::Config, state::AppState, upstream::UpstreamClient};

/// Build the application router around an existing state.
pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/parse-jar", post(api::parse_jar))
        .route("/upload", post(api::upload))
        .route("/health", get(api::health))
        .fallback(api::not_found);

    let body_limit = state.config.max_request_body_size_bytes();
    let static_files = &state.config.static_files;
    let index_path = static_files.index_path();

    let router = Router::new().nest("/api", api_routes);
    let router = if index_path.is_file() {
        info!(dir = %static_files.dir.display(), "Serving web client from static directory");
        router.fallback_service(
            ServeDir::new(&static_files.dir).fallback(ServeFile::new(&index_path)),
        )
    } else {
        warn!(
            index = %index_path.display(),
            "Web client entry document not found, serving built-in page"
        );
        router.fallback(embedded_index)
    };

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn embedded_index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

/// Create the shared state for a configuration.
pub fn create_state(config: Config) -> Result<Arc<AppState>> {
    let upstream = UpstreamClient::new(config.upstream.to_upstream_config())
        .context("Failed to create upstream HTTP client")?;

    Ok(Arc::new(AppState {
        config: Arc::new(config),
        repository: Arc::new(upstream),
    }))
}

/// Run the server with optional graceful shutdown
pub async fn run_server_with_shutdown(
    config: Config,
    host: String,
    port: u16,
    shutdown_receiver: Option<tokio::sync::oneshot::Receiver<()>>,
) -> Result<()> {
    info!("Starting Nexus Publisher");

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid socket address {host}:{port}"))?;

    let state = create_state(config)?;
    let app = build_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    println!("✅ Nexus Publisher is running on http://{addr}");
    println!("   Inspect:  curl -F file=@app.jar http://localhost:{port}/api/parse-jar");
    println!("   Health:   curl http://localhost:{port}/api/health");
    info!("Server listening on {}", addr);

    match shutdown_receiver {
        Some(shutdown_rx) => {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                    info!("Received shutdown signal, stopping gracefully");
                })
                .await
                .context("Server error")?;
        }
        None => {
            axum::serve(listener, app).await.context("Server error")?;
        }
    }

    Ok(())
}

/// Run the server in the foreground until the process is stopped.
pub async fn run_server(config: Config, host: String, port: u16) -> Result<()> {
    run_server_with_shutdown(config, host, port, None).await
}
