use anyhow::Result;
use std::sync::Arc;

use tower_http::services::ServeDir;
use tracing::error;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use super::metrics::metrics_handler;
use super::routes::{health, home, result, search};
use super::state::ServerState;
use super::upstream::UpstreamClient;
use super::{log_requests, RequestsLoggingLevel, ServerConfig};

pub fn make_app(config: ServerConfig, upstream: Arc<UpstreamClient>) -> Router {
    let state = ServerState::new(config.clone(), upstream);

    let api_routes: Router = Router::new()
        .route("/{source}/search", post(search))
        .route("/{source}/result/{job_uuid}", get(result))
        .with_state(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let mut app: Router = home_router
        .route("/health", get(health))
        .nest("/api", api_routes);

    app = app.layer(middleware::from_fn_with_state(state.clone(), log_requests));

    app
}

pub async fn run_server(
    upstream: UpstreamClient,
    requests_logging_level: RequestsLoggingLevel,
    port: u16,
    metrics_port: u16,
    frontend_dir_path: Option<String>,
) -> Result<()> {
    let config = ServerConfig {
        port,
        requests_logging_level,
        frontend_dir_path,
    };
    let app = make_app(config, Arc::new(upstream));

    let metrics_app: Router = Router::new().route("/metrics", get(metrics_handler));
    let metrics_listener =
        tokio::net::TcpListener::bind(format!("127.0.0.1:{}", metrics_port)).await?;
    tokio::spawn(async move {
        if let Err(err) = axum::serve(metrics_listener, metrics_app).await {
            error!("Metrics server error: {}", err);
        }
    });

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;

    Ok(axum::serve(listener, app).await?)
}
