//! Bennie Williams consulting site - content tree, seed commands, health probes
//! and deployment tooling.

pub mod cache;
pub mod config;
pub mod content;
pub mod db;
pub mod deploy;
pub mod logging;
pub mod routes;
pub mod seed;
pub mod state;
pub mod store;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

use crate::config::SiteConfig;
use crate::state::AppState;

/// Configure CORS from environment variables.
/// Uses ALLOWED_ORIGINS (comma-separated) or FRONTEND_ORIGIN.
/// Falls back to the local development origins.
pub fn configure_cors() -> CorsLayer {
    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .ok()
        .and_then(|s| {
            let origins: Vec<HeaderValue> = s
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                None
            } else {
                Some(origins)
            }
        })
        .or_else(|| {
            std::env::var("FRONTEND_ORIGIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(|origin| vec![origin])
        })
        .unwrap_or_else(|| {
            vec![
                HeaderValue::from_static("http://localhost:8000"),
                HeaderValue::from_static("http://127.0.0.1:8000"),
            ]
        });

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::HEAD])
        .allow_headers([axum::http::header::CONTENT_TYPE])
}

/// Create and configure the application router.
pub fn create_app(state: AppState) -> Router {
    let cors = configure_cors();
    tracing::info!("CORS configured");

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/health/", get(routes::health::health_check))
        .route("/ready", get(routes::health::readiness_check))
        .route("/ready/", get(routes::health::readiness_check))
        .route("/api/pages/", get(routes::pages::get_site_root))
        .route("/api/pages/{*path}", get(routes::pages::get_page))
        .route("/rss.xml", get(routes::rss::rss_feed))
        .with_state(state)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        // Read-only API; nothing legitimate sends a large body
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        .layer(cors)
}

/// Build the shared state from configuration. Falls back to the in-memory
/// store when no database is configured or reachable.
pub async fn build_state(config: SiteConfig) -> AppState {
    if config.database_url.is_none() {
        tracing::info!("DATABASE_URL not set. Running on the in-memory store.");
        return AppState::in_memory(config);
    }

    match db::init_pool(None).await {
        Ok(pool) => {
            if let Err(e) = db::run_migrations(&pool).await {
                tracing::error!("Failed to run database migrations: {}", e);
            }
            AppState::with_database(config, pool)
        }
        Err(e) => {
            tracing::warn!(
                "Failed to initialize database pool: {}. Continuing without database.",
                e
            );
            AppState::in_memory(config)
        }
    }
}

/// Run the server (used by main).
pub async fn run() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    // Dropping the guards shuts down the writer threads and loses buffered lines.
    let _log_guards = logging::init(&logging::LoggingConfig::from_env());

    let config = SiteConfig::from_env();
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    tracing::info!(environment = %config.environment, "Loaded site configuration");

    let state = build_state(config).await;
    let app = create_app(state);

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}
