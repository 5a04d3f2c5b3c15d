//! HTTP server implementation using Axum.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    routing::{get, post},
};
use dpdmark_content::{ContentApi, FeedSettings};
use dpdmark_core::config::MarketingConfig;
use dpdmark_db::MarketingDb;
use dpdmark_scheduler::{Dispatcher, MetricsRecorder};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::routes;

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<MarketingConfig>,
    pub db: Arc<MarketingDb>,
    pub metrics: MetricsRecorder,
    pub content: ContentApi,
    /// Same dispatcher the background loop drives, for on-demand sweeps.
    pub dispatcher: Arc<Dispatcher>,
    pub feed: FeedSettings,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: MarketingConfig, db: Arc<MarketingDb>, dispatcher: Arc<Dispatcher>) -> Self {
        let feed = FeedSettings::from_config(&config.server, &config.feeds);
        Self {
            metrics: MetricsRecorder::new(db.clone()),
            content: ContentApi::new(db.clone()),
            config: Arc::new(config),
            db,
            dispatcher,
            feed,
            start_time: Instant::now(),
        }
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let shared = Arc::new(state);

    let api = Router::new()
        .route(
            "/api/schedule/social",
            get(routes::list_social).post(routes::schedule_social),
        )
        .route(
            "/api/schedule/email",
            get(routes::list_email).post(routes::schedule_email),
        )
        .route("/api/blog", get(routes::list_blog).post(routes::publish_blog))
        .route("/api/metrics/summary", get(routes::metrics_summary))
        .route("/api/scheduler/run", post(routes::run_scheduler));

    let public = Router::new()
        .route("/", get(routes::dashboard_page))
        .route("/dashboard", get(routes::dashboard_page))
        .route("/health", get(routes::health_check))
        .route("/track", get(routes::track))
        .route("/blog/{slug}", get(routes::blog_page))
        .route("/robots.txt", get(routes::robots))
        .route("/sitemap.xml", get(routes::sitemap))
        .route("/rss.xml", get(routes::rss));

    api.merge(public)
        .layer({
            let cors = CorsLayer::new()
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers(Any)
                .max_age(std::time::Duration::from_secs(3600));

            // Example: DPDMARK_CORS_ORIGINS=https://dpdjournals.com,https://admin.dpdjournals.com
            if let Ok(origins_str) = std::env::var("DPDMARK_CORS_ORIGINS") {
                let origins: Vec<_> = origins_str
                    .split(',')
                    .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
                    .collect();
                cors.allow_origin(origins)
            } else {
                cors.allow_origin(Any)
            }
        })
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🌐 dpdmark listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("🛑 HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("⚠️ Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
