mod config;
mod dataset;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::{extract::State, response::Html, routing::get, Json, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use config::Config;
use dataset::DatasetSummary;

#[derive(Clone)]
struct AppState {
    summary: Arc<DatasetSummary>,
    dist_dir: PathBuf,
}

async fn dataset_summary(State(state): State<AppState>) -> Json<DatasetSummary> {
    Json(state.summary.as_ref().clone())
}

/// Build a cache-controlled static file router.
///
/// Separated so tests can exercise the caching layer with arbitrary directories.
fn cached_static_router(dir: &Path, cache_header: &'static str) -> Router {
    let layer = SetResponseHeaderLayer::overriding(
        axum::http::header::CACHE_CONTROL,
        HeaderValue::from_static(cache_header),
    );
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(layer)
}

// Track exports get replaced in place, so they are only cached briefly
const CACHE_DATA: &str = "public, max-age=300, must-revalidate";
const CACHE_IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// Build the full application router.
fn build_app(config: &Config, summary: Arc<DatasetSummary>) -> Router {
    // Static file routers are stateless, merge them before adding app state
    let static_files = Router::new()
        .nest("/data", cached_static_router(&config.data_dir, CACHE_DATA))
        .nest(
            "/dist",
            cached_static_router(&config.dist_dir, CACHE_IMMUTABLE),
        )
        .nest(
            "/assets",
            cached_static_router(&config.dist_dir.join("assets"), CACHE_IMMUTABLE),
        );

    let state = AppState {
        summary,
        dist_dir: config.dist_dir.clone(),
    };

    Router::new()
        .route("/api/dataset", get(dataset_summary))
        .route("/", get(serve_index))
        .with_state(state)
        .merge(static_files)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("wildtrack_backend=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env();
    let tracks_path = config.tracks_path();
    let summary = DatasetSummary::load(&tracks_path, config.zone).unwrap_or_else(|e| {
        tracing::error!("{e}; serving without a dataset");
        DatasetSummary::empty(&config.tracks_file)
    });

    let app = build_app(&config, Arc::new(summary));

    let addr = config.bind_addr();
    tracing::info!("Server running at http://localhost:{}", config.port);
    tracing::info!("Tracks served from /data/{}", config.tracks_file);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

async fn serve_index(State(state): State<AppState>) -> Html<String> {
    // Try to serve the built frontend, fall back to a simple message
    match tokio::fs::read_to_string(state.dist_dir.join("index.html")).await {
        Ok(html) => Html(html),
        Err(_) => Html(
            r#"<!DOCTYPE html>
<html>
<head><title>Wildtrack</title></head>
<body>
<h1>Wildtrack</h1>
<p>Frontend not built yet. The dataset summary is at <a href="/api/dataset">/api/dataset</a>.</p>
</body>
</html>"#
                .to_string(),
        ),
    }
}
