// src/api.rs
use std::path::Path;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::metrics::Metrics;

/// Static host for the published artifacts plus liveness and metrics.
///
/// `/outages.json` and `/version.json` (or whatever the config names them) come straight
/// from `output_dir`; a missing artifact is a plain 404, which consumers treat as
/// "use the fallback".
pub fn create_router(output_dir: &Path, metrics: Option<&Metrics>) -> Router {
    let mut router = Router::new().route("/health", get(|| async { "ok" }));
    if let Some(m) = metrics {
        router = router.merge(m.router());
    }
    router
        .fallback_service(ServeDir::new(output_dir))
        .layer(CorsLayer::very_permissive())
}
