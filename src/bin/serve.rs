//! grid-watch-serve: host the output directory over HTTP and, when enabled, refresh it on
//! the scheduler interval.

use std::sync::Arc;

use anyhow::{Context, Result};
use naija_grid_watch::api::create_router;
use naija_grid_watch::config::AppConfig;
use naija_grid_watch::ingest::{providers, scheduler::spawn_scheduler};
use naija_grid_watch::logging::init_tracing;
use naija_grid_watch::metrics::Metrics;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = Arc::new(AppConfig::load_default()?);
    let metrics = Metrics::init()?;

    if cfg.scheduler.enabled {
        let providers = Arc::new(providers::from_config(&cfg)?);
        spawn_scheduler(cfg.clone(), providers);
        tracing::info!(interval_secs = cfg.scheduler.interval_secs, "scheduler started");
    }

    let app = create_router(&cfg.output_dir, Some(&metrics));
    let listener = tokio::net::TcpListener::bind(&cfg.server.bind)
        .await
        .with_context(|| format!("binding {}", cfg.server.bind))?;
    tracing::info!(bind = %cfg.server.bind, dir = %cfg.output_dir.display(), "serving");
    axum::serve(listener, app).await.context("http server")?;
    Ok(())
}
