// src/ingest/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::config::AppConfig;
use crate::ingest::types::SourceProvider;
use crate::pipeline::{run_cycle, PipelineError};

/// Spawn a background loop that runs one ingestion cycle per tick.
///
/// The first tick fires immediately. A failed cycle is logged and the previous artifact
/// stays in place until the next tick.
pub fn spawn_scheduler(
    cfg: Arc<AppConfig>,
    providers: Arc<Vec<Box<dyn SourceProvider>>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(Duration::from_secs(cfg.scheduler.interval_secs.max(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match run_cycle(&cfg, &providers, chrono::Utc::now()).await {
                Ok(report) => tracing::info!(
                    target: "ingest",
                    published = report.published,
                    failed_providers = report.failed_providers(),
                    "scheduled ingest tick"
                ),
                Err(PipelineError::Validation(v)) => tracing::error!(
                    target: "ingest",
                    violations = v.len(),
                    "scheduled ingest aborted by validation"
                ),
                Err(e) => tracing::error!(target: "ingest", error = %e, "scheduled ingest failed"),
            }
        }
    })
}
