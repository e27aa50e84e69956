// src/pipeline.rs
//! One ingestion cycle: adapters → boundary conversion (incl. schedule parsing) →
//! aggregation → validation → publish.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use metrics::{counter, gauge};

use crate::aggregate::aggregate;
use crate::config::AppConfig;
use crate::ingest::types::SourceProvider;
use crate::ingest::{build_events, collect_candidates, ensure_metrics_described, ProviderOutcome};
use crate::model::{OutagesPayload, Source};
use crate::publish::Publisher;
use crate::temporal::LAGOS;
use crate::validate::{validate_payload, Violation};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("payload failed schema validation ({} violation(s))", .0.len())]
    Validation(Vec<Violation>),
    #[error("publish failed: {0:#}")]
    Publish(anyhow::Error),
}

/// What one cycle did.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub per_source: BTreeMap<Source, usize>,
    pub outcomes: Vec<ProviderOutcome>,
    pub candidates: usize,
    pub rejected: usize,
    pub duplicates: usize,
    pub published: usize,
    pub artifact_path: PathBuf,
    pub version_path: PathBuf,
}

impl RunReport {
    pub fn failed_providers(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status != crate::ingest::ProviderStatus::Ok)
            .count()
    }
}

/// Validate `payload` and publish it. On any violation nothing is written.
pub fn publish_checked(
    payload: &OutagesPayload,
    publisher: &Publisher,
) -> Result<(), PipelineError> {
    ensure_metrics_described();
    if let Err(violations) = validate_payload(payload) {
        counter!("publish_validation_failures_total").increment(1);
        for v in &violations {
            tracing::error!(target: "ingest", path = %v.path, reason = %v.reason, "schema violation");
        }
        return Err(PipelineError::Validation(violations));
    }
    publisher.publish(payload).map_err(PipelineError::Publish)
}

/// Run the whole pipeline once using `cfg` for timeouts and output paths.
pub async fn run_cycle(
    cfg: &AppConfig,
    providers: &[Box<dyn SourceProvider>],
    now: DateTime<Utc>,
) -> Result<RunReport, PipelineError> {
    run_cycle_with(
        providers,
        cfg.adapter_timeout(),
        &Publisher::from_config(cfg),
        now,
    )
    .await
}

pub async fn run_cycle_with(
    providers: &[Box<dyn SourceProvider>],
    adapter_timeout: Duration,
    publisher: &Publisher,
    now: DateTime<Utc>,
) -> Result<RunReport, PipelineError> {
    ensure_metrics_described();

    let (candidates, outcomes) = collect_candidates(providers, adapter_timeout).await;
    let candidate_count = candidates.len();
    let (events, rejected) = build_events(candidates);

    let agg = aggregate(events, LAGOS.localize(&now));
    gauge!("ingest_pipeline_last_run_ts").set(now.timestamp() as f64);

    publish_checked(&agg.payload, publisher)?;

    let report = RunReport {
        per_source: agg.per_source,
        outcomes,
        candidates: candidate_count,
        rejected,
        duplicates: agg.duplicates,
        published: agg.payload.events.len(),
        artifact_path: publisher.artifact_path().to_path_buf(),
        version_path: publisher.version_path().to_path_buf(),
    };
    tracing::info!(
        target: "ingest",
        candidates = report.candidates,
        rejected = report.rejected,
        dedup = report.duplicates,
        published = report.published,
        failed_providers = report.failed_providers(),
        "ingest cycle complete"
    );
    Ok(report)
}
