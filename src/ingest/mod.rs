// src/ingest/mod.rs
pub mod fields;
pub mod providers;
pub mod scheduler;
pub mod types;

use crate::ingest::types::{Candidate, SourceProvider};
use crate::model::OutageEvent;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, histogram};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use std::time::Duration;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "ingest_events_total",
            "Candidates returned by source adapters."
        );
        describe_counter!(
            "ingest_rejected_total",
            "Candidates dropped at the boundary (no title, bad timestamp)."
        );
        describe_counter!("ingest_dedup_total", "Events dropped as duplicate ids.");
        describe_counter!(
            "ingest_provider_errors_total",
            "Adapter fetch/parse errors."
        );
        describe_counter!(
            "ingest_provider_timeouts_total",
            "Adapters abandoned after the per-adapter timeout."
        );
        describe_histogram!("ingest_parse_ms", "RSS XML parse time in milliseconds.");
        describe_histogram!(
            "ingest_provider_fetch_ms",
            "Whole adapter fetch time in milliseconds, timeouts included."
        );
        describe_counter!("publish_total", "Artifacts written.");
        describe_counter!(
            "publish_validation_failures_total",
            "Runs aborted by schema validation."
        );
        describe_gauge!(
            "ingest_pipeline_last_run_ts",
            "Unix ts when the ingest pipeline last ran."
        );
    });
}

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Clean scraped text: decode entities, strip tags, fold curly quotes and whitespace,
/// drop trailing sentence punctuation, cap at `max_chars` characters.
pub fn normalize_text(s: &str, max_chars: usize) -> String {
    let decoded = html_escape::decode_html_entities(s);
    let untagged = RE_TAGS.replace_all(&decoded, " ");

    let quoted = untagged
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    let mut out = RE_WS.replace_all(&quoted, " ").trim().to_string();

    while let Some(last) = out.chars().last() {
        if matches!(last, '!' | '?' | '.' | ',' | ';' | ':') {
            out.pop();
        } else {
            break;
        }
    }
    let out = out.trim_end();

    if out.chars().count() > max_chars {
        out.chars().take(max_chars).collect::<String>().trim_end().to_string()
    } else {
        out.to_string()
    }
}

/// How one adapter fared during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderStatus {
    Ok,
    Failed(String),
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderOutcome {
    pub provider: String,
    pub candidates: usize,
    pub status: ProviderStatus,
}

/// Fan out to every adapter concurrently and wait for all of them.
///
/// A failing or hung adapter contributes zero candidates; its outcome records why.
/// Candidates come back in adapter order, so first-seen dedup follows the provider list.
pub async fn collect_candidates(
    providers: &[Box<dyn SourceProvider>],
    timeout: Duration,
) -> (Vec<Candidate>, Vec<ProviderOutcome>) {
    ensure_metrics_described();

    let fetches = providers.iter().map(|p| async move {
        let t0 = std::time::Instant::now();
        let res = tokio::time::timeout(timeout, p.fetch_latest()).await;
        histogram!("ingest_provider_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        (p.name().to_string(), res)
    });
    let results = futures::future::join_all(fetches).await;

    let mut candidates = Vec::new();
    let mut outcomes = Vec::with_capacity(results.len());
    for (provider, res) in results {
        let outcome = match res {
            Ok(Ok(mut batch)) => {
                let n = batch.len();
                counter!("ingest_events_total").increment(n as u64);
                candidates.append(&mut batch);
                ProviderOutcome {
                    provider,
                    candidates: n,
                    status: ProviderStatus::Ok,
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(target: "ingest", error = ?e, provider = %provider, "provider error");
                counter!("ingest_provider_errors_total").increment(1);
                ProviderOutcome {
                    provider,
                    candidates: 0,
                    status: ProviderStatus::Failed(format!("{e:#}")),
                }
            }
            Err(_) => {
                tracing::warn!(
                    target: "ingest",
                    provider = %provider,
                    timeout_secs = timeout.as_secs_f64(),
                    "provider timed out"
                );
                counter!("ingest_provider_timeouts_total").increment(1);
                ProviderOutcome {
                    provider,
                    candidates: 0,
                    status: ProviderStatus::TimedOut,
                }
            }
        };
        outcomes.push(outcome);
    }

    (candidates, outcomes)
}

/// Convert candidates at the boundary. Returns the events and the number rejected.
pub fn build_events(candidates: Vec<Candidate>) -> (Vec<OutageEvent>, usize) {
    let mut rejected = 0usize;
    let mut events = Vec::with_capacity(candidates.len());
    for c in candidates {
        let source = c.source();
        match c.into_event() {
            Ok(ev) => events.push(ev),
            Err(reason) => {
                rejected += 1;
                tracing::debug!(target: "ingest", %source, %reason, "candidate rejected");
            }
        }
    }
    counter!("ingest_rejected_total").increment(rejected as u64);
    (events, rejected)
}
