//! grid-watch: run one ingestion cycle and exit.
//!
//! Exit status: 0 published, 2 payload failed schema validation (nothing written),
//! 1 any other fatal error (config, I/O while publishing).

use std::process::ExitCode;

use naija_grid_watch::config::AppConfig;
use naija_grid_watch::ingest::providers;
use naija_grid_watch::logging::init_tracing;
use naija_grid_watch::pipeline::{run_cycle, PipelineError};

const EXIT_FATAL: u8 = 1;
const EXIT_VALIDATION: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = match AppConfig::load_default() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = ?e, "config error");
            return ExitCode::from(EXIT_FATAL);
        }
    };
    let providers = match providers::from_config(&cfg) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = ?e, "could not build providers");
            return ExitCode::from(EXIT_FATAL);
        }
    };

    match run_cycle(&cfg, &providers, chrono::Utc::now()).await {
        Ok(report) => {
            for (source, n) in &report.per_source {
                tracing::info!(source = %source, events = *n, "per-source");
            }
            ExitCode::SUCCESS
        }
        Err(PipelineError::Validation(violations)) => {
            tracing::error!(
                violations = violations.len(),
                "publish skipped, previous artifact left in place"
            );
            ExitCode::from(EXIT_VALIDATION)
        }
        Err(e) => {
            tracing::error!(error = %e, "ingest failed");
            ExitCode::from(EXIT_FATAL)
        }
    }
}
