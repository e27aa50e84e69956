// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod aggregate;
pub mod api;
pub mod config;
pub mod fetch;
pub mod ingest;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod publish;
pub mod temporal;
pub mod validate;

// ---- Re-exports for stable public API ----
pub use crate::api::create_router;
pub use crate::model::{OutageEvent, OutagesPayload, PlannedWindow, Source, Status, VerifiedBy};
pub use crate::pipeline::{run_cycle, PipelineError, RunReport};
pub use crate::temporal::normalize_schedule;
