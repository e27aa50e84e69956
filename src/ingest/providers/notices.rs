// src/ingest/providers/notices.rs
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;

use crate::ingest::types::{Candidate, NoticeItem, SourceProvider};

/// Curated JSON array of [`NoticeItem`]s, maintained by hand or by a page scraper.
pub struct NoticesProvider {
    name: String,
    mode: Mode,
}

enum Mode {
    File(PathBuf),
    Inline(String),
}

impl NoticesProvider {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            name: "notices".to_string(),
            mode: Mode::File(path.into()),
        }
    }

    pub fn from_json_str(name: &str, json: &str) -> Self {
        Self {
            name: name.to_string(),
            mode: Mode::Inline(json.to_string()),
        }
    }

    /// The file must be a JSON array; elements that do not fit [`NoticeItem`] are skipped
    /// one by one and counted as rejected.
    fn parse(&self, json: &str) -> Result<Vec<Candidate>> {
        let raw: Vec<serde_json::Value> =
            serde_json::from_str(json).context("parsing notices json")?;
        let mut out = Vec::with_capacity(raw.len());
        let mut malformed = 0u64;
        for (index, value) in raw.into_iter().enumerate() {
            match serde_json::from_value::<NoticeItem>(value) {
                Ok(item) => out.push(Candidate::Notice(item)),
                Err(e) => {
                    malformed += 1;
                    tracing::warn!(
                        target: "ingest",
                        provider = %self.name,
                        index,
                        error = %e,
                        "skipping malformed notice"
                    );
                }
            }
        }
        if malformed > 0 {
            counter!("ingest_rejected_total").increment(malformed);
        }
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for NoticesProvider {
    async fn fetch_latest(&self) -> Result<Vec<Candidate>> {
        match &self.mode {
            Mode::Inline(s) => self.parse(s),
            Mode::File(path) => {
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("reading notices from {}", path.display()))?;
                self.parse(&raw)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
