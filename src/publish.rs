// src/publish.rs
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use metrics::counter;
use serde::Serialize;

use crate::config::AppConfig;
use crate::model::{OutagesPayload, VersionMarker};

/// Writes the artifact and its version marker into the output directory.
///
/// Each file goes to a sibling `.tmp` first and is renamed over the target, so a reader
/// sees either the previous file or the new one. The payload is replaced before the
/// marker; a consumer that sees a new `updatedAt` always finds the matching payload.
#[derive(Debug, Clone)]
pub struct Publisher {
    artifact_path: PathBuf,
    version_path: PathBuf,
}

impl Publisher {
    pub fn new(artifact_path: impl Into<PathBuf>, version_path: impl Into<PathBuf>) -> Self {
        Self {
            artifact_path: artifact_path.into(),
            version_path: version_path.into(),
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(cfg.artifact_path(), cfg.version_path())
    }

    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    pub fn version_path(&self) -> &Path {
        &self.version_path
    }

    pub fn publish(&self, payload: &OutagesPayload) -> Result<()> {
        if payload.events.is_empty() {
            tracing::warn!(
                target: "ingest",
                path = %self.artifact_path.display(),
                "publishing empty payload (no events from any source)"
            );
        }

        for dir in [self.artifact_path.parent(), self.version_path.parent()]
            .into_iter()
            .flatten()
        {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("creating output dir {}", dir.display()))?;
            }
        }

        write_json_atomic(&self.artifact_path, payload)
            .with_context(|| format!("writing {}", self.artifact_path.display()))?;
        let marker = VersionMarker {
            updated_at: payload.generated_at,
        };
        write_json_atomic(&self.version_path, &marker)
            .with_context(|| format!("writing {}", self.version_path.display()))?;

        counter!("publish_total").increment(1);
        tracing::info!(
            target: "ingest",
            events = payload.events.len(),
            path = %self.artifact_path.display(),
            "artifact published"
        );
        Ok(())
    }
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let json = serde_json::to_vec_pretty(value).map_err(io::Error::other)?;
    let tmp = path.with_extension("json.tmp");
    let mut f = fs::File::create(&tmp)?;
    f.write_all(&json)?;
    f.write_all(b"\n")?;
    f.sync_all()?;
    drop(f);
    fs::rename(tmp, path)?;
    Ok(())
}
