// src/config/app.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fetch::RetryPolicy;
use crate::model::Source;

pub const ENV_CONFIG_PATH: &str = "GRID_WATCH_CONFIG";
pub const ENV_OUTPUT_DIR: &str = "GRID_WATCH_OUTPUT_DIR";
pub const ENV_ADAPTER_TIMEOUT: &str = "GRID_WATCH_ADAPTER_TIMEOUT_SECS";

pub const DEFAULT_TOML_PATH: &str = "config/ingest.toml";
pub const DEFAULT_JSON_PATH: &str = "config/ingest.json";

/// Process-wide settings. Built once in `main` and passed down by reference.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory the front end reads from.
    pub output_dir: PathBuf,
    pub artifact_file: String,
    pub version_file: String,
    /// Upper bound on one adapter's fetch + parse.
    pub adapter_timeout_secs: u64,
    pub http: HttpConfig,
    pub feeds: Vec<FeedConfig>,
    /// Curated JSON list of notices; skipped when absent.
    pub notices_path: Option<PathBuf>,
    pub scheduler: SchedulerConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub attempts: u32,
    pub retry_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub name: String,
    pub source: Source,
    pub url: String,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("public/data"),
            artifact_file: "outages.json".to_string(),
            version_file: "version.json".to_string(),
            adapter_timeout_secs: 20,
            http: HttpConfig::default(),
            feeds: Vec::new(),
            notices_path: None,
            scheduler: SchedulerConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            attempts: 2,
            retry_delay_ms: 1_000,
            request_timeout_secs: 10,
            user_agent: concat!("naija-grid-watch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: 1_800,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from an explicit path. TOML or JSON, picked by extension with a content fallback.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let mut cfg = parse_config(&content, &ext)
            .with_context(|| format!("parsing config {}", path.display()))?;
        cfg.resolve_relative_to(path.parent());
        Ok(cfg)
    }

    /// Resolve the config location, then apply env overrides and validate:
    /// 1) $GRID_WATCH_CONFIG
    /// 2) config/ingest.toml
    /// 3) config/ingest.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else if Path::new(DEFAULT_TOML_PATH).exists() {
            Self::load_from(Path::new(DEFAULT_TOML_PATH))?
        } else if Path::new(DEFAULT_JSON_PATH).exists() {
            Self::load_from(Path::new(DEFAULT_JSON_PATH))?
        } else {
            tracing::info!("no config file found, using defaults");
            Self::default()
        };
        cfg.apply_env_overrides()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(dir) = std::env::var(ENV_OUTPUT_DIR) {
            if !dir.trim().is_empty() {
                self.output_dir = PathBuf::from(dir.trim());
            }
        }
        if let Ok(raw) = std::env::var(ENV_ADAPTER_TIMEOUT) {
            self.adapter_timeout_secs = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_ADAPTER_TIMEOUT} is not a number: {raw}"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.artifact_file.trim().is_empty() || self.version_file.trim().is_empty() {
            bail!("artifact_file and version_file must be set");
        }
        if self.artifact_file == self.version_file {
            bail!("artifact_file and version_file must differ");
        }
        if self.adapter_timeout_secs == 0 {
            bail!("adapter_timeout_secs must be > 0");
        }
        if self.http.attempts == 0 {
            bail!("http.attempts must be > 0");
        }
        if self.scheduler.enabled && self.scheduler.interval_secs == 0 {
            bail!("scheduler.interval_secs must be > 0");
        }
        for feed in &self.feeds {
            if feed.name.trim().is_empty() {
                bail!("feed with empty name");
            }
            if !(feed.url.starts_with("http://") || feed.url.starts_with("https://")) {
                bail!("feed {}: only http/https URLs are allowed", feed.name);
            }
        }
        Ok(())
    }

    pub fn adapter_timeout(&self) -> Duration {
        Duration::from_secs(self.adapter_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.http.attempts,
            Duration::from_millis(self.http.retry_delay_ms),
        )
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.output_dir.join(&self.artifact_file)
    }

    pub fn version_path(&self) -> PathBuf {
        self.output_dir.join(&self.version_file)
    }

    // Relative notice paths in a config file are relative to that file, not the CWD.
    fn resolve_relative_to(&mut self, base: Option<&Path>) {
        let Some(base) = base else { return };
        if let Some(p) = &self.notices_path {
            if p.is_relative() && !base.as_os_str().is_empty() {
                self.notices_path = Some(base.join(p));
            }
        }
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<AppConfig> {
    match hint_ext {
        "toml" => Ok(toml::from_str(s)?),
        "json" => Ok(serde_json::from_str(s)?),
        _ => {
            if let Ok(v) = toml::from_str(s) {
                return Ok(v);
            }
            serde_json::from_str(s).map_err(|_| anyhow!("unsupported config format"))
        }
    }
}
