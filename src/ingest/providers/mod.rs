// src/ingest/providers/mod.rs
pub mod notices;
pub mod rss;

use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::AppConfig;
use crate::ingest::types::SourceProvider;

pub use notices::NoticesProvider;
pub use rss::RssProvider;

/// Build the adapter list from config: feeds in file order, then the curated notices file.
pub fn from_config(cfg: &AppConfig) -> Result<Vec<Box<dyn SourceProvider>>> {
    let mut providers: Vec<Box<dyn SourceProvider>> = Vec::new();

    if !cfg.feeds.is_empty() {
        let client = reqwest::Client::builder()
            .user_agent(cfg.http.user_agent.clone())
            .timeout(Duration::from_secs(cfg.http.request_timeout_secs))
            .build()
            .context("building http client")?;
        let policy = cfg.retry_policy();
        for feed in &cfg.feeds {
            let mut p = RssProvider::from_url(
                &feed.name,
                feed.source,
                &feed.url,
                client.clone(),
                policy,
            );
            if let Some(c) = feed.confidence {
                p = p.with_confidence(c);
            }
            providers.push(Box::new(p));
        }
    }

    if let Some(path) = &cfg.notices_path {
        providers.push(Box::new(NoticesProvider::from_path(path.clone())));
    }

    tracing::info!(target: "ingest", count = providers.len(), "providers configured");
    Ok(providers)
}
