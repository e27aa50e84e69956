// src/ingest/providers/rss.rs
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::fetch::{retry, RetryPolicy};
use crate::ingest::fields::default_confidence;
use crate::ingest::types::{Candidate, FeedItem, SourceProvider};
use crate::model::Source;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    guid: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

/// RSS 2.0 adapter for any TCN/DISCO/media feed. Items keep their raw `pubDate`; the
/// boundary conversion decides whether it is usable.
pub struct RssProvider {
    name: String,
    source: Source,
    confidence: f64,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        url: String,
        client: reqwest::Client,
        retry: RetryPolicy,
    },
}

impl RssProvider {
    pub fn from_fixture(name: &str, source: Source, xml: &str) -> Self {
        Self {
            name: name.to_string(),
            source,
            confidence: default_confidence(source),
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    pub fn from_url(
        name: &str,
        source: Source,
        url: &str,
        client: reqwest::Client,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            name: name.to_string(),
            source,
            confidence: default_confidence(source),
            mode: Mode::Http {
                url: url.to_string(),
                client,
                retry,
            },
        }
    }

    /// Override the per-feed reliability (defaults from the source kind).
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// `base` is the feed URL; relative `<link>`s are resolved against it.
    fn parse_items_from_str(&self, s: &str, base: Option<&str>) -> Result<Vec<Candidate>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss =
            from_str(&xml_clean).with_context(|| format!("parsing {} rss xml", self.name))?;

        let out: Vec<Candidate> = rss
            .channel
            .item
            .into_iter()
            .map(|it| {
                Candidate::Feed(FeedItem {
                    source: self.source,
                    title: it.title.unwrap_or_default(),
                    description: it.description.unwrap_or_default(),
                    link: it
                        .link
                        .map(|l| l.trim().to_string())
                        .filter(|l| !l.is_empty())
                        .map(|l| resolve_link(base, l)),
                    guid: it.guid.map(|g| g.trim().to_string()).filter(|g| !g.is_empty()),
                    pub_date: it.pub_date,
                    confidence: self.confidence,
                })
            })
            .collect();

        histogram!("ingest_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        tracing::debug!(target: "ingest", provider = %self.name, items = out.len(), "rss parsed");
        Ok(out)
    }
}

async fn get_text(client: &reqwest::Client, url: &str) -> Result<String> {
    let resp = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("GET {url}"))?;
    let status = resp.status();
    if !status.is_success() {
        bail!("GET {url} returned {status}");
    }
    resp.text().await.context("reading rss body")
}

#[async_trait]
impl SourceProvider for RssProvider {
    async fn fetch_latest(&self) -> Result<Vec<Candidate>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items_from_str(s, None),
            Mode::Http { url, client, retry: policy } => {
                let body = retry(policy, |_| get_text(client, url)).await?;
                self.parse_items_from_str(&body, Some(url.as_str()))
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn resolve_link(base: Option<&str>, link: String) -> String {
    if reqwest::Url::parse(&link).is_ok() {
        return link;
    }
    base.and_then(|b| reqwest::Url::parse(b).ok())
        .and_then(|b| b.join(&link).ok())
        .map(|u| u.to_string())
        .unwrap_or(link)
}

// quick-xml only knows the five XML entities; feeds copy HTML ones in verbatim.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&naira;", "N")
}
