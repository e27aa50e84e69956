//! Bounded retries with a fallback value, plus the consumer-side artifact fetch built on it.
//!
//! Adapters use [`retry`] for their HTTP GETs. Front-end style consumers use
//! [`fetch_payload`]: cache-busted GET, one retry after a short pause, then the caller's
//! last-known-good payload.

use std::future::Future;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::model::OutagesPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total tries, including the first. Never less than 1.
    pub attempts: u32,
    /// Pause between tries.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    /// One retry after one second.
    fn default() -> Self {
        Self::new(2, Duration::from_secs(1))
    }
}

/// Run `op` until it succeeds or the policy's attempts are spent; returns the last error.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> std::result::Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
{
    let attempts = policy.attempts.max(1);
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match op(attempt).await {
            Ok(v) => return Ok(v),
            Err(e) if attempt < attempts => {
                tracing::debug!(attempt, error = %e, "attempt failed, retrying");
                tokio::time::sleep(policy.delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Like [`retry`], but exhausting the attempts yields `fallback` instead of an error.
pub async fn retry_with_fallback<T, E, F, Fut>(policy: &RetryPolicy, fallback: T, op: F) -> T
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
{
    match retry(policy, op).await {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, attempts = policy.attempts, "giving up, using fallback");
            fallback
        }
    }
}

/// Where a fetched payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadOrigin {
    Live,
    Fallback,
}

/// Append a cache-busting query parameter.
pub fn cache_busted(url: &str, token: i64) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}t={token}")
}

async fn get_payload(client: &reqwest::Client, url: &str) -> Result<OutagesPayload> {
    let busted = cache_busted(url, chrono::Utc::now().timestamp_millis());
    let resp = client
        .get(&busted)
        .header(reqwest::header::CACHE_CONTROL, "no-cache")
        .send()
        .await
        .with_context(|| format!("GET {url}"))?;
    let status = resp.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        bail!("artifact not published yet (404)");
    }
    if !status.is_success() {
        bail!("artifact fetch returned {status}");
    }
    resp.json::<OutagesPayload>()
        .await
        .context("decoding outages payload")
}

/// Fetch the published artifact the way the front end does. Any failure (including 404)
/// is retried per `policy`, then answered with `fallback`.
pub async fn fetch_payload(
    client: &reqwest::Client,
    url: &str,
    policy: &RetryPolicy,
    fallback: OutagesPayload,
) -> (OutagesPayload, PayloadOrigin) {
    retry_with_fallback(policy, (fallback, PayloadOrigin::Fallback), |_| async move {
        get_payload(client, url)
            .await
            .map(|p| (p, PayloadOrigin::Live))
    })
    .await
}
