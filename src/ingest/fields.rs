// src/ingest/fields.rs
//! Field derivation at the ingestion boundary: timestamps, status, areas, ids, confidence.

use chrono::{DateTime, FixedOffset};
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use time::{format_description::well_known::Rfc2822, OffsetDateTime};

use crate::model::{Source, Status, VerifiedBy};
use crate::temporal::tokens::{captured_date, captured_time, date_fragment, time_fragment};
use crate::temporal::{LAGOS, tokens::DATE_TIME_GLUE};

static RESTORED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(restored|restoration|power (?:is )?back|supply (?:has )?resumed|reconnected)\b",
    )
    .expect("restored regex")
});

static PLANNED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(planned|scheduled|maintenance|upgrade|installation|outage notice|will be (?:interrupted|switched off|shut down)|shut ?down)\b",
    )
    .expect("planned regex")
});

static AREAS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:affected areas?|areas? affected|affected communities|affected feeders?)\s*(?:include|includes|are|is)?\s*[:\-–]?\s*(?P<list>[^.;\n]+)",
    )
    .expect("areas regex")
});

static AREA_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*(?:,|/|\band\b|&)\s*").expect("area split regex"));

static LOCAL_STAMP: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?i)^\s*{}(?:{}{})?\s*$",
        date_fragment("d1"),
        DATE_TIME_GLUE,
        time_fragment("t1")
    );
    Regex::new(&pattern).expect("local stamp regex")
});

/// Read a source timestamp and express it in Lagos time.
///
/// Accepts RFC 2822 (RSS `pubDate`), RFC 3339, and `D/M/Y [time]` which is taken as Lagos
/// wall-clock time. Anything else is `None`.
pub fn parse_published(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc2822) {
        let utc = DateTime::from_timestamp(dt.unix_timestamp(), dt.nanosecond())?;
        return Some(LAGOS.localize(&utc));
    }
    // chrono also knows the obsolete zone names (EST, PDT, ...) some feeds still emit
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(LAGOS.localize(&dt));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(LAGOS.localize(&dt));
    }
    let caps = LOCAL_STAMP.captures(raw)?;
    let date = captured_date(&caps, "d1")?;
    let t = captured_time(&caps, "t1");
    let (h, m) = t.map(|t| (t.hour, t.minute)).unwrap_or((0, 0));
    LAGOS.at(date, h, m)
}

/// Lifecycle tag from notice wording. Restoration beats maintenance wording
/// ("supply restored after planned maintenance" is a restoration).
pub fn classify_status(text: &str) -> Status {
    if RESTORED.is_match(text) {
        Status::Restored
    } else if PLANNED.is_match(text) {
        Status::Planned
    } else {
        Status::Unplanned
    }
}

/// Place names listed after "Affected areas:" and similar lead-ins, in order, deduplicated.
pub fn extract_areas(text: &str) -> Vec<String> {
    let Some(caps) = AREAS.captures(text) else {
        return Vec::new();
    };
    let Some(list) = caps.name("list") else {
        return Vec::new();
    };
    let mut out: Vec<String> = Vec::new();
    for part in AREA_SPLIT.split(list.as_str()) {
        let name = part.trim().trim_matches(|c: char| c == '"' || c == '\'');
        if name.is_empty() || out.iter().any(|a| a.eq_ignore_ascii_case(name)) {
            continue;
        }
        out.push(name.to_string());
    }
    out
}

/// `<source>-<16 hex>` from SHA-256 over the source code and a per-item key (link or title).
pub fn stable_id(source: Source, key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.code().as_bytes());
    hasher.update(b"|");
    hasher.update(key.trim().as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(source.code().len() + 17);
    out.push_str(&source.code().to_ascii_lowercase());
    out.push('-');
    for b in digest.iter().take(8) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Default reliability when the adapter did not state one.
pub fn default_confidence(source: Source) -> f64 {
    match source.verified_by() {
        VerifiedBy::Tcn | VerifiedBy::Disco => 0.9,
        VerifiedBy::Media => 0.6,
        VerifiedBy::Unknown => 0.4,
    }
}

/// Clamp into [0,1]; non-finite or missing values fall back to the source default.
pub fn sanitize_confidence(raw: Option<f64>, source: Source) -> f64 {
    match raw {
        Some(c) if c.is_finite() => c.clamp(0.0, 1.0),
        _ => default_confidence(source),
    }
}

/// Keep a link only if it is an absolute http(s) URL. Anything else is dropped, not fatal.
pub fn official_url(raw: Option<&str>) -> Option<String> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match reqwest::Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(raw.to_string()),
        _ => {
            tracing::debug!(target: "ingest", link = raw, "dropping non-http link");
            None
        }
    }
}
