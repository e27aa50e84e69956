// src/ingest/types.rs
use anyhow::Result;
use chrono::Utc;
use serde::Deserialize;

use crate::ingest::fields::{
    classify_status, extract_areas, official_url, parse_published, sanitize_confidence,
    stable_id,
};
use crate::ingest::normalize_text;
use crate::model::{OutageEvent, Source, Status};
use crate::temporal::normalize_schedule;

const TITLE_MAX_CHARS: usize = 300;
const SUMMARY_MAX_CHARS: usize = 1500;

/// One `<item>` lifted from an RSS feed, still in source form.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub source: Source,
    pub title: String,
    pub description: String,
    pub link: Option<String>,
    pub guid: Option<String>,
    /// Raw `pubDate`, normally RFC 2822.
    pub pub_date: Option<String>,
    pub confidence: f64,
}

/// Structured announcement (curated file or a page scraper that already split fields).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeItem {
    #[serde(default)]
    pub id: Option<String>,
    pub source: Source,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    /// RFC 3339, RFC 2822, or `D/M/Y [time]` in Lagos time.
    pub published: String,
    /// Free-text schedule, e.g. "from 8am to 5pm on 10/04/2025".
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub areas: Vec<String>,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Everything an adapter may hand to the pipeline. Nothing untyped crosses this boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate {
    Feed(FeedItem),
    Notice(NoticeItem),
}

/// Why a candidate was dropped at the boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    #[error("empty title")]
    EmptyTitle,
    #[error("missing published timestamp")]
    MissingPublished,
    #[error("unreadable published timestamp: {0}")]
    BadPublished(String),
}

impl Candidate {
    pub fn source(&self) -> Source {
        match self {
            Candidate::Feed(f) => f.source,
            Candidate::Notice(n) => n.source,
        }
    }

    /// Validate and convert into a publishable event, deriving whatever the source left out.
    pub fn into_event(self) -> Result<OutageEvent, Rejection> {
        match self {
            Candidate::Feed(item) => feed_into_event(item),
            Candidate::Notice(item) => notice_into_event(item),
        }
    }
}

fn feed_into_event(item: FeedItem) -> Result<OutageEvent, Rejection> {
    let title = normalize_text(&item.title, TITLE_MAX_CHARS);
    if title.is_empty() {
        return Err(Rejection::EmptyTitle);
    }
    let raw_pub = item.pub_date.as_deref().ok_or(Rejection::MissingPublished)?;
    let published_at =
        parse_published(raw_pub).ok_or_else(|| Rejection::BadPublished(raw_pub.to_string()))?;

    let summary = normalize_text(&item.description, SUMMARY_MAX_CHARS);
    let text = format!("{title}. {summary}");
    let status = classify_status(&text);
    let planned_window = match status {
        Status::Planned => normalize_schedule(&text, Some(published_at.with_timezone(&Utc))),
        _ => None,
    };

    let key = item
        .guid
        .as_deref()
        .or(item.link.as_deref())
        .unwrap_or(&title);
    Ok(OutageEvent {
        id: stable_id(item.source, key),
        source: item.source,
        source_name: item.source.display_name().to_string(),
        affected_areas: extract_areas(&text),
        title,
        summary,
        published_at,
        status,
        planned_window,
        verified_by: item.source.verified_by(),
        official_url: official_url(item.link.as_deref()),
        confidence: sanitize_confidence(Some(item.confidence), item.source),
    })
}

fn notice_into_event(item: NoticeItem) -> Result<OutageEvent, Rejection> {
    let title = normalize_text(&item.title, TITLE_MAX_CHARS);
    if title.is_empty() {
        return Err(Rejection::EmptyTitle);
    }
    if item.published.trim().is_empty() {
        return Err(Rejection::MissingPublished);
    }
    let published_at = parse_published(&item.published)
        .ok_or_else(|| Rejection::BadPublished(item.published.clone()))?;

    let summary = normalize_text(&item.summary, SUMMARY_MAX_CHARS);
    let text = format!("{title}. {summary}");
    let status = item.status.unwrap_or_else(|| classify_status(&text));
    let planned_window = match status {
        Status::Planned => {
            let schedule = item.schedule.as_deref().unwrap_or(&text);
            normalize_schedule(schedule, Some(published_at.with_timezone(&Utc)))
        }
        _ => None,
    };

    let mut areas: Vec<String> = item
        .areas
        .iter()
        .map(|a| normalize_text(a, 120))
        .filter(|a| !a.is_empty())
        .collect();
    if areas.is_empty() {
        areas = extract_areas(&text);
    }

    let id = match item.id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => stable_id(item.source, item.url.as_deref().unwrap_or(&title)),
    };

    Ok(OutageEvent {
        id,
        source: item.source,
        source_name: item.source.display_name().to_string(),
        title,
        summary,
        published_at,
        status,
        planned_window,
        affected_areas: areas,
        verified_by: item.source.verified_by(),
        official_url: official_url(item.url.as_deref()),
        confidence: sanitize_confidence(item.confidence, item.source),
    })
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<Candidate>>;
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice() -> NoticeItem {
        NoticeItem {
            id: None,
            source: Source::Ikedc,
            title: "Planned outage: Alausa feeder".into(),
            summary: "Maintenance on the 11kV line.".into(),
            published: "2025-04-08T10:00:00+01:00".into(),
            schedule: Some("from 8am to 5pm on 10/04/2025".into()),
            areas: vec![" Alausa ".into(), "".into(), "Agidingbi".into()],
            status: None,
            url: Some("https://www.ikejaelectric.com/notice/1".into()),
            confidence: Some(0.95),
        }
    }

    #[test]
    fn planned_notice_gets_window_and_clean_areas() {
        let ev = Candidate::Notice(notice()).into_event().unwrap();
        assert_eq!(ev.status, Status::Planned);
        let w = ev.planned_window.unwrap();
        assert_eq!(w.start.to_rfc3339(), "2025-04-10T08:00:00+01:00");
        assert_eq!(ev.affected_areas, vec!["Alausa", "Agidingbi"]);
        assert!(ev.id.starts_with("ikedc-"));
    }

    #[test]
    fn explicit_status_wins_and_suppresses_window() {
        let mut n = notice();
        n.status = Some(Status::Restored);
        let ev = Candidate::Notice(n).into_event().unwrap();
        assert_eq!(ev.status, Status::Restored);
        assert!(ev.planned_window.is_none());
    }

    #[test]
    fn bad_timestamp_is_rejected() {
        let mut n = notice();
        n.published = "last tuesday".into();
        assert!(matches!(
            Candidate::Notice(n).into_event(),
            Err(Rejection::BadPublished(_))
        ));
    }

    #[test]
    fn feed_without_pub_date_is_rejected() {
        let item = FeedItem {
            source: Source::Media,
            title: "Grid collapse hits Lagos".into(),
            description: String::new(),
            link: None,
            guid: None,
            pub_date: None,
            confidence: 0.6,
        };
        assert_eq!(
            Candidate::Feed(item).into_event(),
            Err(Rejection::MissingPublished)
        );
    }

    #[test]
    fn relative_link_is_dropped_not_fatal() {
        let item = FeedItem {
            source: Source::Media,
            title: "Grid collapse hits Lagos".into(),
            description: String::new(),
            link: Some("/news/1".into()),
            guid: None,
            pub_date: Some("Tue, 08 Apr 2025 09:00:00 +0000".into()),
            confidence: 0.6,
        };
        let ev = Candidate::Feed(item).into_event().unwrap();
        assert_eq!(ev.official_url, None);

        let mut n = notice();
        n.url = Some("ftp://files.ikejaelectric.com/notice.pdf".into());
        let ev = Candidate::Notice(n).into_event().unwrap();
        assert_eq!(ev.official_url, None);
    }
}
