// src/aggregate.rs
//! Merge adapter output into one payload: first-seen dedup by id, newest first,
//! per-source statistics.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, FixedOffset};
use metrics::counter;

use crate::model::{OutageEvent, OutagesPayload, Source};

/// Result of one aggregation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub payload: OutagesPayload,
    /// Surviving events per source. Every known source is present.
    pub per_source: BTreeMap<Source, usize>,
    pub duplicates: usize,
}

/// Pure apart from the dedup counter. Input order is adapter order; it decides both which
/// duplicate survives and how equal timestamps are ordered.
pub fn aggregate(events: Vec<OutageEvent>, generated_at: DateTime<FixedOffset>) -> Aggregate {
    let mut seen: HashSet<String> = HashSet::with_capacity(events.len());
    let mut kept: Vec<OutageEvent> = Vec::with_capacity(events.len());
    let mut duplicates = 0usize;

    for ev in events {
        if seen.insert(ev.id.clone()) {
            kept.push(ev);
        } else {
            duplicates += 1;
            tracing::debug!(target: "ingest", id = %ev.id, source = %ev.source, "duplicate dropped");
        }
    }
    if duplicates > 0 {
        counter!("ingest_dedup_total").increment(duplicates as u64);
    }

    // stable: ties keep input order
    kept.sort_by(|a, b| b.published_at.cmp(&a.published_at));

    let per_source = source_counts(&kept);
    let last_source_update = kept.first().map(|e| e.published_at);

    Aggregate {
        payload: OutagesPayload {
            events: kept,
            generated_at,
            last_source_update,
        },
        per_source,
        duplicates,
    }
}

pub fn source_counts(events: &[OutageEvent]) -> BTreeMap<Source, usize> {
    let mut counts: BTreeMap<Source, usize> = Source::ALL.iter().map(|s| (*s, 0)).collect();
    for ev in events {
        *counts.entry(ev.source).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Status, VerifiedBy};

    fn ev(id: &str, source: Source, published: &str) -> OutageEvent {
        OutageEvent {
            id: id.into(),
            source,
            source_name: source.display_name().into(),
            title: format!("event {id}"),
            summary: String::new(),
            published_at: published.parse().unwrap(),
            status: Status::Unplanned,
            planned_window: None,
            affected_areas: vec![],
            verified_by: VerifiedBy::Disco,
            official_url: None,
            confidence: 0.9,
        }
    }

    fn now() -> DateTime<FixedOffset> {
        "2025-05-01T12:00:00+01:00".parse().unwrap()
    }

    #[test]
    fn first_seen_wins_and_newest_first() {
        let mut a = ev("x", Source::Ikedc, "2025-05-01T08:00:00+01:00");
        a.title = "first".into();
        let mut b = ev("x", Source::Ikedc, "2025-05-01T11:00:00+01:00");
        b.title = "second".into();
        let c = ev("y", Source::Tcn, "2025-05-01T10:00:00+01:00");

        let agg = aggregate(vec![a, b, c], now());
        assert_eq!(agg.duplicates, 1);
        let ids: Vec<&str> = agg.payload.events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["y", "x"]);
        assert_eq!(agg.payload.events[1].title, "first");
        assert_eq!(
            agg.payload.last_source_update,
            Some("2025-05-01T10:00:00+01:00".parse().unwrap())
        );
    }

    #[test]
    fn ties_keep_adapter_order() {
        let t = "2025-05-01T08:00:00+01:00";
        let agg = aggregate(
            vec![ev("a", Source::Tcn, t), ev("b", Source::Media, t), ev("c", Source::Jed, t)],
            now(),
        );
        let ids: Vec<&str> = agg.payload.events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn every_source_is_counted() {
        let agg = aggregate(vec![ev("a", Source::Phed, "2025-05-01T08:00:00+01:00")], now());
        assert_eq!(agg.per_source.len(), Source::ALL.len());
        assert_eq!(agg.per_source[&Source::Phed], 1);
        assert_eq!(agg.per_source[&Source::Tcn], 0);
    }

    #[test]
    fn empty_input() {
        let agg = aggregate(vec![], now());
        assert!(agg.payload.events.is_empty());
        assert!(agg.payload.last_source_update.is_none());
        assert!(agg.per_source.values().all(|n| *n == 0));
    }
}
