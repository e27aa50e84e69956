// tests/aggregate.rs
use chrono::{DateTime, FixedOffset};
use naija_grid_watch::aggregate::aggregate;
use naija_grid_watch::{OutageEvent, Source, Status};

fn t(s: &str) -> DateTime<FixedOffset> {
    s.parse().expect("rfc3339")
}

fn event(id: &str, source: Source, published: &str) -> OutageEvent {
    OutageEvent {
        id: id.to_string(),
        source,
        source_name: source.display_name().to_string(),
        title: format!("Outage report {id}"),
        summary: String::new(),
        published_at: t(published),
        status: Status::Unplanned,
        planned_window: None,
        affected_areas: vec!["Yaba".to_string()],
        verified_by: source.verified_by(),
        official_url: None,
        confidence: 0.7,
    }
}

fn sample() -> Vec<OutageEvent> {
    vec![
        event("a", Source::Ekedc, "2025-03-01T08:00:00+01:00"),
        event("b", Source::Tcn, "2025-03-02T08:00:00+01:00"),
        event("a", Source::Ekedc, "2025-03-05T08:00:00+01:00"),
        event("c", Source::Media, "2025-03-02T08:00:00+01:00"),
        event("d", Source::Aedc, "2025-02-27T23:59:00+01:00"),
    ]
}

#[test]
fn aggregation_is_idempotent() {
    let now = t("2025-03-06T12:00:00+01:00");
    let once = aggregate(sample(), now);
    let twice = aggregate(once.payload.events.clone(), now);
    assert_eq!(once.payload, twice.payload);
    assert_eq!(once.per_source, twice.per_source);
    assert_eq!(twice.duplicates, 0);
}

#[test]
fn dedup_keeps_first_and_sorts_newest_first() {
    let agg = aggregate(sample(), t("2025-03-06T12:00:00+01:00"));
    let ids: Vec<&str> = agg.payload.events.iter().map(|e| e.id.as_str()).collect();
    // b and c share a timestamp and keep input order
    assert_eq!(ids, vec!["b", "c", "a", "d"]);
    let a = agg.payload.events.iter().find(|e| e.id == "a").unwrap();
    assert_eq!(a.published_at, t("2025-03-01T08:00:00+01:00"));
    assert_eq!(agg.duplicates, 1);
    assert_eq!(agg.payload.last_source_update, Some(t("2025-03-02T08:00:00+01:00")));
}

#[test]
fn per_source_lists_every_source() {
    let agg = aggregate(sample(), t("2025-03-06T12:00:00+01:00"));
    for s in Source::ALL {
        assert!(agg.per_source.contains_key(&s), "missing {s}");
    }
    assert_eq!(agg.per_source[&Source::Ekedc], 1);
    assert_eq!(agg.per_source[&Source::Kaedco], 0);
    assert_eq!(agg.per_source.values().sum::<usize>(), 4);
}

#[test]
fn empty_run_still_has_a_payload() {
    let now = t("2025-03-06T12:00:00+01:00");
    let agg = aggregate(Vec::new(), now);
    let v = serde_json::to_value(&agg.payload).unwrap();
    assert_eq!(v["events"], serde_json::json!([]));
    assert!(v["lastSourceUpdate"].is_null());
    assert_eq!(agg.payload.generated_at, now);
}
