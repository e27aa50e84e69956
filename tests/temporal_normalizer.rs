// tests/temporal_normalizer.rs
//
// Schedule text → PlannedWindow, through the public cascade.

use chrono::{DateTime, Utc};
use naija_grid_watch::temporal::normalize_schedule;
use naija_grid_watch::PlannedWindow;

fn utc(s: &str) -> DateTime<Utc> {
    s.parse().expect("utc instant")
}

fn span(w: &PlannedWindow) -> (String, Option<String>) {
    (w.start.to_rfc3339(), w.end.map(|e| e.to_rfc3339()))
}

fn expect(text: &str, reference: Option<DateTime<Utc>>, start: &str, end: &str) {
    let w = normalize_schedule(text, reference)
        .unwrap_or_else(|| panic!("no window for {text:?}"));
    assert_eq!(
        span(&w),
        (start.to_string(), Some(end.to_string())),
        "text: {text:?}"
    );
    assert_eq!(w.timezone, "Africa/Lagos");
}

#[test]
fn numeric_date_range_with_times() {
    expect(
        "15/03/2025 09:00 - 15/03/2025 17:00",
        None,
        "2025-03-15T09:00:00+01:00",
        "2025-03-15T17:00:00+01:00",
    );
}

#[test]
fn from_to_on_date() {
    expect(
        "from 8am to 5pm on 10/04/2025",
        None,
        "2025-04-10T08:00:00+01:00",
        "2025-04-10T17:00:00+01:00",
    );
}

#[test]
fn single_date_is_a_working_day() {
    expect(
        "12/05/2025",
        None,
        "2025-05-12T09:00:00+01:00",
        "2025-05-12T17:00:00+01:00",
    );
}

#[test]
fn time_only_anchors_on_reference_day() {
    expect(
        "9am to 2pm",
        Some(utc("2025-06-01T06:00:00Z")),
        "2025-06-01T09:00:00+01:00",
        "2025-06-01T14:00:00+01:00",
    );
}

#[test]
fn reference_day_is_the_lagos_day_not_the_utc_day() {
    // 23:30Z on 31 May is already 1 June in Lagos
    expect(
        "10am - 12pm",
        Some(utc("2025-05-31T23:30:00Z")),
        "2025-06-01T10:00:00+01:00",
        "2025-06-01T12:00:00+01:00",
    );
}

#[test]
fn vague_text_has_no_window() {
    assert!(normalize_schedule("sometime next week", None).is_none());
    assert!(normalize_schedule("sometime next week", Some(utc("2025-06-01T06:00:00Z"))).is_none());
    assert!(normalize_schedule("", None).is_none());
}

#[test]
fn month_names_and_two_digit_years() {
    expect(
        "15 Mar 2025 9am to 16 March 25 5pm",
        None,
        "2025-03-15T09:00:00+01:00",
        "2025-03-16T17:00:00+01:00",
    );
    expect(
        "Saturday, 3rd May 2025 from 10:00 to 14:00",
        None,
        "2025-05-03T10:00:00+01:00",
        "2025-05-03T14:00:00+01:00",
    );
}

#[test]
fn unknown_month_falls_through_to_later_grammar() {
    // "Foo" kills the range grammar; the bare times then anchor on the reference day
    expect(
        "15 Foo 2025, 9am to 1pm",
        Some(utc("2025-02-01T12:00:00Z")),
        "2025-02-01T09:00:00+01:00",
        "2025-02-01T13:00:00+01:00",
    );
}

#[test]
fn invalid_calendar_date_yields_nothing() {
    assert!(normalize_schedule("31/02/2025", None).is_none());
}

#[test]
fn date_digits_and_counts_are_not_clock_times() {
    let reference = Some(utc("2025-06-01T06:00:00Z"));
    assert!(normalize_schedule("31-04-2025 maintenance", reference).is_none());
    assert!(normalize_schedule("Planned maintenance on feeders 1-3 in Ikeja", reference).is_none());
}

#[test]
fn date_followed_by_a_dash_and_a_place_is_a_working_day() {
    expect(
        "Planned outage 12/05/2025 - Ikeja",
        None,
        "2025-05-12T09:00:00+01:00",
        "2025-05-12T17:00:00+01:00",
    );
}

#[test]
fn until_without_an_end_is_open_ended() {
    let w = normalize_schedule("from 15/03/2025 08:00 until further notice", None).unwrap();
    assert_eq!(w.start.to_rfc3339(), "2025-03-15T08:00:00+01:00");
    assert!(w.end.is_none());
}

#[test]
fn noon_and_midnight() {
    expect(
        "from 12am to 12pm on 01/07/2025",
        None,
        "2025-07-01T00:00:00+01:00",
        "2025-07-01T12:00:00+01:00",
    );
}

/// Each grammar, fed text rendered from a known window, reproduces that window.
#[test]
fn every_grammar_round_trips() {
    let reference = Some(utc("2025-08-20T05:00:00Z"));
    let cases = [
        ("20/08/2025 07:30 - 20/08/2025 18:15", "2025-08-20T07:30:00+01:00", "2025-08-20T18:15:00+01:00"),
        ("20 Aug 2025 07:30 to 20 Aug 2025 18:15", "2025-08-20T07:30:00+01:00", "2025-08-20T18:15:00+01:00"),
        ("from 7:30am to 6:15pm on 20/08/2025", "2025-08-20T07:30:00+01:00", "2025-08-20T18:15:00+01:00"),
        ("20/08/2025", "2025-08-20T09:00:00+01:00", "2025-08-20T17:00:00+01:00"),
        ("7:30am to 6:15pm", "2025-08-20T07:30:00+01:00", "2025-08-20T18:15:00+01:00"),
    ];
    for (text, start, end) in cases {
        expect(text, reference, start, end);
    }
}

#[test]
fn two_sided_windows_never_run_backwards() {
    let reference = Some(utc("2025-01-10T10:00:00Z"));
    let samples = [
        "15/03/2025 09:00 - 15/03/2025 17:00",
        "15/03/2025 22:00 - 02:00",
        "from 11pm to 3am on 04/01/2025",
        "10pm to 1am",
        "1 Jan 2025 - 3 Jan 2025",
        "between 9 and 11 on 5 June 2025",
        "17/03/2025 - 15/03/2025",
        "28/02/25",
    ];
    for text in samples {
        if let Some(w) = normalize_schedule(text, reference) {
            if let Some(end) = w.end {
                assert!(w.start <= end, "{text:?} gave {w:?}");
            }
            assert_eq!(w.timezone, "Africa/Lagos");
        }
    }
}
