// src/temporal/strategies.rs
//! Independent schedule grammars. Each is a pure `text -> Option<PlannedWindow>` function;
//! the cascade in `temporal::normalize_schedule` decides their priority.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use super::tokens::{
    captured_date, captured_time, date_fragment, time_fragment, try_parse_time_of_day,
    TimeOfDay, DATE_TIME_GLUE, RANGE_SEP, WORKDAY_END, WORKDAY_START,
};
use super::zone::LAGOS;
use crate::model::PlannedWindow;

static DATE_RANGE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?i){d1}(?:{glue}{t1})?(?P<sep>{sep})(?:{d2}(?:{glue}{t2})?|{t3})?",
        d1 = date_fragment("d1"),
        t1 = time_fragment("t1"),
        d2 = date_fragment("d2"),
        t2 = time_fragment("t2"),
        t3 = time_fragment("t3"),
        glue = DATE_TIME_GLUE,
        sep = RANGE_SEP,
    );
    Regex::new(&pattern).expect("date range regex")
});

static TIMES_THEN_DATE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?i)(?:\b(?:from|between)\s+)?{t1}(?:{sep}|\s+and\s+){t2}\s*,?\s*(?:\bon\s+)?(?:[a-z]+day,?\s+)?{d1}",
        t1 = time_fragment("t1"),
        t2 = time_fragment("t2"),
        d1 = date_fragment("d1"),
        sep = RANGE_SEP,
    );
    Regex::new(&pattern).expect("times-on-date regex")
});

static DATE_THEN_TIMES: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?i){d1}\s*,?\s*\b(?:from|between)\s+{t1}(?:{sep}|\s+and\s+){t2}",
        d1 = date_fragment("d1"),
        t1 = time_fragment("t1"),
        t2 = time_fragment("t2"),
        sep = RANGE_SEP,
    );
    Regex::new(&pattern).expect("date-from-times regex")
});

static SINGLE_DATE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(r"(?i){}", date_fragment("d1"));
    Regex::new(&pattern).expect("single date regex")
});

static TIME_RANGE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?i){t1}(?:{sep}|\s+and\s+){t2}",
        t1 = time_fragment("t1"),
        t2 = time_fragment("t2"),
        sep = RANGE_SEP,
    );
    Regex::new(&pattern).expect("time range regex")
});

fn at(date: NaiveDate, t: TimeOfDay) -> Option<DateTime<FixedOffset>> {
    LAGOS.at(date, t.hour, t.minute)
}

fn window(start: DateTime<FixedOffset>, end: Option<DateTime<FixedOffset>>) -> PlannedWindow {
    PlannedWindow {
        start,
        end,
        timezone: LAGOS.name().to_string(),
    }
}

/// Two clock times on one day. An end earlier than the start runs past midnight.
fn same_day_window(date: NaiveDate, from: TimeOfDay, to: TimeOfDay) -> Option<PlannedWindow> {
    let start = at(date, from)?;
    let mut end = at(date, to)?;
    if end < start {
        end += Duration::days(1);
    }
    Some(window(start, Some(end)))
}

/// `15/03/2025 09:00 - 16/03/2025 17:00`, `15 Mar 2025 9am to 5pm`, `15-03-25 to 17-03-25`.
///
/// The end date falls back to the start date; a missing start time reads as 09:00, an end
/// date without a time as 17:00. With no end at all the window is open-ended, but only
/// after `until`/`till`: a dash or `to` followed by neither date nor time is not a range.
pub fn date_range(text: &str, _reference: Option<DateTime<Utc>>) -> Option<PlannedWindow> {
    let caps = DATE_RANGE.captures(text)?;
    let start_date = captured_date(&caps, "d1")?;
    let start_time = captured_time(&caps, "t1").unwrap_or(WORKDAY_START);
    let start = at(start_date, start_time)?;

    let end_date_present = caps.name("d2_d").is_some();
    let end = if end_date_present {
        let end_date = captured_date(&caps, "d2")?;
        let end_time = captured_time(&caps, "t2").unwrap_or(WORKDAY_END);
        let end = at(end_date, end_time)?;
        if end < start {
            return None;
        }
        Some(end)
    } else if let Some(end_time) = captured_time(&caps, "t3") {
        let mut end = at(start_date, end_time)?;
        if end < start {
            end += Duration::days(1);
        }
        Some(end)
    } else if open_ended(caps.name("sep").map_or("", |m| m.as_str())) {
        None
    } else {
        return None;
    };

    Some(window(start, end))
}

fn open_ended(sep: &str) -> bool {
    let sep = sep.trim().to_ascii_lowercase();
    sep == "until" || sep == "till"
}

/// `from 8am to 5pm on 10/04/2025`, also `Thursday 10 April 2025 from 8am to 5pm`.
pub fn times_on_date(text: &str, _reference: Option<DateTime<Utc>>) -> Option<PlannedWindow> {
    let caps = TIMES_THEN_DATE
        .captures(text)
        .or_else(|| DATE_THEN_TIMES.captures(text))?;
    let date = captured_date(&caps, "d1")?;
    let from = captured_time(&caps, "t1")?;
    let to = captured_time(&caps, "t2")?;
    same_day_window(date, from, to)
}

/// `12/05/2025` with no hours given: a 09:00–17:00 working day.
pub fn single_date(text: &str, _reference: Option<DateTime<Utc>>) -> Option<PlannedWindow> {
    let caps = SINGLE_DATE.captures(text)?;
    let date = captured_date(&caps, "d1")?;
    same_day_window(date, WORKDAY_START, WORKDAY_END)
}

/// `9am to 2pm` with no date: anchored on the reference instant's Lagos calendar day.
///
/// Bare numbers such as `1-3` are not clock times here: at least one side must carry
/// `am`/`pm` or minutes, neither side may sit inside a date like `31-04-2025`, and both
/// tokens must parse strictly.
pub fn time_range(text: &str, reference: Option<DateTime<Utc>>) -> Option<PlannedWindow> {
    let reference = reference?;
    TIME_RANGE.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        if glued_to_digits(text, whole.start(), whole.end()) {
            return None;
        }
        let t1 = caps.name("t1")?.as_str();
        let t2 = caps.name("t2")?.as_str();
        if !clock_like(t1) && !clock_like(t2) {
            return None;
        }
        let from = try_parse_time_of_day(t1)?;
        let to = try_parse_time_of_day(t2)?;
        same_day_window(LAGOS.civil_date(&reference), from, to)
    })
}

fn clock_like(token: &str) -> bool {
    token.contains(':') || token.chars().any(|c| c.is_ascii_alphabetic())
}

/// True when the match continues a numeric run such as a date (`12/05`, `31-04-2025`).
fn glued_to_digits(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    if matches!(before, Some('/' | '.' | '-' | ':')) {
        return true;
    }
    let mut after = text[end..].chars();
    match after.next() {
        Some('/') => true,
        Some('.' | '-') => after.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rfc(w: &Option<DateTime<FixedOffset>>) -> Option<String> {
        w.map(|t| t.to_rfc3339())
    }

    #[test]
    fn date_range_with_inline_times() {
        let w = date_range("15/03/2025 09:00 - 15/03/2025 17:00", None).unwrap();
        assert_eq!(w.start.to_rfc3339(), "2025-03-15T09:00:00+01:00");
        assert_eq!(rfc(&w.end).as_deref(), Some("2025-03-15T17:00:00+01:00"));
    }

    #[test]
    fn date_range_end_time_only_reuses_start_date() {
        let w = date_range("Sat 15 Mar 2025 10am to 4pm", None).unwrap();
        assert_eq!(w.start.to_rfc3339(), "2025-03-15T10:00:00+01:00");
        assert_eq!(rfc(&w.end).as_deref(), Some("2025-03-15T16:00:00+01:00"));
    }

    #[test]
    fn date_range_multi_day_without_times() {
        let w = date_range("15-03-25 to 17-03-25", None).unwrap();
        assert_eq!(w.start.to_rfc3339(), "2025-03-15T09:00:00+01:00");
        assert_eq!(rfc(&w.end).as_deref(), Some("2025-03-17T17:00:00+01:00"));
    }

    #[test]
    fn date_range_open_ended() {
        let w = date_range("15 March 2025 08:00 until", None).unwrap();
        assert_eq!(w.start.to_rfc3339(), "2025-03-15T08:00:00+01:00");
        assert!(w.end.is_none());
    }

    #[test]
    fn date_range_rejects_reversed_explicit_dates() {
        assert!(date_range("17/03/2025 - 15/03/2025", None).is_none());
    }

    #[test]
    fn date_range_unknown_month_fails_the_family() {
        assert!(date_range("15 Foo 2025 to 16 Foo 2025", None).is_none());
    }

    #[test]
    fn overnight_time_range_rolls_to_next_day() {
        let reference = "2025-06-01T06:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let w = time_range("10pm - 2am", Some(reference)).unwrap();
        assert_eq!(w.start.to_rfc3339(), "2025-06-01T22:00:00+01:00");
        assert_eq!(rfc(&w.end).as_deref(), Some("2025-06-02T02:00:00+01:00"));
    }

    #[test]
    fn time_range_ignores_invalid_dates_and_counts() {
        let reference = "2025-06-01T06:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert!(time_range("31-04-2025 maintenance", Some(reference)).is_none());
        assert!(time_range("Planned maintenance on feeders 1-3 in Ikeja", Some(reference)).is_none());
        assert!(time_range("25:00 - 26:00", Some(reference)).is_none());
    }

    #[test]
    fn time_range_accepts_one_marked_side() {
        let reference = "2025-06-01T06:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let w = time_range("outage 9 - 11am on feeder 3", Some(reference)).unwrap();
        assert_eq!(w.start.to_rfc3339(), "2025-06-01T09:00:00+01:00");
        assert_eq!(rfc(&w.end).as_deref(), Some("2025-06-01T11:00:00+01:00"));
    }

    #[test]
    fn trailing_dash_is_not_an_open_range() {
        assert!(date_range("Planned outage 12/05/2025 - Ikeja", None).is_none());
        assert!(date_range("Planned outage 12/05/2025 to restore the line", None).is_none());
    }

    #[test]
    fn time_range_needs_reference() {
        assert!(time_range("9am to 2pm", None).is_none());
    }

    #[test]
    fn date_then_times_ordering() {
        let w = times_on_date("Thursday 10 April 2025 from 8am to 5pm", None).unwrap();
        assert_eq!(w.start.to_rfc3339(), "2025-04-10T08:00:00+01:00");
        assert_eq!(rfc(&w.end).as_deref(), Some("2025-04-10T17:00:00+01:00"));
    }

    #[test]
    fn between_and_phrasing() {
        let w = times_on_date("between 10:00 and 14:30 on 02/07/2025", None).unwrap();
        assert_eq!(w.start.to_rfc3339(), "2025-07-02T10:00:00+01:00");
        assert_eq!(rfc(&w.end).as_deref(), Some("2025-07-02T14:30:00+01:00"));
    }
}
