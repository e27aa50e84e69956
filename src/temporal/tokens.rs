// src/temporal/tokens.rs
//! Token-level parsing shared by the schedule strategies: time-of-day, day/month/year,
//! and the regex fragments the strategies assemble their grammars from.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Wall-clock time without a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl TimeOfDay {
    pub const fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }
}

/// Assumed start of a notice that names a day but no hours.
pub const WORKDAY_START: TimeOfDay = TimeOfDay::new(9, 0);
/// Assumed end of a notice that names a day but no hours.
pub const WORKDAY_END: TimeOfDay = TimeOfDay::new(17, 0);

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

// --- regex fragments; `{tag}` is replaced so one grammar can hold several dates/times ---

/// `D Mon Y` with numeric or named month. Separators: `/ . -`, spaces, optional comma.
const DATE_TMPL: &str = r"\b(?P<{tag}_d>\d{1,2})(?:st|nd|rd|th)?(?:\s*[/.\-]\s*|,?\s+)(?P<{tag}_m>\d{1,2}|[a-z]{3,9})\.?(?:\s*[/.\-]\s*|,?\s+)(?P<{tag}_y>\d{4}|\d{2})\b";

/// `H`, `H:MM`, optional `am`/`pm` (dots and inner whitespace tolerated).
const TIME_TMPL: &str = r"\b(?P<{tag}>\d{1,2}(?::\d{2})?(?:\s*[ap]\.?m\b\.?|\b))";

/// Range connective between two dates or times.
pub const RANGE_SEP: &str = r"\s*(?:-|–|—|\bto\b|\btill\b|\buntil\b|\bthrough\b)\s*";

/// Glue between a date and the time that follows it.
pub const DATE_TIME_GLUE: &str = r"(?:\s*,\s*|\s+)(?:at\s+)?";

pub fn date_fragment(tag: &str) -> String {
    DATE_TMPL.replace("{tag}", tag)
}

pub fn time_fragment(tag: &str) -> String {
    TIME_TMPL.replace("{tag}", tag)
}

static TIME_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})(?::(\d{2}))?(am|pm)?$").expect("time token regex"));

/// Parse a time-of-day token such as `9`, `09:30`, `5pm`, `12 a.m.`.
///
/// A token that cannot be read as a clock time falls back to 09:00 instead of failing.
pub fn parse_time_of_day(token: &str) -> TimeOfDay {
    try_parse_time_of_day(token).unwrap_or(WORKDAY_START)
}

/// Strict form of [`parse_time_of_day`]: `None` for anything that is not a clock time.
pub fn try_parse_time_of_day(token: &str) -> Option<TimeOfDay> {
    let compact: String = token
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .collect::<String>()
        .to_ascii_lowercase();
    let caps = TIME_TOKEN.captures(&compact)?;

    let mut hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    if minute > 59 {
        return None;
    }

    match caps.get(3).map(|m| m.as_str()) {
        Some(meridiem) => {
            if hour == 0 || hour > 12 {
                return None;
            }
            if meridiem == "pm" && hour != 12 {
                hour += 12;
            } else if meridiem == "am" && hour == 12 {
                hour = 0;
            }
        }
        None if hour > 23 => return None,
        None => {}
    }

    Some(TimeOfDay::new(hour, minute))
}

/// Month number from `3`, `03`, `Mar`, `march`, `MARCH`. Names match on their first three letters.
pub fn parse_month(token: &str) -> Option<u32> {
    let t = token.trim().trim_end_matches('.');
    if t.chars().all(|c| c.is_ascii_digit()) {
        let n: u32 = t.parse().ok()?;
        return (1..=12).contains(&n).then_some(n);
    }
    let prefix: String = t.chars().take(3).collect::<String>().to_ascii_lowercase();
    if prefix.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| *m == prefix)
        .map(|i| i as u32 + 1)
}

/// Two-digit years are read as `20YY`.
pub fn parse_year(token: &str) -> Option<i32> {
    let y: i32 = token.trim().parse().ok()?;
    match token.trim().len() {
        2 => Some(2000 + y),
        4 => Some(y),
        _ => None,
    }
}

/// Calendar date from raw day/month/year tokens. `None` for unknown months or impossible
/// dates such as 31 April.
pub fn parse_date(day: &str, month: &str, year: &str) -> Option<NaiveDate> {
    let d: u32 = day.trim().parse().ok()?;
    let m = parse_month(month)?;
    let y = parse_year(year)?;
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Pull the date named `tag` out of a capture set built with [`date_fragment`].
pub fn captured_date(caps: &regex::Captures<'_>, tag: &str) -> Option<NaiveDate> {
    let d = caps.name(&format!("{tag}_d"))?;
    let m = caps.name(&format!("{tag}_m"))?;
    let y = caps.name(&format!("{tag}_y"))?;
    parse_date(d.as_str(), m.as_str(), y.as_str())
}

/// Time named `tag`, if that group participated in the match.
pub fn captured_time(caps: &regex::Captures<'_>, tag: &str) -> Option<TimeOfDay> {
    caps.name(tag).map(|m| parse_time_of_day(m.as_str()))
}
