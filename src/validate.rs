// src/validate.rs
//! Pre-publish schema check over the serialized payload.
//!
//! Works on the JSON value the front end will actually read, not on the Rust types, so a
//! serializer change that breaks the wire format is caught here. All violations are
//! collected; the caller decides to halt.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};

use crate::model::{OutagesPayload, Source, Status, VerifiedBy};
use crate::temporal::LAGOS;

/// One schema violation: JSON path of the offending field and what is wrong with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub reason: String,
}

impl Violation {
    fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

pub fn validate_payload(payload: &OutagesPayload) -> Result<(), Vec<Violation>> {
    match serde_json::to_value(payload) {
        Ok(v) => validate_value(&v),
        Err(e) => Err(vec![Violation::new("$", format!("not serializable: {e}"))]),
    }
}

pub fn validate_value(root: &Value) -> Result<(), Vec<Violation>> {
    let mut out = Vec::new();
    let Some(obj) = root.as_object() else {
        return Err(vec![Violation::new("$", "expected object")]);
    };

    date_time(obj, "$", "generatedAt", true, &mut out);
    let last = date_time(obj, "$", "lastSourceUpdate", false, &mut out);

    match obj.get("events") {
        Some(Value::Array(events)) => {
            let mut ids: HashSet<&str> = HashSet::with_capacity(events.len());
            for (i, ev) in events.iter().enumerate() {
                event(ev, &format!("$.events[{i}]"), &mut ids, &mut out);
            }
            if events.is_empty() && last.is_some() {
                out.push(Violation::new(
                    "$.lastSourceUpdate",
                    "must be null when there are no events",
                ));
            }
            if !events.is_empty() && obj.get("lastSourceUpdate").is_some_and(Value::is_null) {
                out.push(Violation::new(
                    "$.lastSourceUpdate",
                    "must be set when there are events",
                ));
            }
        }
        Some(_) => out.push(Violation::new("$.events", "expected array")),
        None => out.push(Violation::new("$.events", "missing")),
    }

    if out.is_empty() {
        Ok(())
    } else {
        Err(out)
    }
}

fn event<'a>(v: &'a Value, path: &str, ids: &mut HashSet<&'a str>, out: &mut Vec<Violation>) {
    let Some(obj) = v.as_object() else {
        out.push(Violation::new(path, "expected object"));
        return;
    };

    if let Some(id) = non_empty_str(obj, path, "id", out) {
        if !ids.insert(id) {
            out.push(Violation::new(format!("{path}.id"), format!("duplicate id {id:?}")));
        }
    }
    if let Some(code) = non_empty_str(obj, path, "source", out) {
        if Source::from_code(code).map(Source::code) != Some(code) {
            out.push(Violation::new(
                format!("{path}.source"),
                format!("unknown source {code:?}"),
            ));
        }
    }
    non_empty_str(obj, path, "sourceName", out);
    non_empty_str(obj, path, "title", out);
    string(obj, path, "summary", out);
    date_time(obj, path, "publishedAt", true, out);

    let status = one_of(obj, path, "status", &Status::CODES, out);
    one_of(obj, path, "verifiedBy", &VerifiedBy::CODES, out);

    match obj.get("affectedAreas") {
        Some(Value::Array(areas)) => {
            for (i, a) in areas.iter().enumerate() {
                if !a.is_string() {
                    out.push(Violation::new(
                        format!("{path}.affectedAreas[{i}]"),
                        "expected string",
                    ));
                }
            }
        }
        Some(_) => out.push(Violation::new(format!("{path}.affectedAreas"), "expected array")),
        None => out.push(Violation::new(format!("{path}.affectedAreas"), "missing")),
    }

    match obj.get("officialUrl") {
        None | Some(Value::Null) => {}
        Some(Value::String(u)) if is_http_url(u) => {}
        Some(_) => out.push(Violation::new(
            format!("{path}.officialUrl"),
            "expected null or an http(s) URL",
        )),
    }

    match obj.get("confidence").and_then(Value::as_f64) {
        Some(c) if (0.0..=1.0).contains(&c) => {}
        Some(c) => out.push(Violation::new(
            format!("{path}.confidence"),
            format!("{c} outside [0,1]"),
        )),
        None => out.push(Violation::new(format!("{path}.confidence"), "expected number")),
    }

    match obj.get("plannedWindow") {
        None | Some(Value::Null) => {}
        Some(w) => {
            if status != Some("PLANNED") {
                out.push(Violation::new(
                    format!("{path}.plannedWindow"),
                    "only allowed on PLANNED events",
                ));
            }
            window(w, &format!("{path}.plannedWindow"), out);
        }
    }
}

fn window(v: &Value, path: &str, out: &mut Vec<Violation>) {
    let Some(obj) = v.as_object() else {
        out.push(Violation::new(path, "expected object"));
        return;
    };
    let start = date_time(obj, path, "start", true, out);
    let end = date_time(obj, path, "end", false, out);
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            out.push(Violation::new(format!("{path}.end"), "ends before it starts"));
        }
    }
    match obj.get("timezone").and_then(Value::as_str) {
        Some(tz) if tz == LAGOS.name() => {}
        Some(tz) => out.push(Violation::new(
            format!("{path}.timezone"),
            format!("expected {:?}, got {tz:?}", LAGOS.name()),
        )),
        None => out.push(Violation::new(format!("{path}.timezone"), "missing")),
    }
}

fn string<'a>(
    obj: &'a Map<String, Value>,
    path: &str,
    key: &str,
    out: &mut Vec<Violation>,
) -> Option<&'a str> {
    match obj.get(key) {
        Some(Value::String(s)) => Some(s.as_str()),
        Some(_) => {
            out.push(Violation::new(format!("{path}.{key}"), "expected string"));
            None
        }
        None => {
            out.push(Violation::new(format!("{path}.{key}"), "missing"));
            None
        }
    }
}

fn non_empty_str<'a>(
    obj: &'a Map<String, Value>,
    path: &str,
    key: &str,
    out: &mut Vec<Violation>,
) -> Option<&'a str> {
    let s = string(obj, path, key, out)?;
    if s.trim().is_empty() {
        out.push(Violation::new(format!("{path}.{key}"), "empty"));
        return None;
    }
    Some(s)
}

fn one_of<'a>(
    obj: &'a Map<String, Value>,
    path: &str,
    key: &str,
    allowed: &[&str],
    out: &mut Vec<Violation>,
) -> Option<&'a str> {
    let s = string(obj, path, key, out)?;
    if allowed.contains(&s) {
        Some(s)
    } else {
        out.push(Violation::new(
            format!("{path}.{key}"),
            format!("{s:?} not one of {allowed:?}"),
        ));
        None
    }
}

/// RFC 3339 date-time. `required == false` also accepts absent or null.
fn date_time(
    obj: &Map<String, Value>,
    path: &str,
    key: &str,
    required: bool,
    out: &mut Vec<Violation>,
) -> Option<DateTime<FixedOffset>> {
    match obj.get(key) {
        None | Some(Value::Null) if !required => None,
        None => {
            out.push(Violation::new(format!("{path}.{key}"), "missing"));
            None
        }
        Some(Value::String(s)) => match DateTime::parse_from_rfc3339(s) {
            Ok(t) => Some(t),
            Err(_) => {
                out.push(Violation::new(
                    format!("{path}.{key}"),
                    format!("{s:?} is not an RFC 3339 date-time"),
                ));
                None
            }
        },
        Some(_) => {
            out.push(Violation::new(
                format!("{path}.{key}"),
                "expected date-time string",
            ));
            None
        }
    }
}

fn is_http_url(u: &str) -> bool {
    let lower = u.get(..8).unwrap_or(u).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
