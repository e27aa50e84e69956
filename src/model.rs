// src/model.rs
//! Published data model: `OutageEvent`, `OutagesPayload`, and the version marker.
//! Field names are camelCase on the wire because the front end reads them directly.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Origin of an event: the grid operator, one of the distribution companies, or media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Source {
    Tcn,
    Ikedc,
    Ekedc,
    Aedc,
    Kaedco,
    Jed,
    Phed,
    Ibedc,
    Media,
}

impl Source {
    /// Every known source, in the order run statistics list them.
    pub const ALL: [Source; 9] = [
        Source::Tcn,
        Source::Ikedc,
        Source::Ekedc,
        Source::Aedc,
        Source::Kaedco,
        Source::Jed,
        Source::Phed,
        Source::Ibedc,
        Source::Media,
    ];

    /// Wire code, e.g. `"IKEDC"`.
    pub fn code(self) -> &'static str {
        match self {
            Source::Tcn => "TCN",
            Source::Ikedc => "IKEDC",
            Source::Ekedc => "EKEDC",
            Source::Aedc => "AEDC",
            Source::Kaedco => "KAEDCO",
            Source::Jed => "JED",
            Source::Phed => "PHED",
            Source::Ibedc => "IBEDC",
            Source::Media => "MEDIA",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Source::Tcn => "Transmission Company of Nigeria",
            Source::Ikedc => "Ikeja Electric",
            Source::Ekedc => "Eko Electricity Distribution Company",
            Source::Aedc => "Abuja Electricity Distribution Company",
            Source::Kaedco => "Kaduna Electric",
            Source::Jed => "Jos Electricity Distribution",
            Source::Phed => "Port Harcourt Electricity Distribution",
            Source::Ibedc => "Ibadan Electricity Distribution Company",
            Source::Media => "News media",
        }
    }

    /// Case-insensitive lookup by wire code.
    pub fn from_code(code: &str) -> Option<Source> {
        let c = code.trim();
        Source::ALL
            .into_iter()
            .find(|s| s.code().eq_ignore_ascii_case(c))
    }

    /// Provenance implied by who published the notice.
    pub fn verified_by(self) -> VerifiedBy {
        match self {
            Source::Tcn => VerifiedBy::Tcn,
            Source::Media => VerifiedBy::Media,
            _ => VerifiedBy::Disco,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Planned,
    Unplanned,
    Restored,
}

impl Status {
    pub const CODES: [&'static str; 3] = ["PLANNED", "UNPLANNED", "RESTORED"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerifiedBy {
    Disco,
    Tcn,
    Media,
    Unknown,
}

impl VerifiedBy {
    pub const CODES: [&'static str; 4] = ["DISCO", "TCN", "MEDIA", "UNKNOWN"];
}

/// Scheduled outage window. `end` is absent for open-ended maintenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedWindow {
    pub start: DateTime<FixedOffset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<FixedOffset>>,
    pub timezone: String,
}

/// One reported grid or distribution incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutageEvent {
    pub id: String,
    pub source: Source,
    pub source_name: String,
    pub title: String,
    pub summary: String,
    pub published_at: DateTime<FixedOffset>,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_window: Option<PlannedWindow>,
    #[serde(default)]
    pub affected_areas: Vec<String>,
    pub verified_by: VerifiedBy,
    #[serde(default)]
    pub official_url: Option<String>,
    pub confidence: f64,
}

/// The publish artifact. Rebuilt from scratch on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutagesPayload {
    pub events: Vec<OutageEvent>,
    pub generated_at: DateTime<FixedOffset>,
    pub last_source_update: Option<DateTime<FixedOffset>>,
}

impl OutagesPayload {
    pub fn empty(generated_at: DateTime<FixedOffset>) -> Self {
        Self {
            events: Vec::new(),
            generated_at,
            last_source_update: None,
        }
    }
}

/// Sibling file the front end polls cheaply before fetching the full payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionMarker {
    pub updated_at: DateTime<FixedOffset>,
}
