//! # Temporal normalizer
//!
//! Turns loosely written schedule text from DISCO/TCN notices ("from 8am to 5pm on
//! 10/04/2025", "15 Mar 2025 09:00 - 17:00", ...) into a `PlannedWindow` anchored to the
//! Africa/Lagos civil zone.
//!
//! Grammars are independent strategies tried in priority order; the first one that yields
//! a window wins even if a later one would also match part of the text. Finding nothing is
//! an ordinary outcome, not an error.

pub mod strategies;
pub mod tokens;
pub mod zone;

use chrono::{DateTime, Utc};

use crate::model::PlannedWindow;

pub use zone::{CivilZone, LAGOS};

/// One grammar: raw text plus optional reference instant in, window out.
pub type Strategy = fn(&str, Option<DateTime<Utc>>) -> Option<PlannedWindow>;

/// Cascade order. Earlier entries are strictly preferred.
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("date_range", strategies::date_range),
    ("times_on_date", strategies::times_on_date),
    ("single_date", strategies::single_date),
    ("time_range", strategies::time_range),
];

/// Extract a planned window from `text`.
///
/// `reference` is the instant the notice was published; it only matters for text that
/// names hours but no date.
pub fn normalize_schedule(text: &str, reference: Option<DateTime<Utc>>) -> Option<PlannedWindow> {
    if text.trim().is_empty() {
        return None;
    }
    for (name, strategy) in STRATEGIES {
        if let Some(window) = strategy(text, reference) {
            tracing::debug!(target: "temporal", strategy = *name, start = %window.start, "schedule parsed");
            return Some(window);
        }
    }
    tracing::debug!(target: "temporal", len = text.len(), "no schedule window in text");
    None
}
