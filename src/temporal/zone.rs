// src/temporal/zone.rs
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, TimeZone, Utc};

/// A named civil timezone with a fixed UTC offset.
///
/// Every schedule and timestamp the pipeline emits is expressed in one of these,
/// never in the host's local zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilZone {
    name: &'static str,
    offset_secs: i32,
}

/// West Africa Time. No daylight saving, so the fixed offset is exact all year.
pub const LAGOS: CivilZone = CivilZone {
    name: "Africa/Lagos",
    offset_secs: 3600,
};

impl CivilZone {
    /// IANA identifier, as written into `plannedWindow.timezone`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.offset_secs).unwrap_or_else(|| Utc.fix())
    }

    /// Wall-clock `date hour:minute` in this zone. `None` for out-of-range clock values.
    pub fn at(&self, date: NaiveDate, hour: u32, minute: u32) -> Option<DateTime<FixedOffset>> {
        let naive = date.and_hms_opt(hour, minute, 0)?;
        self.offset().from_local_datetime(&naive).single()
    }

    /// Same instant, re-expressed with this zone's offset.
    pub fn localize<Tz: TimeZone>(&self, t: &DateTime<Tz>) -> DateTime<FixedOffset> {
        t.with_timezone(&self.offset())
    }

    /// Calendar day of `t` as seen by someone in this zone.
    pub fn civil_date<Tz: TimeZone>(&self, t: &DateTime<Tz>) -> NaiveDate {
        self.localize(t).date_naive()
    }
}
