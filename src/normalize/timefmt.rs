//! Human-readable rendering of backend epoch timestamps.
//!
//! The MEO service emits ISO-8601 strings, usually without an offset.
//! They are shown in the viewer's zone using the en-US locale layout,
//! e.g. `1/1/2024, 12:00:00 AM`.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use std::fmt::Display;

const DISPLAY_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Zone timestamps are rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    /// The host's local zone.
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl DisplayZone {
    pub fn utc() -> Self {
        DisplayZone::Fixed(Utc.fix())
    }

    /// `None` when the offset is out of range (more than a day).
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(DisplayZone::Fixed)
    }

    /// Render `raw` for display. Strings that are not recognizable
    /// timestamps come back unchanged.
    pub fn format(&self, raw: &str) -> String {
        let trimmed = raw.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return self.render(dt);
        }

        // No offset: wall-clock time in the display zone already.
        for fmt in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
                return naive.format(DISPLAY_FORMAT).to_string();
            }
        }

        // Bare dates are midnight UTC.
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                return self.render(Utc.from_utc_datetime(&midnight));
            }
        }

        raw.to_string()
    }

    fn render<Tz: TimeZone>(&self, dt: DateTime<Tz>) -> String {
        match self {
            DisplayZone::Local => display(dt.with_timezone(&Local)),
            DisplayZone::Fixed(offset) => display(dt.with_timezone(offset)),
        }
    }
}

fn display<Tz: TimeZone>(dt: DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    dt.format(DISPLAY_FORMAT).to_string()
}
