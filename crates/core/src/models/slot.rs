use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

pub fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

pub fn time_from_minute(minute: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(minute / 60, minute % 60, 0)
}

/// The half-open range `[start, start + duration)` an appointment blocks on
/// its scheduled date, in the business's local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OccupiedInterval {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    pub duration_minutes: u32,
}

impl OccupiedInterval {
    pub fn new(start: NaiveTime, duration_minutes: u32) -> Self {
        Self {
            start,
            duration_minutes,
        }
    }

    pub fn start_minute(&self) -> u32 {
        minute_of_day(self.start)
    }

    pub fn end_minute(&self) -> u32 {
        self.start_minute().saturating_add(self.duration_minutes)
    }

    /// Half-open intersection: intervals that only touch do not overlap.
    pub fn overlaps(&self, other: &OccupiedInterval) -> bool {
        self.start_minute() < other.end_minute() && other.start_minute() < self.end_minute()
    }
}

impl fmt::Display for OccupiedInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = self.end_minute();
        write!(
            f,
            "{}-{:02}:{:02}",
            self.start.format("%H:%M"),
            end / 60,
            end % 60
        )
    }
}

/// Serde adapter for `HH:MM` wall-clock times. Seconds are accepted on input.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(D::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
        NaiveTime::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
    }

    pub fn format(time: NaiveTime) -> String {
        time.format(FORMAT).to_string()
    }
}
