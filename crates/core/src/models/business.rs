use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{SchedulingError, SchedulingResult};
use crate::models::slot::{hhmm, minute_of_day, MINUTES_PER_DAY};

pub const DEFAULT_SLOT_INTERVAL_MINUTES: u32 = 30;

/// A tenant pet-care provider. Businesses are soft-disabled through `active`,
/// never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub id: Uuid,
    pub name: String,
    pub timezone: Tz,
    pub operating_hours: Vec<OperatingWindow>,
    pub slot_interval_minutes: u32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Business {
    /// Wall-clock time at the business.
    pub fn local_now(&self, now: DateTime<Utc>) -> NaiveDateTime {
        now.with_timezone(&self.timezone).naive_local()
    }

    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.local_now(now).date()
    }

    /// Operating windows that apply to `date`, ordered by opening time.
    pub fn windows_on(&self, date: NaiveDate) -> Vec<OperatingWindow> {
        let weekday = date.weekday();
        let mut windows: Vec<OperatingWindow> = self
            .operating_hours
            .iter()
            .filter(|window| window.weekday == weekday)
            .copied()
            .collect();
        windows.sort_by_key(|window| window.opens);
        windows
    }
}

/// One opening window on a weekday. A weekday may carry several windows,
/// e.g. around a lunch break. A `closes` of `00:00` means the window runs
/// until midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingWindow {
    pub weekday: Weekday,
    #[serde(with = "hhmm")]
    pub opens: NaiveTime,
    #[serde(with = "hhmm")]
    pub closes: NaiveTime,
}

impl OperatingWindow {
    pub fn new(weekday: Weekday, opens: NaiveTime, closes: NaiveTime) -> SchedulingResult<Self> {
        let closes_at_midnight = closes == NaiveTime::MIN;
        if !closes_at_midnight && opens >= closes {
            return Err(SchedulingError::Validation(format!(
                "Operating window on {} must open before it closes ({} >= {})",
                weekday,
                hhmm::format(opens),
                hhmm::format(closes)
            )));
        }
        Ok(Self {
            weekday,
            opens,
            closes,
        })
    }

    pub fn opening_minute(&self) -> u32 {
        minute_of_day(self.opens)
    }

    /// Closing time in minutes of the day, `1440` for a midnight close.
    pub fn closing_minute(&self) -> u32 {
        if self.closes == NaiveTime::MIN {
            MINUTES_PER_DAY
        } else {
            minute_of_day(self.closes)
        }
    }
}

/// Something a business offers. `duration_minutes` is the width of the slot
/// an appointment for this service occupies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub duration_minutes: u32,
    pub price_cents: i64,
    pub active: bool,
}

impl Service {
    pub fn validate(&self) -> SchedulingResult<()> {
        if self.duration_minutes == 0 {
            return Err(SchedulingError::Validation(format!(
                "Service {} must have a positive duration",
                self.id
            )));
        }
        if self.duration_minutes > MINUTES_PER_DAY {
            return Err(SchedulingError::Validation(format!(
                "Service {} cannot last longer than a day ({} minutes)",
                self.id, self.duration_minutes
            )));
        }
        Ok(())
    }
}
