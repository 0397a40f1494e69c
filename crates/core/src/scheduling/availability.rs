//! # Slot availability
//!
//! Turns a business's operating hours into bookable slot starts for one
//! service on one date:
//!
//! 1. Take the operating windows of the date's weekday.
//! 2. Walk each window from its opening time in steps of the business's slot
//!    interval; a start is a candidate while `start + duration <= closes`.
//!    A window closing at `00:00` runs until midnight.
//! 3. Drop candidates whose occupied interval overlaps an active appointment
//!    (half-open: touching intervals do not overlap).
//! 4. On the business-local today, drop candidates that already started.
//! 5. Sort and de-duplicate (windows may overlap).
//!
//! Everything in this module is pure; [`Scheduler::available_slots`] feeds it
//! from the ledger.

use chrono::{NaiveDate, NaiveTime, Timelike};
use uuid::Uuid;

use crate::errors::SchedulingResult;
use crate::models::availability::AvailabilityResponse;
use crate::models::business::{OperatingWindow, Service};
use crate::models::slot::{hhmm, minute_of_day, time_from_minute, OccupiedInterval};
use crate::scheduling::Scheduler;

/// Slot starts, in minutes of the day, that fit the operating windows.
pub fn candidate_starts(windows: &[OperatingWindow], interval_minutes: u32, duration_minutes: u32) -> Vec<u32> {
    if interval_minutes == 0 || duration_minutes == 0 {
        return Vec::new();
    }

    let mut starts = Vec::new();
    for window in windows {
        let closes = window.closing_minute();
        let mut cursor = window.opening_minute();
        while cursor
            .checked_add(duration_minutes)
            .is_some_and(|end| end <= closes)
        {
            starts.push(cursor);
            match cursor.checked_add(interval_minutes) {
                Some(next) => cursor = next,
                None => break,
            }
        }
    }
    starts.sort_unstable();
    starts.dedup();
    starts
}

/// Whether `start` is one of the slots the grid offers, ignoring bookings.
pub fn is_candidate(
    windows: &[OperatingWindow],
    interval_minutes: u32,
    duration_minutes: u32,
    start: NaiveTime,
) -> bool {
    if start.second() != 0 || start.nanosecond() != 0 {
        return false;
    }
    candidate_starts(windows, interval_minutes, duration_minutes)
        .binary_search(&minute_of_day(start))
        .is_ok()
}

/// Open slot starts for a service of `duration_minutes`.
///
/// `not_before` removes starts earlier than the given local time; pass the
/// current local time when `date` is today.
pub fn available_slots(
    windows: &[OperatingWindow],
    interval_minutes: u32,
    duration_minutes: u32,
    booked: &[OccupiedInterval],
    not_before: Option<NaiveTime>,
) -> Vec<NaiveTime> {
    candidate_starts(windows, interval_minutes, duration_minutes)
        .into_iter()
        .filter_map(time_from_minute)
        .filter(|start| not_before.is_none_or(|cutoff| *start >= cutoff))
        .filter(|start| {
            let candidate = OccupiedInterval::new(*start, duration_minutes);
            !booked.iter().any(|existing| existing.overlaps(&candidate))
        })
        .collect()
}

impl Scheduler {
    /// Bookable slot starts for `service_id` at `business_id` on `date`.
    ///
    /// # Errors
    ///
    /// * `NotFound` - unknown or inactive business or service
    /// * `InvalidDate` - `date` is before the business-local today
    pub async fn available_slots(
        &self,
        business_id: Uuid,
        service_id: Uuid,
        date: NaiveDate,
    ) -> SchedulingResult<Vec<NaiveTime>> {
        let (_, slots) = self.open_slots(business_id, service_id, date).await?;
        Ok(slots)
    }

    /// Same as [`Scheduler::available_slots`], shaped for API responses.
    pub async fn availability(
        &self,
        business_id: Uuid,
        service_id: Uuid,
        date: NaiveDate,
    ) -> SchedulingResult<AvailabilityResponse> {
        let (service, slots) = self.open_slots(business_id, service_id, date).await?;
        Ok(AvailabilityResponse {
            business_id,
            service_id,
            date,
            duration_minutes: service.duration_minutes,
            slots: slots.into_iter().map(hhmm::format).collect(),
        })
    }

    async fn open_slots(
        &self,
        business_id: Uuid,
        service_id: Uuid,
        date: NaiveDate,
    ) -> SchedulingResult<(Service, Vec<NaiveTime>)> {
        let now = self.now();
        let business = self.bookable_business(business_id).await?;
        let service = self.bookable_service(&business, service_id).await?;
        Self::ensure_not_past(&business, date, now)?;

        let local_now = business.local_now(now);
        let not_before = (date == local_now.date()).then(|| local_now.time());

        let booked = self.ledger.find_active_appointments(business.id, date).await?;
        let slots = available_slots(
            &business.windows_on(date),
            business.slot_interval_minutes,
            service.duration_minutes,
            &booked,
            not_before,
        );

        tracing::debug!(
            business_id = %business.id,
            service_id = %service.id,
            %date,
            booked = booked.len(),
            open = slots.len(),
            "computed availability"
        );
        Ok((service, slots))
    }
}
