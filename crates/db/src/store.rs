//! Postgres implementations of the scheduling ports.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use petcare_core::errors::{InvalidTransition, SchedulingError, SchedulingResult, SlotConflict};
use petcare_core::models::{
    appointment::{Appointment, AppointmentStatus, NewAppointment, StatusChange},
    business::{Business, Service},
    payment::Payment,
    pet::Pet,
    slot::OccupiedInterval,
};
use petcare_core::ports::{BookingLedger, BusinessCatalog, PaymentStore};
use uuid::Uuid;

use crate::repositories::{appointment, business, payment};
use crate::repositories::appointment::InsertOutcome;
use crate::DbPool;

pub const DEFAULT_RESERVATION_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Clone)]
pub struct PgBookingLedger {
    pool: DbPool,
    reservation_timeout: Duration,
}

impl PgBookingLedger {
    pub fn new(pool: DbPool, reservation_timeout: Duration) -> Self {
        Self {
            pool,
            reservation_timeout,
        }
    }

    async fn active_intervals(&self, business_id: Uuid, date: NaiveDate) -> eyre::Result<Vec<OccupiedInterval>> {
        appointment::get_active_intervals(&self.pool, business_id, date)
            .await?
            .into_iter()
            .map(|(start, duration)| -> eyre::Result<OccupiedInterval> {
                Ok(OccupiedInterval::new(start, u32::try_from(duration)?))
            })
            .collect()
    }
}

#[async_trait]
impl BookingLedger for PgBookingLedger {
    async fn find_active_appointments(
        &self,
        business_id: Uuid,
        date: NaiveDate,
    ) -> SchedulingResult<Vec<OccupiedInterval>> {
        Ok(self.active_intervals(business_id, date).await?)
    }

    async fn insert_appointment(&self, record: NewAppointment) -> SchedulingResult<Appointment> {
        match appointment::insert_appointment(&self.pool, &record, self.reservation_timeout).await? {
            InsertOutcome::Inserted(row) => Ok(Appointment::try_from(row)?),
            InsertOutcome::Overlaps => {
                let requested = record.occupied_interval();
                let blocking = self
                    .active_intervals(record.business_id, record.scheduled_date)
                    .await?
                    .into_iter()
                    .filter(|interval| interval.overlaps(&requested))
                    .collect();
                Err(SchedulingError::Conflict(SlotConflict {
                    business_id: record.business_id,
                    date: record.scheduled_date,
                    requested,
                    blocking,
                }))
            }
        }
    }

    async fn find_appointment(&self, id: Uuid) -> SchedulingResult<Option<Appointment>> {
        appointment::get_appointment_by_id(&self.pool, id)
            .await?
            .map(Appointment::try_from)
            .transpose()
            .map_err(SchedulingError::from)
    }

    async fn update_status(&self, change: StatusChange) -> SchedulingResult<Appointment> {
        let reason = change
            .reason
            .as_deref()
            .filter(|_| change.to == AppointmentStatus::Cancelled);

        let updated = appointment::update_status_if(
            &self.pool,
            change.appointment_id,
            change.from,
            change.to,
            reason,
            change.at,
        )
        .await?;

        match updated {
            Some(row) => Ok(Appointment::try_from(row)?),
            None => Err(stale_status(&change)),
        }
    }

    async fn find_pending_before(&self, date: NaiveDate) -> SchedulingResult<Vec<Appointment>> {
        appointment::get_pending_before(&self.pool, date)
            .await?
            .into_iter()
            .map(|row| Appointment::try_from(row).map_err(SchedulingError::from))
            .collect()
    }
}

pub(crate) fn stale_status(change: &StatusChange) -> SchedulingError {
    SchedulingError::InvalidTransition(InvalidTransition {
        appointment_id: change.appointment_id,
        from: change.from,
        to: change.to,
        actor: change.actor,
        reason: "status changed concurrently".to_string(),
    })
}

#[derive(Clone)]
pub struct PgBusinessCatalog {
    pool: DbPool,
}

impl PgBusinessCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BusinessCatalog for PgBusinessCatalog {
    async fn find_business(&self, id: Uuid) -> SchedulingResult<Option<Business>> {
        let Some(row) = business::get_business_by_id(&self.pool, id).await? else {
            return Ok(None);
        };
        let hours = business::get_operating_hours(&self.pool, id).await?;
        Ok(Some(row.into_domain(hours)?))
    }

    async fn find_service(
        &self,
        business_id: Uuid,
        service_id: Uuid,
    ) -> SchedulingResult<Option<Service>> {
        business::get_service(&self.pool, business_id, service_id)
            .await?
            .map(Service::try_from)
            .transpose()
            .map_err(SchedulingError::from)
    }

    async fn find_pet(&self, id: Uuid) -> SchedulingResult<Option<Pet>> {
        business::get_pet_by_id(&self.pool, id)
            .await?
            .map(Pet::try_from)
            .transpose()
            .map_err(SchedulingError::from)
    }
}

#[derive(Clone)]
pub struct PgPaymentStore {
    pool: DbPool,
}

impl PgPaymentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentStore for PgPaymentStore {
    async fn find_paid_missing_timestamp(&self) -> SchedulingResult<Vec<Payment>> {
        payment::get_paid_missing_timestamp(&self.pool)
            .await?
            .into_iter()
            .map(|row| Payment::try_from(row).map_err(SchedulingError::from))
            .collect()
    }

    async fn stamp_paid_at(&self, id: Uuid, paid_at: DateTime<Utc>) -> SchedulingResult<Payment> {
        let row = payment::stamp_paid_at(&self.pool, id, paid_at)
            .await?
            .ok_or_else(|| SchedulingError::NotFound(format!("Payment with ID {} not found", id)))?;
        Ok(Payment::try_from(row)?)
    }
}
