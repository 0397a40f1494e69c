//! Persistence seams of the scheduling core.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::errors::SchedulingResult;
use crate::models::{
    appointment::{Appointment, NewAppointment, StatusChange},
    business::{Business, Service},
    payment::Payment,
    pet::Pet,
    slot::OccupiedInterval,
};

/// The authoritative record of appointments.
///
/// `insert_appointment` must check for overlapping active appointments and
/// write the new one as a single indivisible step, returning
/// `SchedulingError::Conflict` when the interval is taken.
/// `update_status` must only apply when the stored status still equals
/// `change.from`, returning `SchedulingError::InvalidTransition` otherwise.
#[async_trait]
pub trait BookingLedger: Send + Sync {
    async fn find_active_appointments(
        &self,
        business_id: Uuid,
        date: NaiveDate,
    ) -> SchedulingResult<Vec<OccupiedInterval>>;

    async fn insert_appointment(&self, record: NewAppointment) -> SchedulingResult<Appointment>;

    async fn find_appointment(&self, id: Uuid) -> SchedulingResult<Option<Appointment>>;

    async fn update_status(&self, change: StatusChange) -> SchedulingResult<Appointment>;

    /// Pending, non-deleted appointments scheduled strictly before `date`.
    async fn find_pending_before(&self, date: NaiveDate) -> SchedulingResult<Vec<Appointment>>;
}

/// Read access to businesses, their services and pets.
#[async_trait]
pub trait BusinessCatalog: Send + Sync {
    async fn find_business(&self, id: Uuid) -> SchedulingResult<Option<Business>>;

    async fn find_service(
        &self,
        business_id: Uuid,
        service_id: Uuid,
    ) -> SchedulingResult<Option<Service>>;

    async fn find_pet(&self, id: Uuid) -> SchedulingResult<Option<Pet>>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Payments in status `pago` that lack a `paid_at` timestamp.
    async fn find_paid_missing_timestamp(&self) -> SchedulingResult<Vec<Payment>>;

    async fn stamp_paid_at(&self, id: Uuid, paid_at: DateTime<Utc>) -> SchedulingResult<Payment>;
}
