//! # Scheduling
//!
//! [`Scheduler`] ties the pure pieces ([`availability`], [`state_machine`])
//! to the ports. It holds no mutable state of its own: every call reads and
//! writes through the [`BookingLedger`], so any number of service instances
//! can run side by side against the same storage.
//!
//! - [`Scheduler::available_slots`] computes open slot starts for a day.
//! - [`Scheduler::reserve`] books a slot; the ledger settles races.
//! - [`Scheduler::transition`] moves an appointment through its lifecycle.
//! - [`Scheduler::sweep_overdue_appointments`] auto-cancels stale pending
//!   appointments in a batch.

pub mod availability;
pub mod guard;
pub mod maintenance;
pub mod state_machine;

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::clock::Clock;
use crate::errors::{SchedulingError, SchedulingResult};
use crate::events::{AppointmentEvent, AppointmentEventKind, EventSink};
use crate::models::appointment::Appointment;
use crate::models::business::{Business, Service};
use crate::models::slot::hhmm;
use crate::ports::{BookingLedger, BusinessCatalog};

pub struct Scheduler {
    ledger: Arc<dyn BookingLedger>,
    catalog: Arc<dyn BusinessCatalog>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventSink>,
}

impl Scheduler {
    pub fn new(
        ledger: Arc<dyn BookingLedger>,
        catalog: Arc<dyn BusinessCatalog>,
        clock: Arc<dyn Clock>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            ledger,
            catalog,
            clock,
            events,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Looks up an appointment, failing with `NotFound` when it is missing
    /// or soft-deleted.
    pub async fn appointment(&self, id: Uuid) -> SchedulingResult<Appointment> {
        self.ledger
            .find_appointment(id)
            .await?
            .filter(|appointment| appointment.deleted_at.is_none())
            .ok_or_else(|| SchedulingError::NotFound(format!("Appointment with ID {} not found", id)))
    }

    /// A business that currently accepts bookings.
    async fn bookable_business(&self, id: Uuid) -> SchedulingResult<Business> {
        let business = self
            .catalog
            .find_business(id)
            .await?
            .ok_or_else(|| SchedulingError::NotFound(format!("Business with ID {} not found", id)))?;

        if !business.active {
            return Err(SchedulingError::NotFound(format!(
                "Business with ID {} is not accepting bookings",
                id
            )));
        }
        Ok(business)
    }

    /// An active service offered by `business`.
    async fn bookable_service(&self, business: &Business, service_id: Uuid) -> SchedulingResult<Service> {
        let service = self
            .catalog
            .find_service(business.id, service_id)
            .await?
            .filter(|service| service.business_id == business.id)
            .ok_or_else(|| {
                SchedulingError::NotFound(format!(
                    "Service with ID {} not found for business {}",
                    service_id, business.id
                ))
            })?;

        if !service.active {
            return Err(SchedulingError::NotFound(format!(
                "Service with ID {} is no longer offered",
                service_id
            )));
        }
        service.validate()?;
        Ok(service)
    }

    fn ensure_not_past(business: &Business, date: NaiveDate, now: DateTime<Utc>) -> SchedulingResult<()> {
        let today = business.today(now);
        if date < today {
            return Err(SchedulingError::InvalidDate(format!(
                "{} is before today ({}) in {}",
                date,
                today,
                business.timezone.name()
            )));
        }
        Ok(())
    }

    fn emit(&self, kind: AppointmentEventKind, appointment: &Appointment, at: DateTime<Utc>) {
        tracing::debug!(
            appointment_id = %appointment.id,
            start = %hhmm::format(appointment.scheduled_time),
            "emitting {:?}",
            kind
        );
        self.events
            .emit(AppointmentEvent::for_appointment(kind, appointment, at));
    }
}
