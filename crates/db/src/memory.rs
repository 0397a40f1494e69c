//! In-process implementations of the scheduling ports, used by tests and
//! local runs without a database.
//!
//! [`InMemoryLedger`] holds one lock across the overlap check and the write,
//! which gives it the same all-or-nothing reservation behavior as the
//! Postgres exclusion constraint.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use petcare_core::errors::{SchedulingError, SchedulingResult, SlotConflict};
use petcare_core::models::{
    appointment::{Appointment, AppointmentStatus, NewAppointment, StatusChange},
    business::{Business, Service},
    payment::Payment,
    pet::Pet,
    slot::OccupiedInterval,
};
use petcare_core::ports::{BookingLedger, BusinessCatalog, PaymentStore};
use uuid::Uuid;

use crate::store::stale_status;

#[derive(Debug, Default)]
pub struct InMemoryLedger {
    appointments: Mutex<Vec<Appointment>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Appointment>> {
        self.appointments.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Stores an appointment as-is, skipping the overlap check. Only useful
    /// for seeding fixtures, including deliberately inconsistent ones.
    pub fn insert_unchecked(&self, appointment: Appointment) {
        self.lock().push(appointment);
    }

    pub fn all(&self) -> Vec<Appointment> {
        self.lock().clone()
    }
}

fn blocking_intervals(
    appointments: &[Appointment],
    business_id: Uuid,
    date: NaiveDate,
    requested: &OccupiedInterval,
) -> Vec<OccupiedInterval> {
    let mut blocking: Vec<OccupiedInterval> = appointments
        .iter()
        .filter(|a| a.business_id == business_id && a.scheduled_date == date && a.is_active())
        .map(Appointment::occupied_interval)
        .filter(|interval| interval.overlaps(requested))
        .collect();
    blocking.sort();
    blocking
}

#[async_trait]
impl BookingLedger for InMemoryLedger {
    async fn find_active_appointments(
        &self,
        business_id: Uuid,
        date: NaiveDate,
    ) -> SchedulingResult<Vec<OccupiedInterval>> {
        let mut intervals: Vec<OccupiedInterval> = self
            .lock()
            .iter()
            .filter(|a| a.business_id == business_id && a.scheduled_date == date && a.is_active())
            .map(Appointment::occupied_interval)
            .collect();
        intervals.sort();
        Ok(intervals)
    }

    async fn insert_appointment(&self, record: NewAppointment) -> SchedulingResult<Appointment> {
        let mut appointments = self.lock();

        if appointments.iter().any(|a| a.id == record.id) {
            return Err(SchedulingError::Validation(format!(
                "Appointment with ID {} already exists",
                record.id
            )));
        }

        let requested = record.occupied_interval();
        let blocking = blocking_intervals(&appointments, record.business_id, record.scheduled_date, &requested);
        if !blocking.is_empty() {
            return Err(SchedulingError::Conflict(SlotConflict {
                business_id: record.business_id,
                date: record.scheduled_date,
                requested,
                blocking,
            }));
        }

        let appointment = record.into_appointment();
        appointments.push(appointment.clone());
        Ok(appointment)
    }

    async fn find_appointment(&self, id: Uuid) -> SchedulingResult<Option<Appointment>> {
        Ok(self.lock().iter().find(|a| a.id == id).cloned())
    }

    async fn update_status(&self, change: StatusChange) -> SchedulingResult<Appointment> {
        let mut appointments = self.lock();
        let Some(appointment) = appointments
            .iter_mut()
            .find(|a| a.id == change.appointment_id && a.deleted_at.is_none())
        else {
            return Err(stale_status(&change));
        };
        if appointment.status != change.from {
            return Err(stale_status(&change));
        }

        appointment.status = change.to;
        appointment.updated_at = change.at;
        if change.to == AppointmentStatus::Cancelled && change.reason.is_some() {
            appointment.cancellation_reason = change.reason;
        }
        Ok(appointment.clone())
    }

    async fn find_pending_before(&self, date: NaiveDate) -> SchedulingResult<Vec<Appointment>> {
        let mut pending: Vec<Appointment> = self
            .lock()
            .iter()
            .filter(|a| {
                a.status == AppointmentStatus::Pending && a.deleted_at.is_none() && a.scheduled_date < date
            })
            .cloned()
            .collect();
        pending.sort_by_key(|a| a.scheduled_start());
        Ok(pending)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    businesses: RwLock<HashMap<Uuid, Business>>,
    services: RwLock<HashMap<Uuid, Service>>,
    pets: RwLock<HashMap<Uuid, Pet>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_business(&self, business: Business) {
        self.businesses
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(business.id, business);
    }

    pub fn add_service(&self, service: Service) {
        self.services
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(service.id, service);
    }

    pub fn add_pet(&self, pet: Pet) {
        self.pets
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(pet.id, pet);
    }
}

#[async_trait]
impl BusinessCatalog for InMemoryCatalog {
    async fn find_business(&self, id: Uuid) -> SchedulingResult<Option<Business>> {
        Ok(self
            .businesses
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .cloned())
    }

    async fn find_service(
        &self,
        business_id: Uuid,
        service_id: Uuid,
    ) -> SchedulingResult<Option<Service>> {
        Ok(self
            .services
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&service_id)
            .filter(|service| service.business_id == business_id)
            .cloned())
    }

    async fn find_pet(&self, id: Uuid) -> SchedulingResult<Option<Pet>> {
        Ok(self.pets.read().unwrap_or_else(|e| e.into_inner()).get(&id).cloned())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryPaymentStore {
    payments: Mutex<Vec<Payment>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_payment(&self, payment: Payment) {
        self.payments
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(payment);
    }

    pub fn all(&self) -> Vec<Payment> {
        self.payments.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn find_paid_missing_timestamp(&self) -> SchedulingResult<Vec<Payment>> {
        Ok(self
            .payments
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|p| p.is_missing_paid_at())
            .cloned()
            .collect())
    }

    async fn stamp_paid_at(&self, id: Uuid, paid_at: DateTime<Utc>) -> SchedulingResult<Payment> {
        let mut payments = self.payments.lock().unwrap_or_else(|e| e.into_inner());
        let payment = payments
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| SchedulingError::NotFound(format!("Payment with ID {} not found", id)))?;
        if payment.paid_at.is_none() {
            payment.mark_paid(paid_at);
        }
        Ok(payment.clone())
    }
}
