use uuid::Uuid;

use crate::errors::{SchedulingError, SchedulingResult};
use crate::events::AppointmentEventKind;
use crate::models::appointment::{Appointment, NewAppointment, ReserveAppointmentRequest};
use crate::models::slot::hhmm;
use crate::scheduling::{availability, Scheduler};

impl Scheduler {
    /// Books `request.start_time` on `request.date` for a pending appointment.
    ///
    /// The slot is not re-checked here against current bookings: the ledger
    /// checks and inserts in one step and answers `Conflict` if another
    /// reservation got there first. A conflict is returned as-is, never
    /// retried on a different slot.
    ///
    /// # Errors
    ///
    /// * `NotFound` - unknown or inactive business or service, or a pet that
    ///   does not belong to the client
    /// * `InvalidDate` - `request.date` is before the business-local today
    /// * `Validation` - the start is not on the business's slot grid, or has
    ///   already passed today
    /// * `Conflict` - the occupied interval overlaps an active appointment
    pub async fn reserve(
        &self,
        business_id: Uuid,
        request: ReserveAppointmentRequest,
    ) -> SchedulingResult<Appointment> {
        let now = self.now();
        let business = self.bookable_business(business_id).await?;
        let service = self.bookable_service(&business, request.service_id).await?;
        Self::ensure_not_past(&business, request.date, now)?;

        let pet = self
            .catalog
            .find_pet(request.pet_id)
            .await?
            .filter(|pet| pet.owner_id == request.client_id)
            .ok_or_else(|| {
                SchedulingError::NotFound(format!(
                    "Pet with ID {} not found for client {}",
                    request.pet_id, request.client_id
                ))
            })?;

        let windows = business.windows_on(request.date);
        if !availability::is_candidate(
            &windows,
            business.slot_interval_minutes,
            service.duration_minutes,
            request.start_time,
        ) {
            return Err(SchedulingError::Validation(format!(
                "{} on {} is not a bookable start for a {}-minute service",
                hhmm::format(request.start_time),
                request.date,
                service.duration_minutes
            )));
        }

        if request.date.and_time(request.start_time) < business.local_now(now) {
            return Err(SchedulingError::Validation(format!(
                "{} on {} has already started",
                hhmm::format(request.start_time),
                request.date
            )));
        }

        let record = NewAppointment {
            id: Uuid::new_v4(),
            business_id: business.id,
            service_id: service.id,
            client_id: request.client_id,
            pet_id: pet.id,
            scheduled_date: request.date,
            scheduled_time: request.start_time,
            duration_minutes: service.duration_minutes,
            created_at: now,
        };

        let appointment = match self.ledger.insert_appointment(record).await {
            Ok(appointment) => appointment,
            Err(SchedulingError::Conflict(conflict)) => {
                tracing::warn!(
                    business_id = %business.id,
                    date = %conflict.date,
                    "reservation lost the slot: {}",
                    conflict
                );
                return Err(SchedulingError::Conflict(conflict));
            }
            Err(e) => return Err(e),
        };

        tracing::info!(
            appointment_id = %appointment.id,
            business_id = %business.id,
            date = %appointment.scheduled_date,
            start = %hhmm::format(appointment.scheduled_time),
            "appointment reserved"
        );
        self.emit(AppointmentEventKind::BookingCreated, &appointment, now);

        Ok(appointment)
    }
}
