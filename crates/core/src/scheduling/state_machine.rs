//! # Appointment lifecycle
//!
//! ```text
//! pending ──business──▶ confirmed ──business, after start──▶ completed
//!    │                      │
//!    │ client (before start)│ business
//!    │ business (any time)  │
//!    │ maintenance (date    ▼
//!    └── passed) ───────▶ cancelled
//! ```
//!
//! `completed` and `cancelled` are terminal. Time preconditions are judged
//! against the business's local wall clock.

use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::errors::{InvalidTransition, SchedulingError, SchedulingResult};
use crate::events::AppointmentEventKind;
use crate::models::appointment::{Actor, Appointment, AppointmentStatus, StatusChange};
use crate::scheduling::Scheduler;

/// Checks whether `actor` may move `appointment` to `to` at `local_now`.
pub fn check_transition(
    appointment: &Appointment,
    to: AppointmentStatus,
    actor: Actor,
    local_now: NaiveDateTime,
) -> Result<(), InvalidTransition> {
    use AppointmentStatus::*;

    let from = appointment.status;
    let reject = |reason: &str| {
        Err(InvalidTransition {
            appointment_id: appointment.id,
            from,
            to,
            actor,
            reason: reason.to_string(),
        })
    };

    if from.is_terminal() {
        return reject("appointment is already in a terminal status");
    }

    let started = local_now >= appointment.scheduled_start();
    match (from, to, actor) {
        (Pending, Confirmed, Actor::Business) => Ok(()),
        (Pending, Cancelled, Actor::Client) if started => {
            reject("the scheduled start has already passed")
        }
        (Pending, Cancelled, Actor::Client) => Ok(()),
        (Pending | Confirmed, Cancelled, Actor::Business) => Ok(()),
        (Confirmed, Completed, Actor::Business) if !started => {
            reject("the scheduled start has not been reached")
        }
        (Confirmed, Completed, Actor::Business) => Ok(()),
        (Pending, Cancelled, Actor::Maintenance) if appointment.scheduled_date < local_now.date() => {
            Ok(())
        }
        (Pending, Cancelled, Actor::Maintenance) => {
            reject("the appointment date has not passed yet")
        }
        _ => reject("transition is not allowed for this actor"),
    }
}

fn event_for(status: AppointmentStatus) -> Option<AppointmentEventKind> {
    match status {
        AppointmentStatus::Confirmed => Some(AppointmentEventKind::BookingConfirmed),
        AppointmentStatus::Completed => Some(AppointmentEventKind::BookingCompleted),
        AppointmentStatus::Cancelled => Some(AppointmentEventKind::BookingCancelled),
        AppointmentStatus::Pending => None,
    }
}

impl Scheduler {
    /// Moves an appointment to `to` on behalf of `actor`.
    ///
    /// Cancelling frees the occupied interval right away. If the stored
    /// status changed since it was read, the ledger refuses the write and
    /// this returns `InvalidTransition`.
    pub async fn transition(
        &self,
        appointment_id: Uuid,
        to: AppointmentStatus,
        actor: Actor,
        reason: Option<String>,
    ) -> SchedulingResult<Appointment> {
        let now = self.now();
        let appointment = self.appointment(appointment_id).await?;
        let business = self
            .catalog
            .find_business(appointment.business_id)
            .await?
            .ok_or_else(|| {
                SchedulingError::NotFound(format!(
                    "Business with ID {} not found",
                    appointment.business_id
                ))
            })?;

        self.apply_transition(&appointment, to, actor, reason, business.local_now(now), now)
            .await
    }

    pub(crate) async fn apply_transition(
        &self,
        appointment: &Appointment,
        to: AppointmentStatus,
        actor: Actor,
        reason: Option<String>,
        local_now: NaiveDateTime,
        now: DateTime<Utc>,
    ) -> SchedulingResult<Appointment> {
        if let Err(invalid) = check_transition(appointment, to, actor, local_now) {
            tracing::error!(
                appointment_id = %appointment.id,
                from = %invalid.from,
                to = %invalid.to,
                actor = %invalid.actor,
                "rejected status change: {}",
                invalid.reason
            );
            return Err(SchedulingError::InvalidTransition(invalid));
        }

        let updated = self
            .ledger
            .update_status(StatusChange {
                appointment_id: appointment.id,
                from: appointment.status,
                to,
                actor,
                reason,
                at: now,
            })
            .await?;

        tracing::info!(
            appointment_id = %updated.id,
            from = %appointment.status,
            to = %updated.status,
            %actor,
            "appointment status changed"
        );
        if let Some(kind) = event_for(updated.status) {
            self.emit(kind, &updated, now);
        }
        Ok(updated)
    }
}
