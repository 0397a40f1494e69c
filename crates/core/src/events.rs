//! Appointment lifecycle events handed to the notification dispatcher.
//!
//! Emission is fire-and-forget: [`EventSink::emit`] never blocks and never
//! reports failure to the scheduling code. Sinks log their own dispatch
//! problems.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::appointment::Appointment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentEventKind {
    BookingCreated,
    BookingConfirmed,
    BookingCompleted,
    BookingCancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentEvent {
    pub kind: AppointmentEventKind,
    pub appointment_id: Uuid,
    pub business_id: Uuid,
    /// The client who owns the appointment.
    pub recipient: Uuid,
    pub occurred_at: DateTime<Utc>,
}

impl AppointmentEvent {
    pub fn for_appointment(
        kind: AppointmentEventKind,
        appointment: &Appointment,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            appointment_id: appointment.id,
            business_id: appointment.business_id,
            recipient: appointment.client_id,
            occurred_at,
        }
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: AppointmentEvent);
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&self, event: AppointmentEvent) {
        tracing::trace!(appointment_id = %event.appointment_id, "dropping event {:?}", event.kind);
    }
}

/// Keeps emitted events in memory so they can be inspected.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<AppointmentEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AppointmentEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: AppointmentEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}
