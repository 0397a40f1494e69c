use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::slot::{hhmm, OccupiedInterval};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }

    /// Whether an appointment in this status holds its occupied interval.
    /// Completed visits still happened in that slot, so only cancellation
    /// frees it.
    pub fn holds_slot(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!("unknown appointment status '{other}'")),
        }
    }
}

/// Who is asking for a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actor {
    Client,
    Business,
    Maintenance,
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Actor::Client => "client",
            Actor::Business => "business",
            Actor::Maintenance => "maintenance",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub business_id: Uuid,
    pub service_id: Uuid,
    pub client_id: Uuid,
    pub pet_id: Uuid,
    pub scheduled_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub scheduled_time: NaiveTime,
    /// Captured from the service when booked.
    pub duration_minutes: u32,
    pub status: AppointmentStatus,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Appointment {
    pub fn occupied_interval(&self) -> OccupiedInterval {
        OccupiedInterval::new(self.scheduled_time, self.duration_minutes)
    }

    /// Active appointments take part in conflict checks.
    pub fn is_active(&self) -> bool {
        self.status.holds_slot() && self.deleted_at.is_none()
    }

    /// Scheduled start in the business's local wall-clock time.
    pub fn scheduled_start(&self) -> NaiveDateTime {
        self.scheduled_date.and_time(self.scheduled_time)
    }
}

/// An appointment about to be written to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub id: Uuid,
    pub business_id: Uuid,
    pub service_id: Uuid,
    pub client_id: Uuid,
    pub pet_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub duration_minutes: u32,
    pub created_at: DateTime<Utc>,
}

impl NewAppointment {
    pub fn occupied_interval(&self) -> OccupiedInterval {
        OccupiedInterval::new(self.scheduled_time, self.duration_minutes)
    }

    /// New appointments always start out pending.
    pub fn into_appointment(self) -> Appointment {
        Appointment {
            id: self.id,
            business_id: self.business_id,
            service_id: self.service_id,
            client_id: self.client_id,
            pet_id: self.pet_id,
            scheduled_date: self.scheduled_date,
            scheduled_time: self.scheduled_time,
            duration_minutes: self.duration_minutes,
            status: AppointmentStatus::Pending,
            cancellation_reason: None,
            created_at: self.created_at,
            updated_at: self.created_at,
            deleted_at: None,
        }
    }
}

/// A validated status change. The ledger applies it only if the appointment
/// is still in `from`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub appointment_id: Uuid,
    pub from: AppointmentStatus,
    pub to: AppointmentStatus,
    pub actor: Actor,
    pub reason: Option<String>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveAppointmentRequest {
    pub service_id: Uuid,
    pub client_id: Uuid,
    pub pet_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub status: AppointmentStatus,
    pub actor: Actor,
    pub reason: Option<String>,
}
