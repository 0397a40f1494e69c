use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::appointment::{Actor, AppointmentStatus};
use crate::models::slot::OccupiedInterval;

#[derive(Error, Debug)]
pub enum SchedulingError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Slot conflict: {0}")]
    Conflict(SlotConflict),

    #[error("Invalid transition: {0}")]
    InvalidTransition(InvalidTransition),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub type SchedulingResult<T> = Result<T, SchedulingError>;

/// The slot a reservation asked for and the active appointments blocking it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotConflict {
    pub business_id: Uuid,
    pub date: NaiveDate,
    pub requested: OccupiedInterval,
    pub blocking: Vec<OccupiedInterval>,
}

impl fmt::Display for SlotConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on {} is no longer available",
            self.requested, self.date
        )?;
        if !self.blocking.is_empty() {
            let blocking: Vec<String> = self.blocking.iter().map(ToString::to_string).collect();
            write!(f, " (blocked by {})", blocking.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidTransition {
    pub appointment_id: Uuid,
    pub from: AppointmentStatus,
    pub to: AppointmentStatus,
    pub actor: Actor,
    pub reason: String,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cannot move appointment {} from {} to {}: {}",
            self.actor, self.appointment_id, self.from, self.to, self.reason
        )
    }
}

impl SchedulingError {
    /// Errors caused by the caller's input rather than by a rejected status
    /// change or the infrastructure.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            SchedulingError::NotFound(_)
                | SchedulingError::InvalidDate(_)
                | SchedulingError::Conflict(_)
                | SchedulingError::Validation(_)
        )
    }
}
