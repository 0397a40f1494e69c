use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{SchedulingError, SchedulingResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pendente,
    Pago,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pendente => "pendente",
            PaymentStatus::Pago => "pago",
            PaymentStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pendente" => Some(PaymentStatus::Pendente),
            "pago" => Some(PaymentStatus::Pago),
            "cancelled" => Some(PaymentStatus::Cancelled),
            _ => None,
        }
    }
}

/// Payment for a completed appointment. A `pago` payment must carry `paid_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub amount_cents: i64,
    pub status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn is_missing_paid_at(&self) -> bool {
        self.status == PaymentStatus::Pago && self.paid_at.is_none()
    }

    pub fn mark_paid(&mut self, at: DateTime<Utc>) {
        self.status = PaymentStatus::Pago;
        self.paid_at = Some(at);
    }

    pub fn validate(&self) -> SchedulingResult<()> {
        if self.is_missing_paid_at() {
            return Err(SchedulingError::Validation(format!(
                "Payment {} is marked pago without a paid_at timestamp",
                self.id
            )));
        }
        if self.amount_cents < 0 {
            return Err(SchedulingError::Validation(format!(
                "Payment {} has a negative amount",
                self.id
            )));
        }
        Ok(())
    }
}
