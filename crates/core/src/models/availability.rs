use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub business_id: Uuid,
    pub service_id: Uuid,
    pub date: NaiveDate,
    pub duration_minutes: u32,
    /// Slot starts as `HH:MM`, ascending.
    pub slots: Vec<String>,
}
