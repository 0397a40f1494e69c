use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use eyre::{eyre, Result, WrapErr};
use petcare_core::models::{
    appointment::{Appointment, AppointmentStatus},
    business::{Business, OperatingWindow, Service},
    payment::{Payment, PaymentStatus},
    pet::Pet,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBusiness {
    pub id: Uuid,
    pub name: String,
    pub timezone: String,
    pub slot_interval_minutes: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbOperatingWindow {
    pub business_id: Uuid,
    /// 0 = Monday .. 6 = Sunday
    pub weekday: i16,
    pub opens: NaiveTime,
    pub closes: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbService {
    pub id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub duration_minutes: i32,
    pub price_cents: i64,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPet {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub age_years: Option<i32>,
    pub weight_kg: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub id: Uuid,
    pub business_id: Uuid,
    pub service_id: Uuid,
    pub client_id: Uuid,
    pub pet_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub duration_minutes: i32,
    pub status: String,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPayment {
    pub id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub amount_cents: i64,
    pub status: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

pub fn weekday_to_db(weekday: Weekday) -> i16 {
    weekday.num_days_from_monday() as i16
}

pub fn weekday_from_db(value: i16) -> Result<Weekday> {
    match value {
        0 => Ok(Weekday::Mon),
        1 => Ok(Weekday::Tue),
        2 => Ok(Weekday::Wed),
        3 => Ok(Weekday::Thu),
        4 => Ok(Weekday::Fri),
        5 => Ok(Weekday::Sat),
        6 => Ok(Weekday::Sun),
        other => Err(eyre!("Invalid weekday value {} in operating_hours", other)),
    }
}

fn non_negative(value: i32, column: &str) -> Result<u32> {
    u32::try_from(value).wrap_err_with(|| format!("Negative value {} in {}", value, column))
}

impl DbBusiness {
    pub fn into_domain(self, hours: Vec<DbOperatingWindow>) -> Result<Business> {
        let timezone: Tz = self
            .timezone
            .parse()
            .map_err(|e| eyre!("Business {} has invalid timezone '{}': {}", self.id, self.timezone, e))?;

        let operating_hours = hours
            .into_iter()
            .map(|window| -> Result<OperatingWindow> {
                Ok(OperatingWindow {
                    weekday: weekday_from_db(window.weekday)?,
                    opens: window.opens,
                    closes: window.closes,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Business {
            id: self.id,
            name: self.name,
            timezone,
            operating_hours,
            slot_interval_minutes: non_negative(self.slot_interval_minutes, "slot_interval_minutes")?,
            active: self.active,
            created_at: self.created_at,
        })
    }
}

impl TryFrom<DbService> for Service {
    type Error = eyre::Report;

    fn try_from(row: DbService) -> Result<Self> {
        Ok(Service {
            id: row.id,
            business_id: row.business_id,
            name: row.name,
            duration_minutes: non_negative(row.duration_minutes, "duration_minutes")?,
            price_cents: row.price_cents,
            active: row.active,
        })
    }
}

impl TryFrom<DbPet> for Pet {
    type Error = eyre::Report;

    fn try_from(row: DbPet) -> Result<Self> {
        Ok(Pet {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            species: row.species,
            breed: row.breed,
            age_years: row.age_years.map(|age| non_negative(age, "age_years")).transpose()?,
            weight_kg: row.weight_kg,
        })
    }
}

impl TryFrom<DbAppointment> for Appointment {
    type Error = eyre::Report;

    fn try_from(row: DbAppointment) -> Result<Self> {
        let status: AppointmentStatus = row.status.parse().map_err(|e: String| eyre!(e))?;
        Ok(Appointment {
            id: row.id,
            business_id: row.business_id,
            service_id: row.service_id,
            client_id: row.client_id,
            pet_id: row.pet_id,
            scheduled_date: row.scheduled_date,
            scheduled_time: row.scheduled_time,
            duration_minutes: non_negative(row.duration_minutes, "duration_minutes")?,
            status,
            cancellation_reason: row.cancellation_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

impl TryFrom<DbPayment> for Payment {
    type Error = eyre::Report;

    fn try_from(row: DbPayment) -> Result<Self> {
        let status = PaymentStatus::parse(&row.status)
            .ok_or_else(|| eyre!("Unknown payment status '{}' on {}", row.status, row.id))?;
        Ok(Payment {
            id: row.id,
            appointment_id: row.appointment_id,
            amount_cents: row.amount_cents,
            status,
            paid_at: row.paid_at,
            created_at: row.created_at,
        })
    }
}
