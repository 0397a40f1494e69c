use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use mockall::mock;
use petcare_core::errors::SchedulingResult;
use petcare_core::models::{
    appointment::{Appointment, NewAppointment, StatusChange},
    business::{Business, Service},
    payment::Payment,
    pet::Pet,
    slot::OccupiedInterval,
};
use petcare_core::ports::{BookingLedger, BusinessCatalog, PaymentStore};
use uuid::Uuid;

// Mock ports for testing
mock! {
    pub Ledger {}

    #[async_trait]
    impl BookingLedger for Ledger {
        async fn find_active_appointments(
            &self,
            business_id: Uuid,
            date: NaiveDate,
        ) -> SchedulingResult<Vec<OccupiedInterval>>;

        async fn insert_appointment(&self, record: NewAppointment) -> SchedulingResult<Appointment>;

        async fn find_appointment(&self, id: Uuid) -> SchedulingResult<Option<Appointment>>;

        async fn update_status(&self, change: StatusChange) -> SchedulingResult<Appointment>;

        async fn find_pending_before(&self, date: NaiveDate) -> SchedulingResult<Vec<Appointment>>;
    }
}

mock! {
    pub Catalog {}

    #[async_trait]
    impl BusinessCatalog for Catalog {
        async fn find_business(&self, id: Uuid) -> SchedulingResult<Option<Business>>;

        async fn find_service(
            &self,
            business_id: Uuid,
            service_id: Uuid,
        ) -> SchedulingResult<Option<Service>>;

        async fn find_pet(&self, id: Uuid) -> SchedulingResult<Option<Pet>>;
    }
}

mock! {
    pub Payments {}

    #[async_trait]
    impl PaymentStore for Payments {
        async fn find_paid_missing_timestamp(&self) -> SchedulingResult<Vec<Payment>>;

        async fn stamp_paid_at(&self, id: Uuid, paid_at: DateTime<Utc>) -> SchedulingResult<Payment>;
    }
}
