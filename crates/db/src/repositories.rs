pub mod appointment;
pub mod business;
pub mod payment;
