pub mod appointment;
pub mod availability;
pub mod business;
pub mod maintenance;
pub mod payment;
pub mod pet;
pub mod slot;
