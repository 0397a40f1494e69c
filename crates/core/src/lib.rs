//! # Pet-care scheduling core
//!
//! Domain models, errors and the scheduling logic for pet-care businesses:
//! slot availability, atomic reservation, the appointment state machine and
//! the maintenance sweep.
//!
//! Persistence, notification delivery and the wall clock are reached through
//! the traits in [`ports`], [`events`] and [`clock`], so everything in
//! [`scheduling`] runs against in-memory adapters in tests.

pub mod clock;
pub mod errors;
pub mod events;
pub mod models;
pub mod ports;
pub mod scheduling;

pub use errors::{SchedulingError, SchedulingResult};
pub use scheduling::Scheduler;
