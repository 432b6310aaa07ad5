//! Booking saga: seat acquisition, lifecycle transitions, compensation

pub mod compensation;
pub mod orchestrator;

pub use compensation::{Compensation, CompensationLog};
pub use orchestrator::{BatchOutcome, BookingOrchestrator, BookingSettings, SeatOutcome};
