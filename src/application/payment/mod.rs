//! Payment processing

pub mod coordinator;
pub mod policy;

pub use coordinator::{PaymentCoordinator, ProcessedPayment};
pub use policy::{FixedOutcome, PaymentOutcome, RandomOutcome};
