//! Application ports
//!
//! Contracts for collaborators the booking saga calls out to but does not own.

pub mod outbound;

pub use outbound::{BookingNotice, BookingNotifier, NotificationKind, PaymentOutcomePolicy};
