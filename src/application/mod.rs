pub mod booking;
pub mod payment;
pub mod ports;
pub mod show;

// Re-export key types for convenience
pub use booking::{BatchOutcome, BookingOrchestrator, BookingSettings, SeatOutcome};
pub use payment::{PaymentCoordinator, PaymentOutcome, ProcessedPayment};
pub use ports::{BookingNotice, BookingNotifier, NotificationKind, PaymentOutcomePolicy};
pub use show::ShowCatalog;
