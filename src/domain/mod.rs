pub mod booking;
pub mod notification;
pub mod payment;
pub mod repositories;
pub mod requester;
pub mod seat_lock;
pub mod show;

// Re-export commonly used types
pub use booking::{Booking, BookingRepository, BookingStatus, NewBooking};
pub use notification::{NewNotification, Notification, NotificationRepository, NotificationStatus};
pub use payment::{NewPayment, Payment, PaymentRepository, PaymentStatus};
pub use repositories::{DomainResult, RepositoryProvider};
pub use requester::{Requester, RequesterRepository};
pub use seat_lock::{SeatKey, SeatLockStore};
pub use show::{NewShow, SeatInventory, Show, ShowDetails, ShowRepository};

// Re-export DomainError from shared for convenience
pub use crate::shared::errors::{DomainError, ErrorKind};
