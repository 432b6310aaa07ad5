//! Database entities module

pub mod booking;
pub mod notification;
pub mod payment;
pub mod requester;
pub mod show;

pub use booking::Entity as Booking;
pub use notification::Entity as Notification;
pub use payment::Entity as Payment;
pub use requester::Entity as Requester;
pub use show::Entity as Show;
