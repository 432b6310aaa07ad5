//! Notification log
//!
//! One record per delivery attempt of a booking notice, kept so a sent or
//! failed notice can be traced after the fact.

pub mod model;
pub mod repository;

pub use model::{NewNotification, Notification, NotificationStatus};
pub use repository::NotificationRepository;
