//! Notification log interface

use async_trait::async_trait;

use super::model::{NewNotification, Notification};
use crate::domain::DomainResult;

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: NewNotification) -> DomainResult<Notification>;

    /// Every recorded attempt for a booking, oldest first
    async fn find_by_booking(&self, booking_id: i32) -> DomainResult<Vec<Notification>>;
}
