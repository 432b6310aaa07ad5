//! Payment repository interface

use async_trait::async_trait;

use super::model::{NewPayment, Payment, PaymentStatus};
use crate::domain::DomainResult;

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Persist a new payment in `PENDING`
    async fn create(&self, payment: NewPayment) -> DomainResult<Payment>;

    async fn update_status(&self, id: i32, status: PaymentStatus) -> DomainResult<()>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Payment>>;

    /// All payment attempts for a booking, oldest first
    async fn find_by_booking(&self, booking_id: i32) -> DomainResult<Vec<Payment>>;
}
