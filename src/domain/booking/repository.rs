//! Booking repository interface

use async_trait::async_trait;

use super::model::{Booking, BookingStatus, NewBooking};
use crate::domain::DomainResult;

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Persist a new booking in `PENDING` and return it with its assigned id
    async fn create(&self, booking: NewBooking) -> DomainResult<Booking>;

    /// Find booking by ID
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Booking>>;

    /// All bookings, newest first
    async fn find_all(&self) -> DomainResult<Vec<Booking>>;

    /// Compare-and-set the status: succeeds only while the stored status is
    /// still `expected`. Returns the updated booking, or `None` when the
    /// booking exists but its status no longer matches.
    async fn transition_status(
        &self,
        id: i32,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> DomainResult<Option<Booking>>;

    /// Bookings for a show in the given status (seat occupancy queries)
    async fn find_by_show_and_status(
        &self,
        show_id: i32,
        status: BookingStatus,
    ) -> DomainResult<Vec<Booking>>;
}
