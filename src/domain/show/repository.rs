//! Show repository and seat inventory interfaces

use async_trait::async_trait;

use super::model::{NewShow, Show, ShowDetails};
use crate::domain::DomainResult;

/// Show catalogue (event management)
#[async_trait]
pub trait ShowRepository: Send + Sync {
    async fn create(&self, show: NewShow) -> DomainResult<Show>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Show>>;

    /// All shows ordered by start time
    async fn find_all(&self) -> DomainResult<Vec<Show>>;

    /// Overwrite the fields set in `details`; seat counters are untouched.
    async fn update_details(&self, id: i32, details: &ShowDetails) -> DomainResult<Show>;

    /// Remove a show that no booking references, in any status.
    ///
    /// Fails with `ShowHasBookings` otherwise. The check and the delete
    /// are a single statement.
    async fn delete(&self, id: i32) -> DomainResult<()>;
}

/// Authoritative available/total seat counters.
///
/// Both mutations must be atomic per show with respect to each other: a
/// single conditional update statement, never read-then-write.
#[async_trait]
pub trait SeatInventory: Send + Sync {
    /// Current counters and price for a show
    async fn get(&self, show_id: i32) -> DomainResult<Option<Show>>;

    /// Remove `seats` from the available pool and return the new count.
    /// Fails with `InsufficientSeats` instead of going below zero.
    async fn decrement(&self, show_id: i32, seats: u32) -> DomainResult<u32>;

    /// Return `seats` to the available pool, clamped at the total.
    async fn increment(&self, show_id: i32, seats: u32) -> DomainResult<u32>;

    /// Change the total seat count, keeping sold seats sold. Fails with
    /// `CapacityBelowCommitted` when sold plus `reserved` seats would no
    /// longer fit.
    async fn resize(&self, show_id: i32, new_total: u32, reserved: u32) -> DomainResult<Show>;
}
