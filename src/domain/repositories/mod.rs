//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider`: unified access to all per-aggregate repositories
//! - `DomainResult`: standard result type for domain operations

use super::booking::BookingRepository;
use super::notification::NotificationRepository;
use super::payment::PaymentRepository;
use super::requester::RequesterRepository;
use super::show::{SeatInventory, ShowRepository};
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

// ── RepositoryProvider ──────────────────────────────────────────

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let show = repos.inventory().get(7).await?;
///     let booking = repos.bookings().find_by_id(12).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn bookings(&self) -> &dyn BookingRepository;
    fn payments(&self) -> &dyn PaymentRepository;
    fn shows(&self) -> &dyn ShowRepository;
    fn inventory(&self) -> &dyn SeatInventory;
    fn requesters(&self) -> &dyn RequesterRepository;
    fn notifications(&self) -> &dyn NotificationRepository;
}
