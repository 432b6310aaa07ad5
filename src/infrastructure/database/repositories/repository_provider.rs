//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::booking::BookingRepository;
use crate::domain::notification::NotificationRepository;
use crate::domain::payment::PaymentRepository;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::requester::RequesterRepository;
use crate::domain::show::{SeatInventory, ShowRepository};

use super::booking_repository::SeaOrmBookingRepository;
use super::notification_repository::SeaOrmNotificationRepository;
use super::payment_repository::SeaOrmPaymentRepository;
use super::requester_repository::SeaOrmRequesterRepository;
use super::show_repository::SeaOrmShowRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let show = repos.inventory().get(7).await?;
/// let left = repos.inventory().decrement(7, 2).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    bookings: SeaOrmBookingRepository,
    payments: SeaOrmPaymentRepository,
    shows: SeaOrmShowRepository,
    requesters: SeaOrmRequesterRepository,
    notifications: SeaOrmNotificationRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            bookings: SeaOrmBookingRepository::new(db.clone()),
            payments: SeaOrmPaymentRepository::new(db.clone()),
            shows: SeaOrmShowRepository::new(db.clone()),
            requesters: SeaOrmRequesterRepository::new(db.clone()),
            notifications: SeaOrmNotificationRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn bookings(&self) -> &dyn BookingRepository {
        &self.bookings
    }

    fn payments(&self) -> &dyn PaymentRepository {
        &self.payments
    }

    fn shows(&self) -> &dyn ShowRepository {
        &self.shows
    }

    fn inventory(&self) -> &dyn SeatInventory {
        &self.shows
    }

    fn requesters(&self) -> &dyn RequesterRepository {
        &self.requesters
    }

    fn notifications(&self) -> &dyn NotificationRepository {
        &self.notifications
    }
}
