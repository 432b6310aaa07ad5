//! In-memory repository implementation

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use crate::domain::{
    Booking, BookingRepository, BookingStatus, DomainError, DomainResult, NewBooking,
    NewNotification, NewPayment, NewShow, Notification, NotificationRepository, Payment, PaymentRepository, PaymentStatus, RepositoryProvider, Requester,
    RequesterRepository, SeatInventory, Show, ShowDetails, ShowRepository,
};

/// In-memory storage for development and testing
pub struct InMemoryRepositoryProvider {
    bookings: InMemoryBookingRepository,
    payments: InMemoryPaymentRepository,
    shows: InMemoryShowRepository,
    requesters: InMemoryRequesterRepository,
    notifications: InMemoryNotificationRepository,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        let bookings = InMemoryBookingRepository::default();
        let shows = InMemoryShowRepository {
            shows: DashMap::new(),
            bookings: Arc::clone(&bookings.bookings),
            counter: AtomicI32::new(1),
        };
        Self {
            bookings,
            payments: InMemoryPaymentRepository::default(),
            shows,
            requesters: InMemoryRequesterRepository::default(),
            notifications: InMemoryNotificationRepository::default(),
        }
    }

    /// Register a requester id with placeholder profile data
    pub fn insert_requester(&self, id: i32) {
        self.requesters.requesters.insert(
            id,
            Requester {
                id,
                email: format!("requester{}@example.com", id),
                display_name: format!("Requester {}", id),
                created_at: Utc::now(),
            },
        );
    }

    /// Insert a show as-is, keeping its id and counters
    pub fn insert_show(&self, show: Show) {
        self.shows.counter.fetch_max(show.id + 1, Ordering::SeqCst);
        self.shows.shows.insert(show.id, show);
    }
}

impl Default for InMemoryRepositoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
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

// ── Bookings ────────────────────────────────────────────────────

pub struct InMemoryBookingRepository {
    bookings: Arc<DashMap<i32, Booking>>,
    counter: AtomicI32,
}

impl Default for InMemoryBookingRepository {
    fn default() -> Self {
        Self {
            bookings: Arc::new(DashMap::new()),
            counter: AtomicI32::new(1),
        }
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn create(&self, booking: NewBooking) -> DomainResult<Booking> {
        let id = self.counter.fetch_add(1, Ordering::SeqCst);
        let booking = booking.into_booking(id, Utc::now());
        self.bookings.insert(id, booking.clone());
        Ok(booking)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Booking>> {
        Ok(self.bookings.get(&id).map(|b| b.clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<Booking>> {
        let mut all: Vec<Booking> = self.bookings.iter().map(|b| b.clone()).collect();
        all.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(all)
    }

    async fn transition_status(
        &self,
        id: i32,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> DomainResult<Option<Booking>> {
        let mut booking = self
            .bookings
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Booking", "id", id))?;

        if booking.status != expected {
            return Ok(None);
        }
        booking.status = next;
        Ok(Some(booking.clone()))
    }

    async fn find_by_show_and_status(
        &self,
        show_id: i32,
        status: BookingStatus,
    ) -> DomainResult<Vec<Booking>> {
        let mut matching: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| b.show_id == show_id && b.status == status)
            .map(|b| b.clone())
            .collect();
        matching.sort_by_key(|b| b.id);
        Ok(matching)
    }
}

// ── Payments ────────────────────────────────────────────────────

pub struct InMemoryPaymentRepository {
    payments: DashMap<i32, Payment>,
    counter: AtomicI32,
}

impl Default for InMemoryPaymentRepository {
    fn default() -> Self {
        Self {
            payments: DashMap::new(),
            counter: AtomicI32::new(1),
        }
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn create(&self, payment: NewPayment) -> DomainResult<Payment> {
        let id = self.counter.fetch_add(1, Ordering::SeqCst);
        let payment = payment.into_payment(id, Utc::now());
        self.payments.insert(id, payment.clone());
        Ok(payment)
    }

    async fn update_status(&self, id: i32, status: PaymentStatus) -> DomainResult<()> {
        let mut payment = self
            .payments
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Payment", "id", id))?;
        payment.status = status;
        Ok(())
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Payment>> {
        Ok(self.payments.get(&id).map(|p| p.clone()))
    }

    async fn find_by_booking(&self, booking_id: i32) -> DomainResult<Vec<Payment>> {
        let mut attempts: Vec<Payment> = self
            .payments
            .iter()
            .filter(|p| p.booking_id == booking_id)
            .map(|p| p.clone())
            .collect();
        attempts.sort_by_key(|p| p.id);
        Ok(attempts)
    }
}

// ── Shows and inventory ─────────────────────────────────────────

pub struct InMemoryShowRepository {
    shows: DashMap<i32, Show>,
    /// Shared with the booking repository for the delete check
    bookings: Arc<DashMap<i32, Booking>>,
    counter: AtomicI32,
}

#[async_trait]
impl ShowRepository for InMemoryShowRepository {
    async fn create(&self, show: NewShow) -> DomainResult<Show> {
        show.validate()?;
        let id = self.counter.fetch_add(1, Ordering::SeqCst);
        let show = show.into_show(id);
        self.shows.insert(id, show.clone());
        Ok(show)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Show>> {
        Ok(self.shows.get(&id).map(|s| s.clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<Show>> {
        let mut all: Vec<Show> = self.shows.iter().map(|s| s.clone()).collect();
        all.sort_by(|a, b| a.starts_at.cmp(&b.starts_at).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn update_details(&self, id: i32, details: &ShowDetails) -> DomainResult<Show> {
        details.validate()?;
        let mut show = self
            .shows
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Show", "id", id))?;
        details.apply_to(&mut show);
        Ok(show.clone())
    }

    async fn delete(&self, id: i32) -> DomainResult<()> {
        // Checked under the show's shard lock
        let removed = self
            .shows
            .remove_if(&id, |_, _| !self.bookings.iter().any(|b| b.show_id == id));
        match removed {
            Some(_) => Ok(()),
            None if self.shows.contains_key(&id) => Err(DomainError::ShowHasBookings { show_id: id }),
            None => Err(DomainError::not_found("Show", "id", id)),
        }
    }
}

#[async_trait]
impl SeatInventory for InMemoryShowRepository {
    async fn get(&self, show_id: i32) -> DomainResult<Option<Show>> {
        self.find_by_id(show_id).await
    }

    // `get_mut` holds the shard write lock for the whole check-and-update.
    async fn decrement(&self, show_id: i32, seats: u32) -> DomainResult<u32> {
        let mut show = self
            .shows
            .get_mut(&show_id)
            .ok_or_else(|| DomainError::not_found("Show", "id", show_id))?;
        let available = show.after_decrement(seats)?;
        show.available_seats = available;
        Ok(available)
    }

    async fn increment(&self, show_id: i32, seats: u32) -> DomainResult<u32> {
        let mut show = self
            .shows
            .get_mut(&show_id)
            .ok_or_else(|| DomainError::not_found("Show", "id", show_id))?;
        let available = show.after_increment(seats);
        show.available_seats = available;
        Ok(available)
    }

    async fn resize(&self, show_id: i32, new_total: u32, reserved: u32) -> DomainResult<Show> {
        let mut show = self
            .shows
            .get_mut(&show_id)
            .ok_or_else(|| DomainError::not_found("Show", "id", show_id))?;
        let available = show.after_resize(new_total, reserved)?;
        show.total_seats = new_total;
        show.available_seats = available;
        Ok(show.clone())
    }
}

// ── Notifications ───────────────────────────────────────────────

pub struct InMemoryNotificationRepository {
    notifications: DashMap<i32, Notification>,
    counter: AtomicI32,
}

impl Default for InMemoryNotificationRepository {
    fn default() -> Self {
        Self {
            notifications: DashMap::new(),
            counter: AtomicI32::new(1),
        }
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn create(&self, notification: NewNotification) -> DomainResult<Notification> {
        let id = self.counter.fetch_add(1, Ordering::SeqCst);
        let notification = notification.into_notification(id, Utc::now());
        self.notifications.insert(id, notification.clone());
        Ok(notification)
    }

    async fn find_by_booking(&self, booking_id: i32) -> DomainResult<Vec<Notification>> {
        let mut attempts: Vec<Notification> = self
            .notifications
            .iter()
            .filter(|n| n.booking_id == booking_id)
            .map(|n| n.clone())
            .collect();
        attempts.sort_by_key(|n| n.id);
        Ok(attempts)
    }
}

// ── Requesters ──────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryRequesterRepository {
    requesters: DashMap<i32, Requester>,
}

#[async_trait]
impl RequesterRepository for InMemoryRequesterRepository {
    async fn exists(&self, id: i32) -> DomainResult<bool> {
        Ok(self.requesters.contains_key(&id))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Requester>> {
        Ok(self.requesters.get(&id).map(|r| r.clone()))
    }

    async fn save(&self, requester: Requester) -> DomainResult<()> {
        self.requesters.insert(requester.id, requester);
        Ok(())
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(self.requesters.len() as u64)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn show(id: i32, total: u32, available: u32) -> Show {
        Show {
            id,
            title: "Hamlet".to_string(),
            description: String::new(),
            starts_at: Utc::now(),
            total_seats: total,
            available_seats: available,
            price_per_seat_cents: 2_500,
        }
    }

    #[tokio::test]
    async fn bookings_get_sequential_ids_and_list_newest_first() {
        let repos = InMemoryRepositoryProvider::new();
        let first = repos
            .bookings()
            .create(NewBooking::pending(1, 1, vec!["A1".into()], 1_000).unwrap())
            .await
            .unwrap();
        let second = repos
            .bookings()
            .create(NewBooking::pending(1, 1, vec!["A2".into()], 1_000).unwrap())
            .await
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        let ids: Vec<i32> = repos
            .bookings()
            .find_all()
            .await
            .unwrap()
            .iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn transition_is_compare_and_set() {
        let repos = InMemoryRepositoryProvider::new();
        let booking = repos
            .bookings()
            .create(NewBooking::pending(1, 1, vec!["A1".into()], 1_000).unwrap())
            .await
            .unwrap();

        let confirmed = repos
            .bookings()
            .transition_status(booking.id, BookingStatus::Pending, BookingStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(confirmed.unwrap().status, BookingStatus::Confirmed);

        let stale = repos
            .bookings()
            .transition_status(booking.id, BookingStatus::Pending, BookingStatus::Cancelled)
            .await
            .unwrap();
        assert!(stale.is_none());

        let missing = repos
            .bookings()
            .transition_status(99, BookingStatus::Pending, BookingStatus::Confirmed)
            .await;
        assert!(matches!(missing, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn decrement_refuses_to_go_negative() {
        let repos = InMemoryRepositoryProvider::new();
        repos.insert_show(show(7, 10, 2));

        let err = repos.inventory().decrement(7, 3).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::InsufficientSeats { requested: 3, available: 2, .. }
        ));
        assert_eq!(repos.inventory().decrement(7, 2).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn increment_clamps_at_total() {
        let repos = InMemoryRepositoryProvider::new();
        repos.insert_show(show(7, 10, 9));
        assert_eq!(repos.inventory().increment(7, 5).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn inventory_reports_missing_show() {
        let repos = InMemoryRepositoryProvider::new();
        assert!(matches!(
            repos.inventory().decrement(1, 1).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(repos.inventory().get(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn concurrent_decrements_never_oversell() {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        repos.insert_show(show(1, 10, 10));

        let mut handles = Vec::new();
        for _ in 0..25 {
            let repos = repos.clone();
            handles.push(tokio::spawn(async move {
                repos.inventory().decrement(1, 1).await.is_ok()
            }));
        }

        let mut succeeded = 0;
        for handle in handles {
            if handle.await.unwrap() {
                succeeded += 1;
            }
        }
        assert_eq!(succeeded, 10);
        let show = repos.inventory().get(1).await.unwrap().unwrap();
        assert_eq!(show.available_seats, 0);
    }

    #[tokio::test]
    async fn resize_and_details_update_in_place() {
        let repos = InMemoryRepositoryProvider::new();
        repos.insert_show(show(7, 10, 6));

        let resized = repos.inventory().resize(7, 8, 1).await.unwrap();
        assert_eq!((resized.total_seats, resized.available_seats), (8, 4));
        assert!(matches!(
            repos.inventory().resize(7, 4, 1).await,
            Err(DomainError::CapacityBelowCommitted { committed: 5, .. })
        ));

        let renamed = repos
            .shows()
            .update_details(
                7,
                &ShowDetails {
                    title: Some("Othello".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.title, "Othello");
        assert_eq!(renamed.total_seats, 8);
    }

    #[tokio::test]
    async fn delete_refuses_booked_show() {
        let repos = InMemoryRepositoryProvider::new();
        repos.insert_show(show(1, 10, 10));
        repos.insert_show(show(2, 10, 10));
        repos
            .bookings()
            .create(NewBooking::pending(1, 1, vec!["A1".into()], 1_000).unwrap())
            .await
            .unwrap();

        assert!(matches!(
            repos.shows().delete(1).await,
            Err(DomainError::ShowHasBookings { show_id: 1 })
        ));
        repos.shows().delete(2).await.unwrap();
        assert!(repos.shows().find_by_id(2).await.unwrap().is_none());
        assert!(matches!(
            repos.shows().delete(2).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn inserted_show_advances_id_counter() {
        let repos = InMemoryRepositoryProvider::new();
        repos.insert_show(show(5, 10, 10));
        let created = repos
            .shows()
            .create(NewShow {
                title: "Macbeth".into(),
                description: String::new(),
                starts_at: Utc::now(),
                total_seats: 20,
                price_per_seat_cents: 1_500,
            })
            .await
            .unwrap();
        assert_eq!(created.id, 6);
        assert_eq!(created.available_seats, 20);
    }

    #[tokio::test]
    async fn payments_are_listed_per_booking() {
        let repos = InMemoryRepositoryProvider::new();
        let payment = repos
            .payments()
            .create(NewPayment {
                booking_id: 3,
                amount_cents: 5_000,
                method: "card".into(),
            })
            .await
            .unwrap();
        repos
            .payments()
            .update_status(payment.id, PaymentStatus::Paid)
            .await
            .unwrap();

        let attempts = repos.payments().find_by_booking(3).await.unwrap();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].status, PaymentStatus::Paid);
        assert!(repos.payments().find_by_booking(4).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn requester_lookup() {
        let repos = InMemoryRepositoryProvider::new();
        repos.insert_requester(42);
        assert!(repos.requesters().exists(42).await.unwrap());
        assert!(!repos.requesters().exists(43).await.unwrap());
        assert_eq!(repos.requesters().count().await.unwrap(), 1);
    }
}
