//! Show catalogue: scheduling, editing and removing shows
//!
//! Editing a show may not break the inventory it already carries: sold
//! seats stay sold, PENDING bookings must still fit, and a show that any
//! booking references cannot be deleted.

use std::sync::Arc;

use tracing::info;

use crate::domain::show::validate_total_seats;
use crate::domain::{
    BookingStatus, DomainError, DomainResult, NewShow, RepositoryProvider, Show, ShowDetails,
};

pub struct ShowCatalog {
    repos: Arc<dyn RepositoryProvider>,
}

impl ShowCatalog {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn create_show(&self, show: NewShow) -> DomainResult<Show> {
        let show = self.repos.shows().create(show).await?;
        info!(show_id = show.id, total_seats = show.total_seats, "Show created");
        Ok(show)
    }

    pub async fn list_shows(&self) -> DomainResult<Vec<Show>> {
        self.repos.shows().find_all().await
    }

    pub async fn get_show(&self, show_id: i32) -> DomainResult<Show> {
        self.repos
            .shows()
            .find_by_id(show_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Show", "id", show_id))
    }

    /// Apply `details` and, when given, a new total seat count.
    ///
    /// The resize runs first so a rejected total leaves the show unchanged.
    /// Seats of PENDING bookings count as committed when shrinking.
    pub async fn update_show(
        &self,
        show_id: i32,
        details: ShowDetails,
        total_seats: Option<u32>,
    ) -> DomainResult<Show> {
        details.validate()?;
        if let Some(total) = total_seats {
            validate_total_seats(total)?;
        }

        let mut show = self.get_show(show_id).await?;

        if let Some(total) = total_seats {
            let reserved: u32 = self
                .repos
                .bookings()
                .find_by_show_and_status(show_id, BookingStatus::Pending)
                .await?
                .iter()
                .map(|b| b.seat_count())
                .sum();
            show = self.repos.inventory().resize(show_id, total, reserved).await?;
        }

        if !details.is_empty() {
            show = self.repos.shows().update_details(show_id, &details).await?;
        }

        info!(
            show_id,
            total_seats = show.total_seats,
            available_seats = show.available_seats,
            "Show updated"
        );
        Ok(show)
    }

    /// Delete a show no booking has ever referenced.
    pub async fn delete_show(&self, show_id: i32) -> DomainResult<()> {
        self.repos.shows().delete(show_id).await?;
        info!(show_id, "Show deleted");
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewBooking;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use chrono::Utc;

    fn show(total: u32, available: u32) -> Show {
        Show {
            id: 1,
            title: "Hamlet".into(),
            description: String::new(),
            starts_at: Utc::now(),
            total_seats: total,
            available_seats: available,
            price_per_seat_cents: 1_000,
        }
    }

    fn catalog_with(show: Show) -> (ShowCatalog, Arc<InMemoryRepositoryProvider>) {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        repos.insert_show(show);
        (ShowCatalog::new(repos.clone()), repos)
    }

    #[tokio::test]
    async fn shrinking_counts_pending_seats_as_committed() {
        // 2 sold, 3 more held by a PENDING booking
        let (catalog, repos) = catalog_with(show(10, 8));
        repos
            .bookings()
            .create(NewBooking::pending(1, 1, vec!["A1".into(), "A2".into(), "A3".into()], 1_000).unwrap())
            .await
            .unwrap();

        let err = catalog
            .update_show(1, ShowDetails::default(), Some(4))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::CapacityBelowCommitted { requested: 4, committed: 5, .. }
        ));

        let shrunk = catalog
            .update_show(1, ShowDetails::default(), Some(5))
            .await
            .unwrap();
        assert_eq!((shrunk.total_seats, shrunk.available_seats), (5, 3));
    }

    #[tokio::test]
    async fn rejected_resize_leaves_details_unchanged() {
        let (catalog, _) = catalog_with(show(10, 0));
        let details = ShowDetails {
            title: Some("Renamed".into()),
            ..Default::default()
        };

        let err = catalog.update_show(1, details, Some(9)).await.unwrap_err();
        assert!(matches!(err, DomainError::CapacityBelowCommitted { .. }));
        assert_eq!(catalog.get_show(1).await.unwrap().title, "Hamlet");
    }

    #[tokio::test]
    async fn update_validates_before_touching_the_show() {
        let (catalog, _) = catalog_with(show(10, 10));
        assert!(matches!(
            catalog.update_show(1, ShowDetails::default(), Some(0)).await,
            Err(DomainError::Validation(_))
        ));
        let overpriced = ShowDetails {
            price_per_seat_cents: Some(i64::MAX),
            ..Default::default()
        };
        assert!(matches!(
            catalog.update_show(1, overpriced, None).await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            catalog.update_show(9, ShowDetails::default(), None).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn price_change_keeps_existing_booking_totals() {
        let (catalog, repos) = catalog_with(show(10, 10));
        let booking = repos
            .bookings()
            .create(NewBooking::pending(1, 1, vec!["A1".into()], 1_000).unwrap())
            .await
            .unwrap();

        let repriced = catalog
            .update_show(
                1,
                ShowDetails {
                    price_per_seat_cents: Some(2_500),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(repriced.price_per_seat_cents, 2_500);

        let stored = repos.bookings().find_by_id(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.total_cost_cents, 1_000);
    }
}
