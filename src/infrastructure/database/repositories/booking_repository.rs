//! SeaORM implementation of BookingRepository

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set,
};

use super::db_err;
use crate::domain::booking::{Booking, BookingRepository, BookingStatus, NewBooking};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::booking;
use crate::shared::errors::InfraError;

pub struct SeaOrmBookingRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: booking::Model) -> DomainResult<Booking> {
    let seat_ids: Vec<String> =
        serde_json::from_str(&m.seat_ids).map_err(|e| DomainError::from(InfraError::from(e)))?;
    let status = BookingStatus::parse(&m.status).ok_or_else(|| {
        DomainError::InvariantViolation(format!(
            "booking {} has unknown status '{}'",
            m.id, m.status
        ))
    })?;

    Ok(Booking {
        id: m.id,
        requester_id: m.requester_id,
        show_id: m.show_id,
        seat_ids,
        status,
        total_cost_cents: m.total_cost,
        created_at: m.created_at,
    })
}

fn models_to_domain(models: Vec<booking::Model>) -> DomainResult<Vec<Booking>> {
    models.into_iter().map(model_to_domain).collect()
}

// ── BookingRepository impl ──────────────────────────────────────

#[async_trait]
impl BookingRepository for SeaOrmBookingRepository {
    async fn create(&self, b: NewBooking) -> DomainResult<Booking> {
        debug!(
            "Creating booking for requester {} on show {}",
            b.requester_id, b.show_id
        );

        let seat_ids =
            serde_json::to_string(&b.seat_ids).map_err(|e| DomainError::from(InfraError::from(e)))?;
        let now = Utc::now();
        let model = booking::ActiveModel {
            id: NotSet,
            requester_id: Set(b.requester_id),
            show_id: Set(b.show_id),
            seat_ids: Set(seat_ids),
            status: Set(BookingStatus::Pending.as_str().to_string()),
            total_cost: Set(b.total_cost_cents),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let inserted = model.insert(&self.db).await.map_err(db_err)?;
        model_to_domain(inserted)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Booking>> {
        booking::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_all(&self) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .order_by_desc(booking::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn transition_status(
        &self,
        id: i32,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> DomainResult<Option<Booking>> {
        debug!("Transitioning booking {}: {} -> {}", id, expected, next);

        // UPDATE bookings SET status = next WHERE id = ? AND status = expected
        let result = booking::Entity::update_many()
            .col_expr(booking::Column::Status, Expr::value(next.as_str()))
            .col_expr(booking::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(booking::Column::Id.eq(id))
            .filter(booking::Column::Status.eq(expected.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Booking", "id", id))?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        Ok(Some(current))
    }

    async fn find_by_show_and_status(
        &self,
        show_id: i32,
        status: BookingStatus,
    ) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .filter(booking::Column::ShowId.eq(show_id))
            .filter(booking::Column::Status.eq(status.as_str()))
            .order_by_asc(booking::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RepositoryProvider, Requester};
    use crate::infrastructure::database::repositories::SeaOrmRepositoryProvider;
    use crate::infrastructure::database::test_connection;
    use crate::domain::NewShow;

    async fn seeded() -> (SeaOrmRepositoryProvider, i32) {
        let repos = SeaOrmRepositoryProvider::new(test_connection().await);
        repos
            .requesters()
            .save(Requester {
                id: 1,
                email: "ada@example.com".into(),
                display_name: "Ada".into(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        let show = repos
            .shows()
            .create(NewShow {
                title: "Hamlet".into(),
                description: String::new(),
                starts_at: Utc::now(),
                total_seats: 10,
                price_per_seat_cents: 2_500,
            })
            .await
            .unwrap();
        (repos, show.id)
    }

    #[tokio::test]
    async fn create_keeps_seat_order_and_cost() {
        let (repos, show_id) = seeded().await;
        let booking = repos
            .bookings()
            .create(NewBooking::pending(
                1,
                show_id,
                vec!["C3".into(), "A1".into(), "balcony:2".into()],
                2_500,
            ).unwrap())
            .await
            .unwrap();

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.total_cost_cents, 7_500);

        let loaded = repos.bookings().find_by_id(booking.id).await.unwrap().unwrap();
        assert_eq!(loaded.seat_ids, vec!["C3", "A1", "balcony:2"]);
    }

    #[tokio::test]
    async fn transition_only_applies_to_expected_status() {
        let (repos, show_id) = seeded().await;
        let booking = repos
            .bookings()
            .create(NewBooking::pending(1, show_id, vec!["A1".into()], 2_500).unwrap())
            .await
            .unwrap();

        let cancelled = repos
            .bookings()
            .transition_status(booking.id, BookingStatus::Pending, BookingStatus::Cancelled)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);

        let second = repos
            .bookings()
            .transition_status(booking.id, BookingStatus::Pending, BookingStatus::Confirmed)
            .await
            .unwrap();
        assert!(second.is_none());

        let stored = repos.bookings().find_by_id(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Cancelled);
    }

    #[tokio::test]
    async fn transition_of_missing_booking_is_not_found() {
        let (repos, _) = seeded().await;
        let err = repos
            .bookings()
            .transition_status(77, BookingStatus::Pending, BookingStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn filters_by_show_and_status() {
        let (repos, show_id) = seeded().await;
        let first = repos
            .bookings()
            .create(NewBooking::pending(1, show_id, vec!["A1".into()], 2_500).unwrap())
            .await
            .unwrap();
        repos
            .bookings()
            .create(NewBooking::pending(1, show_id, vec!["A2".into()], 2_500).unwrap())
            .await
            .unwrap();
        repos
            .bookings()
            .transition_status(first.id, BookingStatus::Pending, BookingStatus::Confirmed)
            .await
            .unwrap();

        let confirmed = repos
            .bookings()
            .find_by_show_and_status(show_id, BookingStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].seat_ids, vec!["A1"]);

        let all = repos.bookings().find_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].id > all[1].id);
    }
}
