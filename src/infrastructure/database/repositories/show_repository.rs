//! SeaORM implementation of ShowRepository and SeatInventory

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, NotSet,
    QueryFilter, QueryOrder, Set,
};

use super::db_err;
use crate::domain::show::{NewShow, SeatInventory, Show, ShowDetails, ShowRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{booking, show};

pub struct SeaOrmShowRepository {
    db: DatabaseConnection,
}

impl SeaOrmShowRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn fetch(&self, show_id: i32) -> DomainResult<Option<show::Model>> {
        show::Entity::find_by_id(show_id)
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    async fn available_after_update(&self, show_id: i32) -> DomainResult<u32> {
        let model = self
            .fetch(show_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Show", "id", show_id))?;
        Ok(model.available_seats.max(0) as u32)
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: show::Model) -> Show {
    Show {
        id: m.id,
        title: m.title,
        description: m.description,
        starts_at: m.starts_at,
        total_seats: m.total_seats.max(0) as u32,
        available_seats: m.available_seats.max(0) as u32,
        price_per_seat_cents: m.price_per_seat,
    }
}

fn seats_to_i32(seats: u32) -> DomainResult<i32> {
    i32::try_from(seats)
        .map_err(|_| DomainError::Validation(format!("seat count {} is too large", seats)))
}

// ── ShowRepository impl ─────────────────────────────────────────

#[async_trait]
impl ShowRepository for SeaOrmShowRepository {
    async fn create(&self, new_show: NewShow) -> DomainResult<Show> {
        new_show.validate()?;
        debug!("Creating show: {}", new_show.title);

        let total = seats_to_i32(new_show.total_seats)?;
        let model = show::ActiveModel {
            id: NotSet,
            title: Set(new_show.title),
            description: Set(new_show.description),
            starts_at: Set(new_show.starts_at),
            total_seats: Set(total),
            available_seats: Set(total),
            price_per_seat: Set(new_show.price_per_seat_cents),
            created_at: Set(Utc::now()),
        };
        let inserted = model.insert(&self.db).await.map_err(db_err)?;
        Ok(model_to_domain(inserted))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Show>> {
        Ok(self.fetch(id).await?.map(model_to_domain))
    }

    async fn find_all(&self) -> DomainResult<Vec<Show>> {
        let models = show::Entity::find()
            .order_by_asc(show::Column::StartsAt)
            .order_by_asc(show::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn update_details(&self, id: i32, details: &ShowDetails) -> DomainResult<Show> {
        details.validate()?;
        let model = self
            .fetch(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Show", "id", id))?;
        if details.is_empty() {
            return Ok(model_to_domain(model));
        }
        debug!("Updating show {}", id);

        // Only `Set` columns are written, so the seat counters stay as stored
        let mut active = model.into_active_model();
        if let Some(title) = &details.title {
            active.title = Set(title.clone());
        }
        if let Some(description) = &details.description {
            active.description = Set(description.clone());
        }
        if let Some(starts_at) = details.starts_at {
            active.starts_at = Set(starts_at);
        }
        if let Some(price) = details.price_per_seat_cents {
            active.price_per_seat = Set(price);
        }
        let updated = active.update(&self.db).await.map_err(db_err)?;
        Ok(model_to_domain(updated))
    }

    async fn delete(&self, id: i32) -> DomainResult<()> {
        debug!("Deleting show {}", id);

        // DELETE FROM shows WHERE id = ?
        //  AND NOT EXISTS (SELECT id FROM bookings WHERE show_id = ?)
        let bookings_for_show = Query::select()
            .column(booking::Column::Id)
            .from(booking::Entity)
            .and_where(Expr::col((booking::Entity, booking::Column::ShowId)).eq(id))
            .to_owned();
        let result = show::Entity::delete_many()
            .filter(show::Column::Id.eq(id))
            .filter(Expr::exists(bookings_for_show).not())
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return match self.fetch(id).await? {
                None => Err(DomainError::not_found("Show", "id", id)),
                Some(_) => Err(DomainError::ShowHasBookings { show_id: id }),
            };
        }
        Ok(())
    }
}

// ── SeatInventory impl ──────────────────────────────────────────

#[async_trait]
impl SeatInventory for SeaOrmShowRepository {
    async fn get(&self, show_id: i32) -> DomainResult<Option<Show>> {
        self.find_by_id(show_id).await
    }

    async fn decrement(&self, show_id: i32, seats: u32) -> DomainResult<u32> {
        let n = seats_to_i32(seats)?;
        debug!("Decrementing show {} by {} seats", show_id, n);

        // UPDATE shows SET available_seats = available_seats - n
        //  WHERE id = ? AND available_seats >= n
        let result = show::Entity::update_many()
            .col_expr(
                show::Column::AvailableSeats,
                Expr::col(show::Column::AvailableSeats).sub(n),
            )
            .filter(show::Column::Id.eq(show_id))
            .filter(show::Column::AvailableSeats.gte(n))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return match self.fetch(show_id).await? {
                None => Err(DomainError::not_found("Show", "id", show_id)),
                Some(current) => Err(DomainError::InsufficientSeats {
                    show_id,
                    requested: seats,
                    available: current.available_seats.max(0) as u32,
                }),
            };
        }

        self.available_after_update(show_id).await
    }

    async fn increment(&self, show_id: i32, seats: u32) -> DomainResult<u32> {
        let n = seats_to_i32(seats)?;
        debug!("Incrementing show {} by {} seats", show_id, n);

        // CASE WHEN available_seats + n > total_seats THEN total_seats
        //      ELSE available_seats + n END
        let clamped = Expr::case(
            Expr::expr(Expr::col(show::Column::AvailableSeats).add(n))
                .gt(Expr::col(show::Column::TotalSeats)),
            Expr::col(show::Column::TotalSeats),
        )
        .finally(Expr::col(show::Column::AvailableSeats).add(n));

        let result = show::Entity::update_many()
            .col_expr(show::Column::AvailableSeats, clamped.into())
            .filter(show::Column::Id.eq(show_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Show", "id", show_id));
        }

        self.available_after_update(show_id).await
    }

    async fn resize(&self, show_id: i32, new_total: u32, reserved: u32) -> DomainResult<Show> {
        let total = seats_to_i32(new_total)?;
        let reserved_i32 = seats_to_i32(reserved)?;
        debug!("Resizing show {} to {} seats", show_id, total);

        // UPDATE shows SET total_seats = t,
        //                  available_seats = t - (total_seats - available_seats)
        //  WHERE id = ? AND total_seats - available_seats <= t - reserved
        let result = show::Entity::update_many()
            .col_expr(show::Column::TotalSeats, Expr::value(total))
            .col_expr(
                show::Column::AvailableSeats,
                Expr::expr(Expr::val(total).sub(Expr::col(show::Column::TotalSeats)))
                    .add(Expr::col(show::Column::AvailableSeats)),
            )
            .filter(show::Column::Id.eq(show_id))
            .filter(
                Expr::expr(
                    Expr::col(show::Column::TotalSeats).sub(Expr::col(show::Column::AvailableSeats)),
                )
                .lte(total - reserved_i32),
            )
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        let current = self
            .fetch(show_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Show", "id", show_id))?;
        let current = model_to_domain(current);
        if result.rows_affected == 0 {
            return Err(DomainError::CapacityBelowCommitted {
                show_id,
                requested: new_total,
                committed: current.sold_seats().saturating_add(reserved),
            });
        }
        Ok(current)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::test_connection;

    fn new_show(total: u32) -> NewShow {
        NewShow {
            title: "Hamlet".into(),
            description: "Act I to V".into(),
            starts_at: Utc::now(),
            total_seats: total,
            price_per_seat_cents: 2_500,
        }
    }

    #[tokio::test]
    async fn created_show_starts_fully_available() {
        let repo = SeaOrmShowRepository::new(test_connection().await);
        let show = repo.create(new_show(40)).await.unwrap();

        assert_eq!(show.total_seats, 40);
        assert_eq!(show.available_seats, 40);
        assert_eq!(repo.find_by_id(show.id).await.unwrap(), Some(show));
    }

    #[tokio::test]
    async fn create_rejects_invalid_show() {
        let repo = SeaOrmShowRepository::new(test_connection().await);
        let err = repo.create(new_show(0)).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn decrement_is_bounded_by_available_seats() {
        let repo = SeaOrmShowRepository::new(test_connection().await);
        let show = repo.create(new_show(5)).await.unwrap();

        assert_eq!(repo.decrement(show.id, 3).await.unwrap(), 2);
        let err = repo.decrement(show.id, 3).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::InsufficientSeats { requested: 3, available: 2, .. }
        ));
        assert_eq!(repo.decrement(show.id, 2).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn increment_clamps_at_total() {
        let repo = SeaOrmShowRepository::new(test_connection().await);
        let show = repo.create(new_show(5)).await.unwrap();

        repo.decrement(show.id, 2).await.unwrap();
        assert_eq!(repo.increment(show.id, 1).await.unwrap(), 4);
        assert_eq!(repo.increment(show.id, 10).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn inventory_on_missing_show_is_not_found() {
        let repo = SeaOrmShowRepository::new(test_connection().await);
        assert!(matches!(
            repo.decrement(404, 1).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            repo.increment(404, 1).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn resize_keeps_sold_seats_sold() {
        let repo = SeaOrmShowRepository::new(test_connection().await);
        let show = repo.create(new_show(10)).await.unwrap();
        repo.decrement(show.id, 4).await.unwrap();

        let grown = repo.resize(show.id, 20, 0).await.unwrap();
        assert_eq!((grown.total_seats, grown.available_seats), (20, 16));

        let shrunk = repo.resize(show.id, 6, 2).await.unwrap();
        assert_eq!((shrunk.total_seats, shrunk.available_seats), (6, 2));

        let err = repo.resize(show.id, 5, 2).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::CapacityBelowCommitted { requested: 5, committed: 6, .. }
        ));
        let unchanged = repo.find_by_id(show.id).await.unwrap().unwrap();
        assert_eq!((unchanged.total_seats, unchanged.available_seats), (6, 2));
    }

    #[tokio::test]
    async fn update_details_leaves_counters_alone() {
        let repo = SeaOrmShowRepository::new(test_connection().await);
        let show = repo.create(new_show(10)).await.unwrap();
        repo.decrement(show.id, 3).await.unwrap();

        let updated = repo
            .update_details(
                show.id,
                &ShowDetails {
                    title: Some("Macbeth".into()),
                    price_per_seat_cents: Some(3_000),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Macbeth");
        assert_eq!(updated.description, "Act I to V");
        assert_eq!(updated.price_per_seat_cents, 3_000);
        assert_eq!(updated.available_seats, 7);

        assert!(matches!(
            repo.update_details(404, &ShowDetails::default()).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn delete_removes_unbooked_show() {
        let repo = SeaOrmShowRepository::new(test_connection().await);
        let show = repo.create(new_show(10)).await.unwrap();

        repo.delete(show.id).await.unwrap();
        assert_eq!(repo.find_by_id(show.id).await.unwrap(), None);
        assert!(matches!(
            repo.delete(show.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn shows_are_listed_by_start_time() {
        let repo = SeaOrmShowRepository::new(test_connection().await);
        let mut later = new_show(10);
        later.starts_at = Utc::now() + chrono::Duration::days(2);
        let later = repo.create(later).await.unwrap();
        let sooner = repo.create(new_show(10)).await.unwrap();

        let ids: Vec<i32> = repo.find_all().await.unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![sooner.id, later.id]);
    }
}
