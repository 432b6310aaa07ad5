//! SeaORM implementation of PaymentRepository

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set,
};

use super::db_err;
use crate::domain::payment::{NewPayment, Payment, PaymentRepository, PaymentStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::payment;

pub struct SeaOrmPaymentRepository {
    db: DatabaseConnection,
}

impl SeaOrmPaymentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: payment::Model) -> Payment {
    Payment {
        id: m.id,
        booking_id: m.booking_id,
        amount_cents: m.amount,
        method: m.method,
        status: PaymentStatus::from_str(&m.status),
        created_at: m.created_at,
    }
}

#[async_trait]
impl PaymentRepository for SeaOrmPaymentRepository {
    async fn create(&self, p: NewPayment) -> DomainResult<Payment> {
        debug!("Recording payment attempt for booking {}", p.booking_id);

        let now = Utc::now();
        let model = payment::ActiveModel {
            id: NotSet,
            booking_id: Set(p.booking_id),
            amount: Set(p.amount_cents),
            method: Set(p.method),
            status: Set(PaymentStatus::Pending.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let inserted = model.insert(&self.db).await.map_err(db_err)?;
        Ok(model_to_domain(inserted))
    }

    async fn update_status(&self, id: i32, status: PaymentStatus) -> DomainResult<()> {
        debug!("Updating payment {} status to {}", id, status);

        let existing = payment::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Payment", "id", id))?;

        let mut model: payment::ActiveModel = existing.into();
        model.status = Set(status.as_str().to_string());
        model.updated_at = Set(Utc::now());
        model.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Payment>> {
        let model = payment::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_booking(&self, booking_id: i32) -> DomainResult<Vec<Payment>> {
        let models = payment::Entity::find()
            .filter(payment::Column::BookingId.eq(booking_id))
            .order_by_asc(payment::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewBooking, NewShow, RepositoryProvider, Requester};
    use crate::infrastructure::database::repositories::SeaOrmRepositoryProvider;
    use crate::infrastructure::database::test_connection;

    async fn booking_fixture() -> (SeaOrmRepositoryProvider, i32) {
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
                price_per_seat_cents: 1_000,
            })
            .await
            .unwrap();
        let booking = repos
            .bookings()
            .create(NewBooking::pending(1, show.id, vec!["A1".into()], 1_000).unwrap())
            .await
            .unwrap();
        (repos, booking.id)
    }

    #[tokio::test]
    async fn payment_starts_pending_and_updates() {
        let (repos, booking_id) = booking_fixture().await;
        let payment = repos
            .payments()
            .create(NewPayment {
                booking_id,
                amount_cents: 1_000,
                method: "card".into(),
            })
            .await
            .unwrap();
        assert_eq!(payment.status, PaymentStatus::Pending);

        repos
            .payments()
            .update_status(payment.id, PaymentStatus::Failed)
            .await
            .unwrap();
        let stored = repos.payments().find_by_id(payment.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Failed);
        assert_eq!(stored.method, "card");
    }

    #[tokio::test]
    async fn update_of_missing_payment_is_not_found() {
        let (repos, _) = booking_fixture().await;
        let err = repos
            .payments()
            .update_status(99, PaymentStatus::Paid)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn attempts_are_listed_oldest_first() {
        let (repos, booking_id) = booking_fixture().await;
        for method in ["card", "wallet"] {
            repos
                .payments()
                .create(NewPayment {
                    booking_id,
                    amount_cents: 1_000,
                    method: method.into(),
                })
                .await
                .unwrap();
        }

        let methods: Vec<String> = repos
            .payments()
            .find_by_booking(booking_id)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.method)
            .collect();
        assert_eq!(methods, vec!["card", "wallet"]);
    }
}
