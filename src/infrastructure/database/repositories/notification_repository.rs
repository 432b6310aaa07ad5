//! SeaORM implementation of NotificationRepository

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set,
};

use super::db_err;
use crate::domain::notification::{
    NewNotification, Notification, NotificationRepository, NotificationStatus,
};
use crate::domain::DomainResult;
use crate::infrastructure::database::entities::notification;

pub struct SeaOrmNotificationRepository {
    db: DatabaseConnection,
}

impl SeaOrmNotificationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: notification::Model) -> Notification {
    Notification {
        id: m.id,
        booking_id: m.booking_id,
        requester_id: m.requester_id,
        subject: m.subject,
        body: m.body,
        status: NotificationStatus::from_str(&m.status),
        attempt: m.attempt.max(1) as u32,
        error: m.error,
        created_at: m.created_at,
    }
}

#[async_trait]
impl NotificationRepository for SeaOrmNotificationRepository {
    async fn create(&self, n: NewNotification) -> DomainResult<Notification> {
        debug!(
            "Recording {} notification for booking {} (attempt {})",
            n.status, n.booking_id, n.attempt
        );

        let model = notification::ActiveModel {
            id: NotSet,
            booking_id: Set(n.booking_id),
            requester_id: Set(n.requester_id),
            subject: Set(n.subject),
            body: Set(n.body),
            status: Set(n.status.as_str().to_string()),
            attempt: Set(i32::try_from(n.attempt).unwrap_or(i32::MAX)),
            error: Set(n.error),
            created_at: Set(Utc::now()),
        };
        let inserted = model.insert(&self.db).await.map_err(db_err)?;
        Ok(model_to_domain(inserted))
    }

    async fn find_by_booking(&self, booking_id: i32) -> DomainResult<Vec<Notification>> {
        let models = notification::Entity::find()
            .filter(notification::Column::BookingId.eq(booking_id))
            .order_by_asc(notification::Column::Id)
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
                id: 3,
                email: "grace@example.com".into(),
                display_name: "Grace".into(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        let show = repos
            .shows()
            .create(NewShow {
                title: "Tosca".into(),
                description: String::new(),
                starts_at: Utc::now(),
                total_seats: 4,
                price_per_seat_cents: 4_000,
            })
            .await
            .unwrap();
        let booking = repos
            .bookings()
            .create(NewBooking::pending(3, show.id, vec!["D4".into()], 4_000).unwrap())
            .await
            .unwrap();
        (repos, booking.id)
    }

    fn attempt(booking_id: i32, attempt: u32, error: Option<&str>) -> NewNotification {
        NewNotification {
            booking_id,
            requester_id: 3,
            subject: format!("Booking #{} created", booking_id),
            body: "Seats D4 are held".into(),
            status: if error.is_some() {
                NotificationStatus::Failed
            } else {
                NotificationStatus::Sent
            },
            attempt,
            error: error.map(String::from),
        }
    }

    #[tokio::test]
    async fn attempts_are_listed_in_order_per_booking() {
        let (repos, booking_id) = booking_fixture().await;
        repos
            .notifications()
            .create(attempt(booking_id, 1, Some("timed out")))
            .await
            .unwrap();
        repos
            .notifications()
            .create(attempt(booking_id, 2, None))
            .await
            .unwrap();

        let log = repos.notifications().find_by_booking(booking_id).await.unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].status, NotificationStatus::Failed);
        assert_eq!(log[0].error.as_deref(), Some("timed out"));
        assert_eq!((log[1].attempt, log[1].status), (2, NotificationStatus::Sent));
        assert_eq!(log[1].error, None);

        assert!(repos.notifications().find_by_booking(booking_id + 1).await.unwrap().is_empty());
    }
}
