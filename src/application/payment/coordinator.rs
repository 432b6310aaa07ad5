//! Payment coordinator
//!
//! Records a payment attempt, resolves its outcome and drives the booking
//! to the matching terminal status.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::application::booking::BookingOrchestrator;
use crate::application::ports::PaymentOutcomePolicy;
use crate::domain::{
    Booking, BookingStatus, DomainError, DomainResult, NewPayment, Payment, PaymentStatus,
    RepositoryProvider,
};

/// Payment attempt together with the booking it settled
#[derive(Debug, Clone)]
pub struct ProcessedPayment {
    pub payment: Payment,
    pub booking: Booking,
}

pub struct PaymentCoordinator {
    repos: Arc<dyn RepositoryProvider>,
    bookings: Arc<BookingOrchestrator>,
    policy: Arc<dyn PaymentOutcomePolicy>,
}

impl PaymentCoordinator {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        bookings: Arc<BookingOrchestrator>,
        policy: Arc<dyn PaymentOutcomePolicy>,
    ) -> Self {
        Self {
            repos,
            bookings,
            policy,
        }
    }

    /// Pay for a PENDING booking.
    ///
    /// A paid attempt confirms the booking, a failed one cancels it. Once the
    /// payment row holds its final status, any error moving the booking is
    /// reported as `PaymentReconciliationFailed`.
    pub async fn process_payment(&self, booking_id: i32, method: &str) -> DomainResult<ProcessedPayment> {
        let method = method.trim();
        if method.is_empty() {
            return Err(DomainError::Validation("payment method is required".into()));
        }

        let booking = self.bookings.get_booking(booking_id).await?;
        if !booking.is_pending() {
            return Err(DomainError::InvalidTransition {
                booking_id,
                from: booking.status.to_string(),
                to: BookingStatus::Confirmed.to_string(),
            });
        }

        let mut payment = self
            .repos
            .payments()
            .create(NewPayment {
                booking_id,
                amount_cents: booking.total_cost_cents,
                method: method.to_string(),
            })
            .await?;

        let status = match self.policy.resolve(&booking, &payment).await {
            Ok(PaymentStatus::Paid) => PaymentStatus::Paid,
            Ok(_) => PaymentStatus::Failed,
            Err(e) => {
                warn!(payment_id = payment.id, booking_id, error = %e, "Payment outcome could not be resolved, failing payment");
                PaymentStatus::Failed
            }
        };

        self.repos.payments().update_status(payment.id, status).await?;
        payment.status = status;
        metrics::counter!("payments_processed_total", "status" => status.as_str()).increment(1);

        let target = match status {
            PaymentStatus::Paid => BookingStatus::Confirmed,
            _ => BookingStatus::Cancelled,
        };
        let booking = match self.bookings.transition(booking_id, target).await {
            Ok(booking) => booking,
            Err(e) => {
                error!(
                    payment_id = payment.id,
                    booking_id,
                    payment_status = %status,
                    error = %e,
                    "Payment resolved but booking was not updated"
                );
                return Err(DomainError::PaymentReconciliationFailed {
                    payment_id: payment.id,
                    booking_id,
                    source: Box::new(e),
                });
            }
        };

        info!(
            payment_id = payment.id,
            booking_id,
            amount_cents = payment.amount_cents,
            status = %status,
            "Payment processed"
        );
        Ok(ProcessedPayment { payment, booking })
    }

    pub async fn payment(&self, payment_id: i32) -> DomainResult<Payment> {
        self.repos
            .payments()
            .find_by_id(payment_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Payment", "id", payment_id))
    }

    /// Every attempt for a booking, oldest first
    pub async fn payments_for_booking(&self, booking_id: i32) -> DomainResult<Vec<Payment>> {
        self.bookings.get_booking(booking_id).await?;
        self.repos.payments().find_by_booking(booking_id).await
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::booking::BookingSettings;
    use crate::application::payment::FixedOutcome;
    use crate::domain::{NewBooking, Show};
    use crate::infrastructure::lock::InMemorySeatLockStore;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use crate::notifications::{
        create_event_bus, DispatcherSettings, EventBusNotifier, NotificationDispatcher,
    };
    use crate::shared::shutdown::ShutdownSignal;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::time::Duration;

    struct Broken;

    #[async_trait]
    impl PaymentOutcomePolicy for Broken {
        async fn resolve(&self, _b: &Booking, _p: &Payment) -> DomainResult<PaymentStatus> {
            Err(DomainError::Unavailable("gateway timeout".into()))
        }
    }

    fn setup(
        policy: Arc<dyn PaymentOutcomePolicy>,
        available: u32,
    ) -> (PaymentCoordinator, Arc<InMemoryRepositoryProvider>) {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        repos.insert_requester(1);
        repos.insert_show(Show {
            id: 1,
            title: "Hamlet".into(),
            description: String::new(),
            starts_at: Utc::now(),
            total_seats: 2,
            available_seats: available,
            price_per_seat_cents: 1_000,
        });

        let notifier = Arc::new(EventBusNotifier::new(create_event_bus()));
        let (dispatcher, _worker) = NotificationDispatcher::start(
            notifier,
            repos.clone(),
            DispatcherSettings::default(),
            ShutdownSignal::new(),
        );
        let orchestrator = Arc::new(BookingOrchestrator::new(
            repos.clone(),
            Arc::new(InMemorySeatLockStore::new(Duration::from_secs(120))),
            dispatcher,
            BookingSettings::default(),
        ));
        (
            PaymentCoordinator::new(repos.clone(), orchestrator, policy),
            repos,
        )
    }

    async fn pending_booking(repos: &InMemoryRepositoryProvider) -> Booking {
        repos
            .bookings()
            .create(NewBooking::pending(1, 1, vec!["A1".into(), "A2".into()], 1_000).unwrap())
            .await
            .unwrap()
    }

    async fn available(repos: &InMemoryRepositoryProvider) -> u32 {
        repos.inventory().get(1).await.unwrap().unwrap().available_seats
    }

    #[tokio::test]
    async fn approved_payment_confirms_booking() {
        let (coordinator, repos) = setup(Arc::new(FixedOutcome::approve()), 2);
        let booking = pending_booking(&repos).await;

        let processed = coordinator.process_payment(booking.id, "card").await.unwrap();
        assert_eq!(processed.payment.status, PaymentStatus::Paid);
        assert_eq!(processed.payment.amount_cents, 2_000);
        assert_eq!(processed.booking.status, BookingStatus::Confirmed);
        assert_eq!(available(&repos).await, 0);

        let stored = coordinator.payment(processed.payment.id).await.unwrap();
        assert_eq!(stored.status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn declined_payment_cancels_booking_and_returns_seats() {
        let (coordinator, repos) = setup(Arc::new(FixedOutcome::decline()), 0);
        let booking = pending_booking(&repos).await;

        let processed = coordinator.process_payment(booking.id, "card").await.unwrap();
        assert_eq!(processed.payment.status, PaymentStatus::Failed);
        assert_eq!(processed.booking.status, BookingStatus::Cancelled);
        assert_eq!(available(&repos).await, 2);
    }

    #[tokio::test]
    async fn policy_error_fails_the_payment() {
        let (coordinator, repos) = setup(Arc::new(Broken), 2);
        let booking = pending_booking(&repos).await;

        let processed = coordinator.process_payment(booking.id, "card").await.unwrap();
        assert_eq!(processed.payment.status, PaymentStatus::Failed);
        assert_eq!(processed.booking.status, BookingStatus::Cancelled);
    }

    #[tokio::test]
    async fn settled_booking_is_rejected_before_recording_payment() {
        let (coordinator, repos) = setup(Arc::new(FixedOutcome::approve()), 2);
        let booking = pending_booking(&repos).await;
        coordinator.process_payment(booking.id, "card").await.unwrap();

        let err = coordinator.process_payment(booking.id, "card").await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
        assert_eq!(coordinator.payments_for_booking(booking.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn inventory_failure_after_payment_is_a_reconciliation_error() {
        // booking is pending but inventory is already exhausted
        let (coordinator, repos) = setup(Arc::new(FixedOutcome::approve()), 0);
        let booking = pending_booking(&repos).await;

        let err = coordinator.process_payment(booking.id, "card").await.unwrap_err();
        let DomainError::PaymentReconciliationFailed {
            payment_id,
            booking_id,
            source,
        } = err
        else {
            panic!("expected reconciliation error");
        };
        assert_eq!(booking_id, booking.id);
        assert!(matches!(*source, DomainError::InventoryOutOfSync { .. }));

        let payment = coordinator.payment(payment_id).await.unwrap();
        assert_eq!(payment.status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn missing_booking_and_method_are_rejected() {
        let (coordinator, repos) = setup(Arc::new(FixedOutcome::approve()), 2);
        assert!(matches!(
            coordinator.process_payment(99, "card").await,
            Err(DomainError::NotFound { entity: "Booking", .. })
        ));

        let booking = pending_booking(&repos).await;
        assert!(matches!(
            coordinator.process_payment(booking.id, "  ").await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            coordinator.payment(12).await,
            Err(DomainError::NotFound { entity: "Payment", .. })
        ));
    }
}
