//! Payment outcome policies
//!
//! No real gateway is integrated; the outcome of a payment attempt is
//! decided by one of these policies, chosen through configuration.

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::application::ports::PaymentOutcomePolicy;
use crate::domain::{Booking, DomainResult, Payment, PaymentStatus};

/// Configured policy name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentOutcome {
    /// Coin flip, 50% approval
    #[default]
    Random,
    Approve,
    Decline,
}

impl PaymentOutcome {
    pub fn policy(&self) -> Box<dyn PaymentOutcomePolicy> {
        match self {
            Self::Random => Box::new(RandomOutcome::default()),
            Self::Approve => Box::new(FixedOutcome::approve()),
            Self::Decline => Box::new(FixedOutcome::decline()),
        }
    }
}

/// Approves with a fixed probability
#[derive(Debug, Clone)]
pub struct RandomOutcome {
    approval_rate: f64,
}

impl RandomOutcome {
    pub fn new(approval_rate: f64) -> Self {
        Self {
            approval_rate: approval_rate.clamp(0.0, 1.0),
        }
    }
}

impl Default for RandomOutcome {
    fn default() -> Self {
        Self::new(0.5)
    }
}

#[async_trait]
impl PaymentOutcomePolicy for RandomOutcome {
    async fn resolve(&self, _booking: &Booking, _payment: &Payment) -> DomainResult<PaymentStatus> {
        let approved = rand::thread_rng().gen_bool(self.approval_rate);
        Ok(if approved {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Failed
        })
    }
}

/// Always resolves to the same status
#[derive(Debug, Clone)]
pub struct FixedOutcome {
    status: PaymentStatus,
}

impl FixedOutcome {
    pub fn approve() -> Self {
        Self {
            status: PaymentStatus::Paid,
        }
    }

    pub fn decline() -> Self {
        Self {
            status: PaymentStatus::Failed,
        }
    }
}

#[async_trait]
impl PaymentOutcomePolicy for FixedOutcome {
    async fn resolve(&self, _booking: &Booking, _payment: &Payment) -> DomainResult<PaymentStatus> {
        Ok(self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookingStatus, NewPayment};
    use chrono::Utc;

    fn fixtures() -> (Booking, Payment) {
        let booking = Booking {
            id: 1,
            requester_id: 1,
            show_id: 1,
            seat_ids: vec!["A1".into()],
            status: BookingStatus::Pending,
            total_cost_cents: 1_000,
            created_at: Utc::now(),
        };
        let payment = NewPayment {
            booking_id: 1,
            amount_cents: 1_000,
            method: "card".into(),
        }
        .into_payment(1, Utc::now());
        (booking, payment)
    }

    #[tokio::test]
    async fn fixed_policies() {
        let (booking, payment) = fixtures();
        let paid = PaymentOutcome::Approve.policy().resolve(&booking, &payment).await;
        assert_eq!(paid.unwrap(), PaymentStatus::Paid);
        let failed = PaymentOutcome::Decline.policy().resolve(&booking, &payment).await;
        assert_eq!(failed.unwrap(), PaymentStatus::Failed);
    }

    #[tokio::test]
    async fn random_policy_honours_extreme_rates() {
        let (booking, payment) = fixtures();
        for _ in 0..20 {
            let always = RandomOutcome::new(1.0).resolve(&booking, &payment).await.unwrap();
            assert_eq!(always, PaymentStatus::Paid);
            let never = RandomOutcome::new(0.0).resolve(&booking, &payment).await.unwrap();
            assert_eq!(never, PaymentStatus::Failed);
        }
    }

    #[test]
    fn outcome_names_deserialize() {
        #[derive(Deserialize)]
        struct Section {
            outcome: PaymentOutcome,
        }
        let parsed: Section = toml::from_str("outcome = \"decline\"").unwrap();
        assert_eq!(parsed.outcome, PaymentOutcome::Decline);
    }
}
