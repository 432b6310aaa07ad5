//! Payment domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Failed => "FAILED",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "PENDING" => Self::Pending,
            "PAID" => Self::Paid,
            _ => Self::Failed,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One payment attempt for a booking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub id: i32,
    pub booking_id: i32,
    pub amount_cents: i64,
    /// Free-form method label supplied by the payer (e.g. "card")
    pub method: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub booking_id: i32,
    pub amount_cents: i64,
    pub method: String,
}

impl NewPayment {
    pub fn into_payment(self, id: i32, created_at: DateTime<Utc>) -> Payment {
        Payment {
            id,
            booking_id: self.booking_id,
            amount_cents: self.amount_cents,
            method: self.method,
            status: PaymentStatus::Pending,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_payment_starts_pending() {
        let p = NewPayment {
            booking_id: 4,
            amount_cents: 2000,
            method: "card".into(),
        }
        .into_payment(1, Utc::now());
        assert_eq!(p.status, PaymentStatus::Pending);
        assert_eq!(p.amount_cents, 2000);
    }

    #[test]
    fn unknown_status_reads_as_failed() {
        assert_eq!(PaymentStatus::from_str("PAID"), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::from_str("garbage"), PaymentStatus::Failed);
    }
}
