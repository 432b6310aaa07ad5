//! Outbound ports: notification delivery and payment outcome resolution

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Booking, DomainResult, Payment, PaymentStatus};

/// What happened to a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Created,
    Confirmed,
    Cancelled,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A requester-facing message about one booking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingNotice {
    pub booking_id: i32,
    pub requester_id: i32,
    pub show_id: i32,
    pub seat_ids: Vec<String>,
    pub kind: NotificationKind,
}

impl BookingNotice {
    pub fn for_booking(booking: &Booking, kind: NotificationKind) -> Self {
        Self {
            booking_id: booking.id,
            requester_id: booking.requester_id,
            show_id: booking.show_id,
            seat_ids: booking.seat_ids.clone(),
            kind,
        }
    }

    pub fn subject(&self) -> String {
        format!("Booking #{} {}", self.booking_id, self.kind)
    }

    pub fn body(&self) -> String {
        let seats = self.seat_ids.join(", ");
        match self.kind {
            NotificationKind::Created => format!(
                "Seats {} for show {} are held for you. Pay before the hold expires to keep them.",
                seats, self.show_id
            ),
            NotificationKind::Confirmed => format!(
                "Your booking of seats {} for show {} is confirmed.",
                seats, self.show_id
            ),
            NotificationKind::Cancelled => format!(
                "Your booking of seats {} for show {} was cancelled and the seats released.",
                seats, self.show_id
            ),
        }
    }
}

/// Delivers booking notices to requesters.
///
/// `Ok(false)` means the channel accepted the call but declined delivery;
/// errors are retried by the dispatcher when transient.
#[async_trait]
pub trait BookingNotifier: Send + Sync {
    async fn notify(&self, notice: &BookingNotice) -> DomainResult<bool>;
}

/// Decides whether a payment attempt succeeds.
///
/// Returns `Paid` or `Failed`; any other value is treated as `Failed`.
#[async_trait]
pub trait PaymentOutcomePolicy: Send + Sync {
    async fn resolve(&self, booking: &Booking, payment: &Payment) -> DomainResult<PaymentStatus>;
}
