//! Booking domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// Seats are held, payment outstanding
    Pending,
    /// Paid (or confirmed directly); seats removed from inventory
    Confirmed,
    /// Terminal; seats returned to inventory
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "CONFIRMED" => Some(Self::Confirmed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Cancelled)
    }

    /// Only `PENDING` has outgoing edges, and only to a terminal state.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        *self == Self::Pending && next.is_terminal()
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A seat booking for one show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: i32,
    pub requester_id: i32,
    pub show_id: i32,
    /// Seat identifiers in the order the requester listed them
    pub seat_ids: Vec<String>,
    pub status: BookingStatus,
    /// Seat count × price per seat at creation time, in cents
    pub total_cost_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn seat_count(&self) -> u32 {
        self.seat_ids.len() as u32
    }

    pub fn is_pending(&self) -> bool {
        self.status == BookingStatus::Pending
    }
}

/// Booking data before the store assigns an id
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub requester_id: i32,
    pub show_id: i32,
    pub seat_ids: Vec<String>,
    pub total_cost_cents: i64,
}

impl NewBooking {
    /// A provisional booking priced at `price_per_seat_cents` per seat.
    ///
    /// Fails with `Validation` when the total does not fit in `i64` cents.
    pub fn pending(
        requester_id: i32,
        show_id: i32,
        seat_ids: Vec<String>,
        price_per_seat_cents: i64,
    ) -> DomainResult<Self> {
        let total_cost_cents = i64::try_from(seat_ids.len())
            .ok()
            .and_then(|count| count.checked_mul(price_per_seat_cents))
            .ok_or_else(|| {
                DomainError::Validation(format!(
                    "total cost of {} seats at {} cents overflows",
                    seat_ids.len(),
                    price_per_seat_cents
                ))
            })?;
        Ok(Self {
            requester_id,
            show_id,
            seat_ids,
            total_cost_cents,
        })
    }

    pub fn into_booking(self, id: i32, created_at: DateTime<Utc>) -> Booking {
        Booking {
            id,
            requester_id: self.requester_id,
            show_id: self.show_id,
            seat_ids: self.seat_ids,
            status: BookingStatus::Pending,
            total_cost_cents: self.total_cost_cents,
            created_at,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
