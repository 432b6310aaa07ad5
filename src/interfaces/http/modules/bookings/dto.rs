//! Booking DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{Booking, Notification};
use crate::interfaces::http::common::cents_to_amount;

/// Request to hold seats and open a PENDING booking
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookingRequest {
    #[validate(range(min = 1))]
    pub requester_id: i32,
    #[validate(range(min = 1))]
    pub show_id: i32,
    /// Seats to hold, acquired in the order given
    #[validate(length(min = 1, max = 50))]
    pub seat_ids: Vec<String>,
}

/// Generic status change
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBookingStatusRequest {
    /// Target status: CONFIRMED or CANCELLED
    #[validate(length(min = 1))]
    #[schema(example = "CONFIRMED")]
    pub status: String,
}

/// Booking in API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingDto {
    pub id: i32,
    pub requester_id: i32,
    pub show_id: i32,
    pub seat_ids: Vec<String>,
    /// PENDING, CONFIRMED or CANCELLED
    pub status: String,
    #[schema(value_type = String, example = "20.00")]
    pub total_cost: Decimal,
    pub created_at: String,
}

impl From<Booking> for BookingDto {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            requester_id: b.requester_id,
            show_id: b.show_id,
            status: b.status.as_str().to_string(),
            total_cost: cents_to_amount(b.total_cost_cents),
            created_at: b.created_at.to_rfc3339(),
            seat_ids: b.seat_ids,
        }
    }
}

/// One recorded delivery attempt of a booking notice
#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationDto {
    pub id: i32,
    pub booking_id: i32,
    pub subject: String,
    pub body: String,
    /// SENT or FAILED
    pub status: String,
    pub attempt: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: String,
}

impl From<Notification> for NotificationDto {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            booking_id: n.booking_id,
            status: n.status.as_str().to_string(),
            attempt: n.attempt,
            created_at: n.created_at.to_rfc3339(),
            subject: n.subject,
            body: n.body,
            error: n.error,
        }
    }
}
