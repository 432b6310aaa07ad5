//! Show and seat DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::BatchOutcome;
use crate::domain::Show;
use crate::interfaces::http::common::cents_to_amount;

/// Request to schedule a show; every seat starts available
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateShowRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub starts_at: DateTime<Utc>,
    #[validate(range(min = 1, max = 100000))]
    pub total_seats: u32,
    /// Price per seat, at most two decimal places
    #[schema(value_type = String, example = "10.00")]
    pub price_per_seat: Decimal,
}

/// Partial show update; omitted fields keep their value.
///
/// `total_seats` may not drop below the sold seats plus the seats of
/// PENDING bookings. A new price only applies to later bookings.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateShowRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    #[validate(range(min = 1, max = 100000))]
    pub total_seats: Option<u32>,
    #[schema(value_type = Option<String>, example = "12.50")]
    pub price_per_seat: Option<Decimal>,
}

/// Show with its current inventory
#[derive(Debug, Serialize, ToSchema)]
pub struct ShowDto {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub total_seats: u32,
    pub available_seats: u32,
    #[schema(value_type = String, example = "10.00")]
    pub price_per_seat: Decimal,
}

impl From<Show> for ShowDto {
    fn from(s: Show) -> Self {
        Self {
            id: s.id,
            title: s.title,
            description: s.description,
            starts_at: s.starts_at,
            total_seats: s.total_seats,
            available_seats: s.available_seats,
            price_per_seat: cents_to_amount(s.price_per_seat_cents),
        }
    }
}

/// Seats of one show
#[derive(Debug, Serialize, ToSchema)]
pub struct SeatListDto {
    pub show_id: i32,
    pub seats: Vec<String>,
}

/// Batch lock or unlock on behalf of one holder
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SeatBatchRequest {
    #[validate(range(min = 1))]
    pub holder_id: i32,
    #[validate(length(min = 1, max = 50))]
    pub seat_ids: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SeatOutcomeDto {
    pub seat_id: String,
    pub succeeded: bool,
}

/// Per-seat results; nothing is rolled back when some seats fail
#[derive(Debug, Serialize, ToSchema)]
pub struct BatchOutcomeDto {
    pub all_succeeded: bool,
    pub seats: Vec<SeatOutcomeDto>,
}

impl From<BatchOutcome> for BatchOutcomeDto {
    fn from(b: BatchOutcome) -> Self {
        Self {
            all_succeeded: b.all_succeeded,
            seats: b
                .seats
                .into_iter()
                .map(|s| SeatOutcomeDto {
                    seat_id: s.seat_id,
                    succeeded: s.succeeded,
                })
                .collect(),
        }
    }
}
