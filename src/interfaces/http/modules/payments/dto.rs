//! Payment DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::ProcessedPayment;
use crate::domain::Payment;
use crate::interfaces::http::common::cents_to_amount;
use crate::interfaces::http::modules::bookings::dto::BookingDto;

/// Request to pay for a PENDING booking
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProcessPaymentRequest {
    #[validate(range(min = 1))]
    pub booking_id: i32,
    /// Free-form payment method, e.g. "card"
    #[validate(length(min = 1, max = 50))]
    pub method: String,
}

/// Payment record in API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentDto {
    pub id: i32,
    pub booking_id: i32,
    /// Amount charged, two decimal places
    #[schema(value_type = String, example = "20.00")]
    pub amount: Decimal,
    pub method: String,
    /// PENDING, PAID or FAILED
    pub status: String,
    pub created_at: String,
}

impl From<Payment> for PaymentDto {
    fn from(p: Payment) -> Self {
        Self {
            id: p.id,
            booking_id: p.booking_id,
            amount: cents_to_amount(p.amount_cents),
            method: p.method,
            status: p.status.as_str().to_string(),
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// Payment outcome together with the booking it settled
#[derive(Debug, Serialize, ToSchema)]
pub struct ProcessedPaymentDto {
    pub payment: PaymentDto,
    pub booking: BookingDto,
}

impl From<ProcessedPayment> for ProcessedPaymentDto {
    fn from(p: ProcessedPayment) -> Self {
        Self {
            payment: p.payment.into(),
            booking: p.booking.into(),
        }
    }
}
