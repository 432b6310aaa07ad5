//! Payment HTTP handlers

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Response;

use crate::application::PaymentCoordinator;
use crate::interfaces::http::common::{created, domain_error, ok, ApiError, ApiResponse, ApiResult, ValidJson};

use super::dto::*;

#[derive(Clone)]
pub struct PaymentAppState {
    pub coordinator: Arc<PaymentCoordinator>,
}

#[utoipa::path(
    post,
    path = "/api/v1/payments",
    tag = "Payments",
    request_body = ProcessPaymentRequest,
    responses(
        (status = 201, description = "Payment processed; booking confirmed or cancelled", body = ApiResponse<ProcessedPaymentDto>),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Booking is not PENDING"),
        (status = 400, description = "Invalid request body"),
        (status = 500, description = "Payment recorded but booking could not be reconciled")
    )
)]
pub async fn process_payment(
    State(state): State<PaymentAppState>,
    ValidJson(request): ValidJson<ProcessPaymentRequest>,
) -> Result<Response, ApiError> {
    let processed = state
        .coordinator
        .process_payment(request.booking_id, &request.method)
        .await
        .map_err(domain_error)?;

    Ok(created(ProcessedPaymentDto::from(processed)))
}

#[utoipa::path(
    get,
    path = "/api/v1/payments/{payment_id}",
    tag = "Payments",
    params(("payment_id" = i32, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment details", body = ApiResponse<PaymentDto>),
        (status = 404, description = "Payment not found")
    )
)]
pub async fn get_payment(
    State(state): State<PaymentAppState>,
    Path(payment_id): Path<i32>,
) -> ApiResult<PaymentDto> {
    let payment = state
        .coordinator
        .payment(payment_id)
        .await
        .map_err(domain_error)?;
    ok(payment.into())
}
