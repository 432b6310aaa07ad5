//! Booking HTTP handlers

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Response;

use crate::application::{BookingOrchestrator, PaymentCoordinator};
use crate::domain::BookingStatus;
use crate::interfaces::http::common::{
    bad_request, created, domain_error, ok, ApiError, ApiResponse, ApiResult, ValidJson,
};
use crate::interfaces::http::modules::payments::dto::PaymentDto;

use super::dto::*;

/// Application state for booking handlers
#[derive(Clone)]
pub struct BookingAppState {
    pub orchestrator: Arc<BookingOrchestrator>,
    pub payments: Arc<PaymentCoordinator>,
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "Bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Seats held, booking PENDING", body = ApiResponse<BookingDto>),
        (status = 404, description = "Requester or show not found"),
        (status = 409, description = "A seat is held or the show lacks capacity"),
        (status = 400, description = "Invalid request body")
    )
)]
pub async fn create_booking(
    State(state): State<BookingAppState>,
    ValidJson(request): ValidJson<CreateBookingRequest>,
) -> Result<Response, ApiError> {
    let booking = state
        .orchestrator
        .create_booking(request.requester_id, request.show_id, request.seat_ids)
        .await
        .map_err(domain_error)?;

    Ok(created(BookingDto::from(booking)))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    tag = "Bookings",
    responses(
        (status = 200, description = "All bookings, newest first", body = ApiResponse<Vec<BookingDto>>)
    )
)]
pub async fn list_bookings(State(state): State<BookingAppState>) -> ApiResult<Vec<BookingDto>> {
    let bookings = state
        .orchestrator
        .list_bookings()
        .await
        .map_err(domain_error)?;
    ok(bookings.into_iter().map(BookingDto::from).collect())
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/{booking_id}",
    tag = "Bookings",
    params(("booking_id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking details", body = ApiResponse<BookingDto>),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn get_booking(
    State(state): State<BookingAppState>,
    Path(booking_id): Path<i32>,
) -> ApiResult<BookingDto> {
    let booking = state
        .orchestrator
        .get_booking(booking_id)
        .await
        .map_err(domain_error)?;
    ok(booking.into())
}

#[utoipa::path(
    put,
    path = "/api/v1/bookings/{booking_id}/status",
    tag = "Bookings",
    params(("booking_id" = i32, Path, description = "Booking ID")),
    request_body = UpdateBookingStatusRequest,
    responses(
        (status = 200, description = "Booking moved to the requested status", body = ApiResponse<BookingDto>),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Booking is not PENDING or inventory refused the change"),
        (status = 500, description = "Status written but inventory out of sync")
    )
)]
pub async fn update_booking_status(
    State(state): State<BookingAppState>,
    Path(booking_id): Path<i32>,
    ValidJson(request): ValidJson<UpdateBookingStatusRequest>,
) -> ApiResult<BookingDto> {
    let target = BookingStatus::parse(&request.status)
        .ok_or_else(|| bad_request(format!("Unknown booking status '{}'", request.status)))?;

    let booking = state
        .orchestrator
        .transition(booking_id, target)
        .await
        .map_err(domain_error)?;
    ok(booking.into())
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{booking_id}/confirm",
    tag = "Bookings",
    params(("booking_id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking CONFIRMED, seats removed from inventory", body = ApiResponse<BookingDto>),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Booking is not PENDING"),
        (status = 500, description = "Status written but inventory out of sync")
    )
)]
pub async fn confirm_booking(
    State(state): State<BookingAppState>,
    Path(booking_id): Path<i32>,
) -> ApiResult<BookingDto> {
    let booking = state
        .orchestrator
        .confirm_booking(booking_id)
        .await
        .map_err(domain_error)?;
    ok(booking.into())
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{booking_id}/cancel",
    tag = "Bookings",
    params(("booking_id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking CANCELLED, seats returned", body = ApiResponse<BookingDto>),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Booking is not PENDING")
    )
)]
pub async fn cancel_booking(
    State(state): State<BookingAppState>,
    Path(booking_id): Path<i32>,
) -> ApiResult<BookingDto> {
    let booking = state
        .orchestrator
        .cancel_booking(booking_id)
        .await
        .map_err(domain_error)?;
    ok(booking.into())
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/{booking_id}/payments",
    tag = "Bookings",
    params(("booking_id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Payment attempts, oldest first", body = ApiResponse<Vec<PaymentDto>>),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn list_booking_payments(
    State(state): State<BookingAppState>,
    Path(booking_id): Path<i32>,
) -> ApiResult<Vec<PaymentDto>> {
    let payments = state
        .payments
        .payments_for_booking(booking_id)
        .await
        .map_err(domain_error)?;
    ok(payments.into_iter().map(PaymentDto::from).collect())
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/{booking_id}/notifications",
    tag = "Bookings",
    params(("booking_id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Notification attempts, oldest first", body = ApiResponse<Vec<NotificationDto>>),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn list_booking_notifications(
    State(state): State<BookingAppState>,
    Path(booking_id): Path<i32>,
) -> ApiResult<Vec<NotificationDto>> {
    let notifications = state
        .orchestrator
        .notifications_for(booking_id)
        .await
        .map_err(domain_error)?;
    ok(notifications.into_iter().map(NotificationDto::from).collect())
}
