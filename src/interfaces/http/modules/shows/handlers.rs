//! Show and seat HTTP handlers

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Response;

use rust_decimal::Decimal;

use crate::application::{BookingOrchestrator, ShowCatalog};
use crate::domain::{NewShow, ShowDetails};
use crate::interfaces::http::common::{
    amount_to_cents, bad_request, created, domain_error, ok, ApiError, ApiResponse, ApiResult,
    ValidJson,
};

use super::dto::*;

/// Application state for show handlers
#[derive(Clone)]
pub struct ShowAppState {
    pub catalog: Arc<ShowCatalog>,
    pub orchestrator: Arc<BookingOrchestrator>,
}

fn price_to_cents(price: Decimal) -> Result<i64, ApiError> {
    amount_to_cents(price)
        .filter(|cents| *cents >= 0)
        .ok_or_else(|| bad_request("price_per_seat must be a non-negative amount with at most two decimals"))
}

#[utoipa::path(
    post,
    path = "/api/v1/shows",
    tag = "Shows",
    request_body = CreateShowRequest,
    responses(
        (status = 201, description = "Show created", body = ApiResponse<ShowDto>),
        (status = 400, description = "Invalid request body or price")
    )
)]
pub async fn create_show(
    State(state): State<ShowAppState>,
    ValidJson(request): ValidJson<CreateShowRequest>,
) -> Result<Response, ApiError> {
    let price_per_seat_cents = price_to_cents(request.price_per_seat)?;

    let show = state
        .catalog
        .create_show(NewShow {
            title: request.title,
            description: request.description,
            starts_at: request.starts_at,
            total_seats: request.total_seats,
            price_per_seat_cents,
        })
        .await
        .map_err(domain_error)?;

    Ok(created(ShowDto::from(show)))
}

#[utoipa::path(
    get,
    path = "/api/v1/shows",
    tag = "Shows",
    responses(
        (status = 200, description = "All shows", body = ApiResponse<Vec<ShowDto>>)
    )
)]
pub async fn list_shows(State(state): State<ShowAppState>) -> ApiResult<Vec<ShowDto>> {
    let shows = state.catalog.list_shows().await.map_err(domain_error)?;
    ok(shows.into_iter().map(ShowDto::from).collect())
}

#[utoipa::path(
    get,
    path = "/api/v1/shows/{show_id}",
    tag = "Shows",
    params(("show_id" = i32, Path, description = "Show ID")),
    responses(
        (status = 200, description = "Show with current inventory", body = ApiResponse<ShowDto>),
        (status = 404, description = "Show not found")
    )
)]
pub async fn get_show(
    State(state): State<ShowAppState>,
    Path(show_id): Path<i32>,
) -> ApiResult<ShowDto> {
    let show = state.catalog.get_show(show_id).await.map_err(domain_error)?;
    ok(show.into())
}

#[utoipa::path(
    put,
    path = "/api/v1/shows/{show_id}",
    tag = "Shows",
    params(("show_id" = i32, Path, description = "Show ID")),
    request_body = UpdateShowRequest,
    responses(
        (status = 200, description = "Show updated", body = ApiResponse<ShowDto>),
        (status = 400, description = "Invalid request body or price"),
        (status = 404, description = "Show not found"),
        (status = 409, description = "Total below sold and pending seats")
    )
)]
pub async fn update_show(
    State(state): State<ShowAppState>,
    Path(show_id): Path<i32>,
    ValidJson(request): ValidJson<UpdateShowRequest>,
) -> ApiResult<ShowDto> {
    let price_per_seat_cents = request.price_per_seat.map(price_to_cents).transpose()?;
    let details = ShowDetails {
        title: request.title,
        description: request.description,
        starts_at: request.starts_at,
        price_per_seat_cents,
    };

    let show = state
        .catalog
        .update_show(show_id, details, request.total_seats)
        .await
        .map_err(domain_error)?;
    ok(show.into())
}

#[utoipa::path(
    delete,
    path = "/api/v1/shows/{show_id}",
    tag = "Shows",
    params(("show_id" = i32, Path, description = "Show ID")),
    responses(
        (status = 200, description = "Show deleted"),
        (status = 404, description = "Show not found"),
        (status = 409, description = "Show has bookings")
    )
)]
pub async fn delete_show(
    State(state): State<ShowAppState>,
    Path(show_id): Path<i32>,
) -> ApiResult<()> {
    state.catalog.delete_show(show_id).await.map_err(domain_error)?;
    ok(())
}

#[utoipa::path(
    get,
    path = "/api/v1/shows/{show_id}/seats/booked",
    tag = "Seats",
    params(("show_id" = i32, Path, description = "Show ID")),
    responses(
        (status = 200, description = "Seats of CONFIRMED bookings", body = ApiResponse<SeatListDto>),
        (status = 404, description = "Show not found")
    )
)]
pub async fn booked_seats(
    State(state): State<ShowAppState>,
    Path(show_id): Path<i32>,
) -> ApiResult<SeatListDto> {
    let seats = state
        .orchestrator
        .booked_seats(show_id)
        .await
        .map_err(domain_error)?;
    ok(SeatListDto { show_id, seats })
}

#[utoipa::path(
    get,
    path = "/api/v1/shows/{show_id}/seats/locked",
    tag = "Seats",
    params(("show_id" = i32, Path, description = "Show ID")),
    responses(
        (status = 200, description = "Seats currently held", body = ApiResponse<SeatListDto>),
        (status = 404, description = "Show not found"),
        (status = 503, description = "Lock store unreachable")
    )
)]
pub async fn locked_seats(
    State(state): State<ShowAppState>,
    Path(show_id): Path<i32>,
) -> ApiResult<SeatListDto> {
    let seats = state
        .orchestrator
        .held_seats(show_id)
        .await
        .map_err(domain_error)?;
    ok(SeatListDto {
        show_id,
        seats: seats.into_iter().collect(),
    })
}

#[utoipa::path(
    post,
    path = "/api/v1/shows/{show_id}/seats/lock",
    tag = "Seats",
    params(("show_id" = i32, Path, description = "Show ID")),
    request_body = SeatBatchRequest,
    responses(
        (status = 200, description = "Per-seat lock results", body = ApiResponse<BatchOutcomeDto>),
        (status = 404, description = "Show not found")
    )
)]
pub async fn lock_seats(
    State(state): State<ShowAppState>,
    Path(show_id): Path<i32>,
    ValidJson(request): ValidJson<SeatBatchRequest>,
) -> ApiResult<BatchOutcomeDto> {
    let outcome = state
        .orchestrator
        .lock_seats(show_id, &request.seat_ids, request.holder_id)
        .await
        .map_err(domain_error)?;
    ok(outcome.into())
}

#[utoipa::path(
    post,
    path = "/api/v1/shows/{show_id}/seats/unlock",
    tag = "Seats",
    params(("show_id" = i32, Path, description = "Show ID")),
    request_body = SeatBatchRequest,
    responses(
        (status = 200, description = "Per-seat unlock results", body = ApiResponse<BatchOutcomeDto>),
        (status = 404, description = "Show not found")
    )
)]
pub async fn unlock_seats(
    State(state): State<ShowAppState>,
    Path(show_id): Path<i32>,
    ValidJson(request): ValidJson<SeatBatchRequest>,
) -> ApiResult<BatchOutcomeDto> {
    let outcome = state
        .orchestrator
        .unlock_seats(show_id, &request.seat_ids, request.holder_id)
        .await
        .map_err(domain_error)?;
    ok(outcome.into())
}
