//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{BookingOrchestrator, PaymentCoordinator, ShowCatalog};
use crate::domain::SeatLockStore;
use crate::interfaces::http::common::ApiResponse;
use crate::interfaces::http::modules::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use crate::interfaces::http::modules::request_id::request_id_middleware;
use crate::interfaces::http::modules::{bookings, health, payments, shows};

/// Everything the HTTP layer needs; each handler extracts its own slice via `FromRef`.
#[derive(Clone)]
pub struct ApiState {
    pub catalog: Arc<ShowCatalog>,
    pub locks: Arc<dyn SeatLockStore>,
    pub orchestrator: Arc<BookingOrchestrator>,
    pub payments: Arc<PaymentCoordinator>,
    pub db: DatabaseConnection,
    pub started_at: Arc<Instant>,
}

impl FromRef<ApiState> for bookings::BookingAppState {
    fn from_ref(s: &ApiState) -> Self {
        bookings::BookingAppState {
            orchestrator: Arc::clone(&s.orchestrator),
            payments: Arc::clone(&s.payments),
        }
    }
}

impl FromRef<ApiState> for shows::ShowAppState {
    fn from_ref(s: &ApiState) -> Self {
        shows::ShowAppState {
            catalog: Arc::clone(&s.catalog),
            orchestrator: Arc::clone(&s.orchestrator),
        }
    }
}

impl FromRef<ApiState> for payments::PaymentAppState {
    fn from_ref(s: &ApiState) -> Self {
        payments::PaymentAppState {
            coordinator: Arc::clone(&s.payments),
        }
    }
}

impl FromRef<ApiState> for health::HealthState {
    fn from_ref(s: &ApiState) -> Self {
        health::HealthState {
            db: s.db.clone(),
            locks: Arc::clone(&s.locks),
            started_at: Arc::clone(&s.started_at),
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Bookings
        bookings::create_booking,
        bookings::list_bookings,
        bookings::get_booking,
        bookings::update_booking_status,
        bookings::confirm_booking,
        bookings::cancel_booking,
        bookings::list_booking_payments,
        bookings::list_booking_notifications,
        // Shows
        shows::create_show,
        shows::list_shows,
        shows::get_show,
        shows::update_show,
        shows::delete_show,
        // Seats
        shows::booked_seats,
        shows::locked_seats,
        shows::lock_seats,
        shows::unlock_seats,
        // Payments
        payments::process_payment,
        payments::get_payment,
    ),
    components(
        schemas(
            ApiResponse<String>,
            health::HealthResponse,
            health::ComponentHealth,
            bookings::CreateBookingRequest,
            bookings::UpdateBookingStatusRequest,
            bookings::BookingDto,
            bookings::NotificationDto,
            shows::CreateShowRequest,
            shows::UpdateShowRequest,
            shows::ShowDto,
            shows::SeatListDto,
            shows::SeatBatchRequest,
            shows::SeatOutcomeDto,
            shows::BatchOutcomeDto,
            payments::ProcessPaymentRequest,
            payments::PaymentDto,
            payments::ProcessedPaymentDto,
        )
    ),
    tags(
        (name = "Health", description = "Database and lock store health"),
        (name = "Bookings", description = "Booking saga: hold seats, confirm, cancel"),
        (name = "Shows", description = "Scheduled shows and their seat inventory"),
        (name = "Seats", description = "Booked and held seats, batch seat locks"),
        (name = "Payments", description = "Pay for a PENDING booking"),
    ),
    info(
        title = "Seat Booking API",
        version = "1.0.0",
        description = "REST API for reserving show seats with short-lived locks",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes.
///
/// `metrics` mounts `GET /metrics` when a Prometheus recorder is installed.
pub fn create_api_router(state: ApiState, metrics: Option<PrometheusHandle>) -> Router {
    let booking_routes = Router::new()
        .route(
            "/",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route("/{booking_id}", get(bookings::get_booking))
        .route("/{booking_id}/status", put(bookings::update_booking_status))
        .route("/{booking_id}/confirm", post(bookings::confirm_booking))
        .route("/{booking_id}/cancel", post(bookings::cancel_booking))
        .route(
            "/{booking_id}/payments",
            get(bookings::list_booking_payments),
        )
        .route(
            "/{booking_id}/notifications",
            get(bookings::list_booking_notifications),
        );

    let show_routes = Router::new()
        .route("/", get(shows::list_shows).post(shows::create_show))
        .route(
            "/{show_id}",
            get(shows::get_show)
                .put(shows::update_show)
                .delete(shows::delete_show),
        )
        .route("/{show_id}/seats/booked", get(shows::booked_seats))
        .route("/{show_id}/seats/locked", get(shows::locked_seats))
        .route("/{show_id}/seats/lock", post(shows::lock_seats))
        .route("/{show_id}/seats/unlock", post(shows::unlock_seats));

    let payment_routes = Router::new()
        .route("/", post(payments::process_payment))
        .route("/{payment_id}", get(payments::get_payment));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let mut router = Router::new()
        .merge(swagger_routes)
        .route("/health", get(health::health_check))
        .nest("/api/v1/bookings", booking_routes)
        .nest("/api/v1/shows", show_routes)
        .nest("/api/v1/payments", payment_routes)
        .with_state(state);

    if let Some(handle) = metrics {
        router = router.merge(
            Router::new()
                .route("/metrics", get(prometheus_metrics))
                .with_state(MetricsState { handle }),
        );
    }

    router
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ── Tests ──────────────────────────────────────────────────────
