//! # Seat Booking Service
//!
//! Reserves show seats for requesters. A booking holds short-lived seat
//! locks while PENDING, removes seats from the show's inventory when
//! CONFIRMED and returns them when CANCELLED. Multi-store steps are
//! coordinated as a saga with explicit compensating actions.
//!
//! ## Architecture
//!
//! - **domain**: Bookings, shows, payments, requesters, seat locks and their store traits
//! - **application**: Booking orchestrator (saga), payment coordinator, outbound ports
//! - **infrastructure**: SeaORM persistence, in-memory stores, Redis/in-process seat locks
//! - **interfaces**: REST API with Swagger documentation
//! - **notifications**: Bounded notification queue and in-process event bus
//! - **server**: Runtime bootstrap and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod notifications;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};

// Re-export API router
pub use interfaces::http::create_api_router;

// Re-export notifications
pub use notifications::{create_event_bus, Event, EventBus, SharedEventBus};
