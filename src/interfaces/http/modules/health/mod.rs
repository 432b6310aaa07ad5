//! Liveness and dependency checks

pub mod handlers;

pub use handlers::*;
