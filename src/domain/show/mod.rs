//! Show aggregate
//!
//! Scheduled shows, their seat counters, and the inventory interface the
//! booking saga consumes.

pub mod model;
pub mod repository;

pub use model::{validate_total_seats, NewShow, Show, ShowDetails};
pub use repository::{SeatInventory, ShowRepository};
