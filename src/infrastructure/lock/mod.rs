//! Seat lock store backends

pub mod memory;
pub mod redis;

pub use memory::InMemorySeatLockStore;
pub use self::redis::RedisSeatLockStore;
