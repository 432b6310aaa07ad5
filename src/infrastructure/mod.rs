//! Infrastructure layer - external concerns

pub mod database;
pub mod lock;
pub mod storage;

pub use database::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};
pub use lock::{InMemorySeatLockStore, RedisSeatLockStore};
pub use storage::InMemoryRepositoryProvider;
