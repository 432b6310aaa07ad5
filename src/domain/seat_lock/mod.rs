//! Seat locks
//!
//! A seat lock is a short-lived exclusive claim on one seat of one show,
//! keyed by `(show_id, seat_id)` and valued by the holder's requester id.
//! Locks expire on their own after the store's configured TTL.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::DomainResult;

/// Identity of a lock: one seat of one show
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeatKey {
    pub show_id: i32,
    pub seat_id: String,
}

impl SeatKey {
    pub fn new(show_id: i32, seat_id: impl Into<String>) -> Self {
        Self {
            show_id,
            seat_id: seat_id.into(),
        }
    }

    /// `{prefix}:{show_id}:{seat_id}`
    pub fn storage_key(&self, prefix: &str) -> String {
        format!("{}:{}:{}", prefix, self.show_id, self.seat_id)
    }

    /// Prefix shared by every lock of one show
    pub fn show_prefix(prefix: &str, show_id: i32) -> String {
        format!("{}:{}:", prefix, show_id)
    }

    /// Inverse of [`storage_key`](Self::storage_key). Seat ids may contain `:`.
    pub fn parse(prefix: &str, key: &str) -> Option<Self> {
        let rest = key.strip_prefix(prefix)?.strip_prefix(':')?;
        let (show, seat) = rest.split_once(':')?;
        let show_id = show.parse().ok()?;
        if seat.is_empty() {
            return None;
        }
        Some(Self::new(show_id, seat))
    }
}

/// Distributed key-value store with per-key expiry.
///
/// Implementations never block waiting for a lock: every call is a single
/// round trip and the caller owns the retry policy. Storage failures are
/// reported as `LockStoreUnavailable`.
#[async_trait]
pub trait SeatLockStore: Send + Sync {
    /// Atomically create the lock if absent. Returns `true` iff `holder_id`
    /// became the holder.
    async fn acquire(&self, show_id: i32, seat_id: &str, holder_id: i32) -> DomainResult<bool>;

    /// Delete the lock regardless of who holds it. Idempotent.
    async fn release(&self, show_id: i32, seat_id: &str, holder_id: i32) -> DomainResult<()>;

    /// Delete the lock only if `holder_id` holds it; `NotOwner` otherwise.
    /// A missing lock is a successful no-op.
    async fn release_held(&self, show_id: i32, seat_id: &str, holder_id: i32)
        -> DomainResult<()>;

    /// Seat ids of all unexpired locks for a show
    async fn held_seats(&self, show_id: i32) -> DomainResult<BTreeSet<String>>;

    async fn holder_of(&self, show_id: i32, seat_id: &str) -> DomainResult<Option<i32>>;

    /// Liveness check used by /health
    async fn ping(&self) -> DomainResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_key_round_trips_seats_with_colons() {
        let key = SeatKey::new(42, "balcony:R1:S3");
        let raw = key.storage_key("booking:lock");
        assert_eq!(raw, "booking:lock:42:balcony:R1:S3");
        assert_eq!(SeatKey::parse("booking:lock", &raw), Some(key));
    }

    #[test]
    fn parse_rejects_foreign_keys() {
        assert_eq!(SeatKey::parse("booking:lock", "session:42:A1"), None);
        assert_eq!(SeatKey::parse("booking:lock", "booking:lock:x:A1"), None);
        assert_eq!(SeatKey::parse("booking:lock", "booking:lock:42:"), None);
    }
}
