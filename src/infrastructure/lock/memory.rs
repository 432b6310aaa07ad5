//! In-process seat lock store
//!
//! Suitable for a single service instance and for tests. Expiry is checked
//! lazily on access; expired entries are treated as absent and overwritten.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::domain::{DomainError, DomainResult, SeatKey, SeatLockStore};

#[derive(Debug, Clone, Copy)]
struct HeldLock {
    holder_id: i32,
    expires_at: Instant,
}

impl HeldLock {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

pub struct InMemorySeatLockStore {
    locks: DashMap<SeatKey, HeldLock>,
    ttl: Duration,
}

impl InMemorySeatLockStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            locks: DashMap::new(),
            ttl,
        }
    }

    fn purge_expired(&self) {
        let now = Instant::now();
        self.locks.retain(|_, lock| lock.is_live(now));
    }
}

#[async_trait]
impl SeatLockStore for InMemorySeatLockStore {
    async fn acquire(&self, show_id: i32, seat_id: &str, holder_id: i32) -> DomainResult<bool> {
        let now = Instant::now();
        let fresh = HeldLock {
            holder_id,
            expires_at: now + self.ttl,
        };

        // The entry guard holds the shard lock, so check-and-insert is atomic.
        let acquired = match self.locks.entry(SeatKey::new(show_id, seat_id)) {
            Entry::Occupied(mut existing) => {
                if existing.get().is_live(now) {
                    false
                } else {
                    existing.insert(fresh);
                    true
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(fresh);
                true
            }
        };

        debug!(show_id, seat_id, holder_id, acquired, "Seat lock acquire");
        Ok(acquired)
    }

    async fn release(&self, show_id: i32, seat_id: &str, _holder_id: i32) -> DomainResult<()> {
        self.locks.remove(&SeatKey::new(show_id, seat_id));
        Ok(())
    }

    async fn release_held(
        &self,
        show_id: i32,
        seat_id: &str,
        holder_id: i32,
    ) -> DomainResult<()> {
        let now = Instant::now();
        let key = SeatKey::new(show_id, seat_id);
        let removed = self
            .locks
            .remove_if(&key, |_, lock| lock.holder_id == holder_id || !lock.is_live(now));

        if removed.is_none() && self.locks.contains_key(&key) {
            return Err(DomainError::NotOwner {
                show_id,
                seat_id: seat_id.to_string(),
                holder_id,
            });
        }
        Ok(())
    }

    async fn held_seats(&self, show_id: i32) -> DomainResult<BTreeSet<String>> {
        self.purge_expired();
        Ok(self
            .locks
            .iter()
            .filter(|entry| entry.key().show_id == show_id)
            .map(|entry| entry.key().seat_id.clone())
            .collect())
    }

    async fn holder_of(&self, show_id: i32, seat_id: &str) -> DomainResult<Option<i32>> {
        let now = Instant::now();
        Ok(self
            .locks
            .get(&SeatKey::new(show_id, seat_id))
            .filter(|lock| lock.is_live(now))
            .map(|lock| lock.holder_id))
    }

    async fn ping(&self) -> DomainResult<()> {
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────
