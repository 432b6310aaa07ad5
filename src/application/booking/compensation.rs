//! Compensating actions for the booking saga
//!
//! Every step that changes state outside the booking store records its
//! inverse here. On failure the log is unwound newest-first; on success it
//! is discarded and the effects stand.

use tracing::{debug, warn};

use crate::domain::SeatLockStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compensation {
    /// Undo a successful seat lock acquisition
    ReleaseSeat {
        show_id: i32,
        seat_id: String,
        holder_id: i32,
    },
}

#[derive(Debug, Default)]
pub struct CompensationLog {
    actions: Vec<Compensation>,
}

impl CompensationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, action: Compensation) {
        self.actions.push(action);
    }

    /// Number of inverses waiting to be unwound
    pub fn recorded(&self) -> usize {
        self.actions.len()
    }

    /// Keep every effect; nothing will be undone.
    pub fn discard(mut self) {
        self.actions.clear();
    }

    /// Run every recorded inverse in reverse order. Failures are logged and
    /// skipped so one stuck lock does not strand the rest. Returns how many
    /// actions failed.
    pub async fn unwind(self, locks: &dyn SeatLockStore, verify_owner: bool) -> usize {
        let mut failed = 0;

        for action in self.actions.into_iter().rev() {
            match action {
                Compensation::ReleaseSeat {
                    show_id,
                    seat_id,
                    holder_id,
                } => {
                    let released = if verify_owner {
                        locks.release_held(show_id, &seat_id, holder_id).await
                    } else {
                        locks.release(show_id, &seat_id, holder_id).await
                    };

                    match released {
                        Ok(()) => debug!(show_id, seat_id = %seat_id, holder_id, "Rolled back seat lock"),
                        Err(e) => {
                            failed += 1;
                            warn!(
                                show_id,
                                seat_id = %seat_id,
                                holder_id,
                                error = %e,
                                "Failed to roll back seat lock; it will expire on its own"
                            );
                        }
                    }
                }
            }
        }

        failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::lock::InMemorySeatLockStore;
    use std::time::Duration;

    fn release(seat: &str, holder_id: i32) -> Compensation {
        Compensation::ReleaseSeat {
            show_id: 1,
            seat_id: seat.to_string(),
            holder_id,
        }
    }

    #[tokio::test]
    async fn unwind_releases_every_recorded_seat() {
        let locks = InMemorySeatLockStore::new(Duration::from_secs(60));
        let mut log = CompensationLog::new();
        for seat in ["A1", "A2", "A3"] {
            assert!(locks.acquire(1, seat, 7).await.unwrap());
            log.record(release(seat, 7));
        }
        assert_eq!(log.recorded(), 3);

        assert_eq!(log.unwind(&locks, true).await, 0);
        assert!(locks.held_seats(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn owner_checked_unwind_skips_foreign_locks() {
        let locks = InMemorySeatLockStore::new(Duration::from_secs(60));
        assert!(locks.acquire(1, "A1", 7).await.unwrap());
        // A2 was taken over by someone else after our lock expired
        assert!(locks.acquire(1, "A2", 8).await.unwrap());

        let mut log = CompensationLog::new();
        log.record(release("A1", 7));
        log.record(release("A2", 7));

        assert_eq!(log.unwind(&locks, true).await, 1);
        assert_eq!(locks.holder_of(1, "A1").await.unwrap(), None);
        assert_eq!(locks.holder_of(1, "A2").await.unwrap(), Some(8));
    }

    #[tokio::test]
    async fn discard_leaves_locks_in_place() {
        let locks = InMemorySeatLockStore::new(Duration::from_secs(60));
        assert!(locks.acquire(1, "A1", 7).await.unwrap());

        let mut log = CompensationLog::new();
        log.record(release("A1", 7));
        log.discard();

        assert_eq!(locks.holder_of(1, "A1").await.unwrap(), Some(7));
    }
}
