//! Booking orchestrator
//!
//! Runs the booking saga across three independent stores: the seat lock
//! store (short-lived holds), the booking store (lifecycle records) and the
//! seat inventory (authoritative counters). There is no shared transaction,
//! so each multi-step flow either records compensating actions or reports
//! a reconciliation error naming what was left behind.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use super::compensation::{Compensation, CompensationLog};
use crate::application::ports::{BookingNotice, NotificationKind};
use crate::domain::{
    Booking, BookingStatus, DomainError, DomainResult, NewBooking, Notification,
    RepositoryProvider, SeatLockStore,
};
use crate::notifications::NotificationDispatcher;

/// Behaviour switches for the orchestrator
#[derive(Debug, Clone)]
pub struct BookingSettings {
    /// Release seat locks only when the caller is the recorded holder
    pub verify_owner_on_release: bool,
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            verify_owner_on_release: true,
        }
    }
}

/// Per-seat result of a batch lock or unlock
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatOutcome {
    pub seat_id: String,
    pub succeeded: bool,
}

/// Result of a best-effort batch lock or unlock
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub all_succeeded: bool,
    pub seats: Vec<SeatOutcome>,
}

impl BatchOutcome {
    fn from_seats(seats: Vec<SeatOutcome>) -> Self {
        Self {
            all_succeeded: seats.iter().all(|s| s.succeeded),
            seats,
        }
    }
}

pub struct BookingOrchestrator {
    repos: Arc<dyn RepositoryProvider>,
    locks: Arc<dyn SeatLockStore>,
    notifications: NotificationDispatcher,
    settings: BookingSettings,
}

impl BookingOrchestrator {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        locks: Arc<dyn SeatLockStore>,
        notifications: NotificationDispatcher,
        settings: BookingSettings,
    ) -> Self {
        Self {
            repos,
            locks,
            notifications,
            settings,
        }
    }

    // ── Create ─────────────────────────────────────────────────

    /// Lock every requested seat and record a PENDING booking.
    ///
    /// Seats are acquired one at a time in the order given. If any seat is
    /// held (or the lock store fails) the seats taken so far are released
    /// and the call fails with `SeatUnavailable` for the first seat that
    /// could not be taken. On success the locks stay in place until the
    /// booking is cancelled or their TTL runs out.
    pub async fn create_booking(
        &self,
        requester_id: i32,
        show_id: i32,
        seat_ids: Vec<String>,
    ) -> DomainResult<Booking> {
        if seat_ids.is_empty() {
            return Err(DomainError::Validation(
                "at least one seat must be requested".into(),
            ));
        }
        if seat_ids.iter().any(|s| s.trim().is_empty()) {
            return Err(DomainError::Validation("seat ids must not be blank".into()));
        }

        if !self.repos.requesters().exists(requester_id).await? {
            return Err(DomainError::not_found("Requester", "id", requester_id));
        }

        let show = self
            .repos
            .inventory()
            .get(show_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Show", "id", show_id))?;

        let requested = seat_ids.len() as u32;
        if !show.has_capacity_for(requested) {
            return Err(DomainError::InsufficientSeats {
                show_id,
                requested,
                available: show.available_seats,
            });
        }

        // Priced before any lock is taken so an unpayable total leaves nothing held
        let pending = NewBooking::pending(requester_id, show_id, seat_ids, show.price_per_seat_cents)?;

        let mut compensations = CompensationLog::new();
        for seat_id in &pending.seat_ids {
            let acquired = match self.locks.acquire(show_id, seat_id, requester_id).await {
                Ok(acquired) => acquired,
                Err(e) => {
                    warn!(show_id, seat_id = %seat_id, error = %e, "Seat lock store error, treating seat as unavailable");
                    false
                }
            };

            if !acquired {
                metrics::counter!("seat_lock_conflicts_total").increment(1);
                info!(
                    requester_id,
                    show_id,
                    seat_id = %seat_id,
                    rolled_back = compensations.recorded(),
                    "Seat unavailable, rolling back booking attempt"
                );
                compensations
                    .unwind(self.locks.as_ref(), self.settings.verify_owner_on_release)
                    .await;
                return Err(DomainError::SeatUnavailable {
                    show_id,
                    seat_id: seat_id.clone(),
                });
            }

            compensations.record(Compensation::ReleaseSeat {
                show_id,
                seat_id: seat_id.clone(),
                holder_id: requester_id,
            });
        }

        let booking = match self.repos.bookings().create(pending).await {
            Ok(booking) => booking,
            Err(e) => {
                error!(requester_id, show_id, error = %e, "Failed to persist booking, releasing seats");
                compensations
                    .unwind(self.locks.as_ref(), self.settings.verify_owner_on_release)
                    .await;
                return Err(e);
            }
        };
        compensations.discard();

        metrics::counter!("bookings_created_total").increment(1);
        info!(
            booking_id = booking.id,
            requester_id,
            show_id,
            seats = booking.seat_ids.len(),
            total_cost_cents = booking.total_cost_cents,
            "Booking created"
        );

        self.notifications
            .enqueue(BookingNotice::for_booking(&booking, NotificationKind::Created));
        Ok(booking)
    }

    // ── Transitions ────────────────────────────────────────────

    /// Move a PENDING booking to a terminal status and apply the matching
    /// inventory change.
    ///
    /// The status write happens first. If the inventory update then fails,
    /// the booking keeps its new status and the call returns
    /// `InventoryOutOfSync`.
    pub async fn transition(&self, booking_id: i32, target: BookingStatus) -> DomainResult<Booking> {
        let current = self.get_booking(booking_id).await?;
        if !current.status.can_transition_to(target) {
            return Err(invalid_transition(booking_id, current.status, target));
        }

        let updated = match self
            .repos
            .bookings()
            .transition_status(booking_id, BookingStatus::Pending, target)
            .await?
        {
            Some(updated) => updated,
            None => {
                // Lost a race with another transition
                let latest = self.get_booking(booking_id).await?;
                return Err(invalid_transition(booking_id, latest.status, target));
            }
        };

        let seats = updated.seat_count();
        let inventory = if target == BookingStatus::Confirmed {
            self.repos.inventory().decrement(updated.show_id, seats).await
        } else {
            self.repos.inventory().increment(updated.show_id, seats).await
        };

        let available = match inventory {
            Ok(available) => available,
            Err(e) => {
                metrics::counter!("inventory_out_of_sync_total").increment(1);
                error!(
                    booking_id,
                    show_id = updated.show_id,
                    status = %target,
                    seats,
                    error = %e,
                    "Booking status written but seat inventory update failed"
                );
                return Err(DomainError::InventoryOutOfSync {
                    booking_id,
                    status: target.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        if target == BookingStatus::Cancelled {
            self.release_booking_locks(&updated).await;
        }

        metrics::counter!("booking_transitions_total", "status" => target.as_str()).increment(1);
        info!(
            booking_id,
            show_id = updated.show_id,
            status = %target,
            available_seats = available,
            "Booking transitioned"
        );

        let kind = match target {
            BookingStatus::Confirmed => NotificationKind::Confirmed,
            _ => NotificationKind::Cancelled,
        };
        self.notifications
            .enqueue(BookingNotice::for_booking(&updated, kind));
        Ok(updated)
    }

    /// Confirm without going through payment
    pub async fn confirm_booking(&self, booking_id: i32) -> DomainResult<Booking> {
        self.transition(booking_id, BookingStatus::Confirmed).await
    }

    pub async fn cancel_booking(&self, booking_id: i32) -> DomainResult<Booking> {
        self.transition(booking_id, BookingStatus::Cancelled).await
    }

    /// Best-effort release of the requester's own locks on a cancelled booking
    async fn release_booking_locks(&self, booking: &Booking) {
        for seat_id in &booking.seat_ids {
            let holder = match self.locks.holder_of(booking.show_id, seat_id).await {
                Ok(holder) => holder,
                Err(e) => {
                    warn!(booking_id = booking.id, seat_id = %seat_id, error = %e, "Could not inspect seat lock");
                    continue;
                }
            };
            if holder != Some(booking.requester_id) {
                continue;
            }

            let released = if self.settings.verify_owner_on_release {
                self.locks
                    .release_held(booking.show_id, seat_id, booking.requester_id)
                    .await
            } else {
                self.locks
                    .release(booking.show_id, seat_id, booking.requester_id)
                    .await
            };
            if let Err(e) = released {
                warn!(booking_id = booking.id, seat_id = %seat_id, error = %e, "Failed to release seat lock");
            }
        }
    }

    // ── Queries ────────────────────────────────────────────────

    pub async fn get_booking(&self, booking_id: i32) -> DomainResult<Booking> {
        self.repos
            .bookings()
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Booking", "id", booking_id))
    }

    /// All bookings, newest first
    pub async fn list_bookings(&self) -> DomainResult<Vec<Booking>> {
        self.repos.bookings().find_all().await
    }

    /// Seats sold through CONFIRMED bookings
    pub async fn booked_seats(&self, show_id: i32) -> DomainResult<Vec<String>> {
        self.ensure_show(show_id).await?;
        let confirmed = self
            .repos
            .bookings()
            .find_by_show_and_status(show_id, BookingStatus::Confirmed)
            .await?;
        Ok(confirmed.into_iter().flat_map(|b| b.seat_ids).collect())
    }

    /// Recorded delivery attempts for a booking's notices, oldest first
    pub async fn notifications_for(&self, booking_id: i32) -> DomainResult<Vec<Notification>> {
        self.get_booking(booking_id).await?;
        self.repos.notifications().find_by_booking(booking_id).await
    }

    /// Seats currently held by an unexpired lock
    pub async fn held_seats(&self, show_id: i32) -> DomainResult<BTreeSet<String>> {
        self.ensure_show(show_id).await?;
        self.locks.held_seats(show_id).await
    }

    // ── Batch lock management ──────────────────────────────────

    /// Try to lock each seat independently. Nothing is rolled back.
    pub async fn lock_seats(
        &self,
        show_id: i32,
        seat_ids: &[String],
        holder_id: i32,
    ) -> DomainResult<BatchOutcome> {
        self.ensure_show(show_id).await?;

        let mut seats = Vec::with_capacity(seat_ids.len());
        for seat_id in seat_ids {
            let succeeded = match self.locks.acquire(show_id, seat_id, holder_id).await {
                Ok(acquired) => acquired,
                Err(e) => {
                    warn!(show_id, seat_id = %seat_id, error = %e, "Seat lock failed");
                    false
                }
            };
            if !succeeded {
                metrics::counter!("seat_lock_conflicts_total").increment(1);
            }
            seats.push(SeatOutcome {
                seat_id: seat_id.clone(),
                succeeded,
            });
        }
        Ok(BatchOutcome::from_seats(seats))
    }

    pub async fn unlock_seats(
        &self,
        show_id: i32,
        seat_ids: &[String],
        holder_id: i32,
    ) -> DomainResult<BatchOutcome> {
        self.ensure_show(show_id).await?;

        let mut seats = Vec::with_capacity(seat_ids.len());
        for seat_id in seat_ids {
            let released = if self.settings.verify_owner_on_release {
                self.locks.release_held(show_id, seat_id, holder_id).await
            } else {
                self.locks.release(show_id, seat_id, holder_id).await
            };
            let succeeded = match released {
                Ok(()) => true,
                Err(e) => {
                    warn!(show_id, seat_id = %seat_id, holder_id, error = %e, "Seat unlock failed");
                    false
                }
            };
            seats.push(SeatOutcome {
                seat_id: seat_id.clone(),
                succeeded,
            });
        }
        Ok(BatchOutcome::from_seats(seats))
    }

    async fn ensure_show(&self, show_id: i32) -> DomainResult<()> {
        match self.repos.inventory().get(show_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("Show", "id", show_id)),
        }
    }
}

fn invalid_transition(booking_id: i32, from: BookingStatus, to: BookingStatus) -> DomainError {
    DomainError::InvalidTransition {
        booking_id,
        from: from.to_string(),
        to: to.to_string(),
    }
}

// ── Tests ──────────────────────────────────────────────────────
