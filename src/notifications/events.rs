//! Notification events
//!
//! Event types broadcast to in-process subscribers when a booking changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::ports::{BookingNotice, NotificationKind};

/// Event types for notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    /// Seats locked and booking recorded as PENDING
    BookingCreated(BookingEvent),
    /// Booking confirmed; seats removed from inventory
    BookingConfirmed(BookingEvent),
    /// Booking cancelled; seats returned to inventory
    BookingCancelled(BookingEvent),
}

impl Event {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::BookingCreated(_) => "booking_created",
            Event::BookingConfirmed(_) => "booking_confirmed",
            Event::BookingCancelled(_) => "booking_cancelled",
        }
    }

    pub fn booking(&self) -> &BookingEvent {
        match self {
            Event::BookingCreated(e) | Event::BookingConfirmed(e) | Event::BookingCancelled(e) => e,
        }
    }
}

impl From<&BookingNotice> for Event {
    fn from(notice: &BookingNotice) -> Self {
        let payload = BookingEvent {
            booking_id: notice.booking_id,
            requester_id: notice.requester_id,
            show_id: notice.show_id,
            seat_ids: notice.seat_ids.clone(),
        };
        match notice.kind {
            NotificationKind::Created => Event::BookingCreated(payload),
            NotificationKind::Confirmed => Event::BookingConfirmed(payload),
            NotificationKind::Cancelled => Event::BookingCancelled(payload),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingEvent {
    pub booking_id: i32,
    pub requester_id: i32,
    pub show_id: i32,
    pub seat_ids: Vec<String>,
}

/// Event envelope with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}
