//! Event-bus backed notifier
//!
//! Stands in for the external notification channel: each notice is logged
//! and fanned out to in-process subscribers.

use async_trait::async_trait;
use tracing::info;

use super::event_bus::SharedEventBus;
use super::events::Event;
use crate::application::ports::{BookingNotice, BookingNotifier};
use crate::domain::DomainResult;

pub struct EventBusNotifier {
    bus: SharedEventBus,
}

impl EventBusNotifier {
    pub fn new(bus: SharedEventBus) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl BookingNotifier for EventBusNotifier {
    async fn notify(&self, notice: &BookingNotice) -> DomainResult<bool> {
        let subscribers = self.bus.publish(Event::from(notice));
        info!(
            booking_id = notice.booking_id,
            requester_id = notice.requester_id,
            kind = %notice.kind,
            subscribers,
            "Booking notification sent"
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::NotificationKind;
    use crate::notifications::create_event_bus;

    #[tokio::test]
    async fn notice_reaches_subscribers() {
        let bus = create_event_bus();
        let mut subscriber = bus.subscribe();
        let notifier = EventBusNotifier::new(bus.clone());

        let delivered = notifier
            .notify(&BookingNotice {
                booking_id: 8,
                requester_id: 2,
                show_id: 4,
                seat_ids: vec!["B2".into()],
                kind: NotificationKind::Confirmed,
            })
            .await
            .unwrap();
        assert!(delivered);

        let message = subscriber.recv().await.unwrap();
        assert_eq!(message.event.event_type(), "booking_confirmed");
        assert_eq!(message.event.booking().seat_ids, vec!["B2"]);
    }
}
