//! Notifications module
//!
//! Booking notices flow from the orchestrator through a bounded queue
//! ([`NotificationDispatcher`]) to a [`BookingNotifier`](crate::application::ports::BookingNotifier).
//! The bundled notifier logs each notice and republishes it on the in-process
//! [`EventBus`]. Each delivery attempt is also written to the notification log.
//!
//! # Usage
//! ```ignore
//! use seat_booking::notifications::{create_event_bus, EventBusNotifier, NotificationDispatcher};
//!
//! let bus = create_event_bus();
//! let notifier = Arc::new(EventBusNotifier::new(bus.clone()));
//! let (dispatcher, worker) =
//!     NotificationDispatcher::start(notifier, repos.clone(), DispatcherSettings::default(), shutdown.clone());
//! ```

pub mod dispatcher;
pub mod event_bus;
pub mod events;
pub mod notifier;

pub use dispatcher::{DispatcherSettings, NotificationDispatcher};
pub use event_bus::{create_event_bus, EventBus, EventSubscriber, SharedEventBus};
pub use events::*;
pub use notifier::EventBusNotifier;
