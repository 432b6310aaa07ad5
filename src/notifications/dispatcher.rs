//! Background notification delivery
//!
//! Booking flows hand notices to a bounded queue and return immediately. A
//! single worker drains the queue, bounding each delivery attempt with a
//! timeout and retrying transient failures with backoff. Every attempt is
//! recorded in the notification log as SENT or FAILED. Delivery failures are
//! logged and counted, never reported back to the booking flow.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::application::ports::{BookingNotice, BookingNotifier};
use crate::domain::{DomainError, NewNotification, NotificationStatus, RepositoryProvider};
use crate::shared::retry::{retry_with_backoff, RetryConfig};
use crate::shared::shutdown::ShutdownSignal;

/// Configuration for the notification worker
#[derive(Debug, Clone)]
pub struct DispatcherSettings {
    pub queue_capacity: usize,
    /// Upper bound for a single delivery attempt
    pub timeout: Duration,
    pub retry: RetryConfig,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            timeout: Duration::from_secs(5),
            retry: RetryConfig::default(),
        }
    }
}

/// Handle for enqueueing notices; cheap to clone
#[derive(Clone)]
pub struct NotificationDispatcher {
    sender: mpsc::Sender<BookingNotice>,
}

impl NotificationDispatcher {
    /// Spawn the delivery worker. It exits once `shutdown` fires and the
    /// queued notices have been drained, or when every handle is dropped.
    pub fn start(
        notifier: Arc<dyn BookingNotifier>,
        repos: Arc<dyn RepositoryProvider>,
        settings: DispatcherSettings,
        shutdown: ShutdownSignal,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(settings.queue_capacity.max(1));
        let worker = tokio::spawn(run_worker(receiver, notifier, repos, settings, shutdown));
        (Self { sender }, worker)
    }

    /// Queue a notice without waiting. Returns `false` if it was dropped.
    pub fn enqueue(&self, notice: BookingNotice) -> bool {
        match self.sender.try_send(notice) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(notice)) => {
                warn!(
                    booking_id = notice.booking_id,
                    kind = %notice.kind,
                    "Notification queue full, dropping notice"
                );
                metrics::counter!("notifications_dropped_total").increment(1);
                false
            }
            Err(mpsc::error::TrySendError::Closed(notice)) => {
                warn!(
                    booking_id = notice.booking_id,
                    kind = %notice.kind,
                    "Notification worker stopped, dropping notice"
                );
                metrics::counter!("notifications_dropped_total").increment(1);
                false
            }
        }
    }
}

async fn run_worker(
    mut receiver: mpsc::Receiver<BookingNotice>,
    notifier: Arc<dyn BookingNotifier>,
    repos: Arc<dyn RepositoryProvider>,
    settings: DispatcherSettings,
    shutdown: ShutdownSignal,
) {
    info!(
        "📨 Notification worker started (queue capacity: {}, timeout: {:?})",
        settings.queue_capacity, settings.timeout
    );

    let stopped = shutdown.wait();
    tokio::pin!(stopped);

    loop {
        tokio::select! {
            next = receiver.recv() => match next {
                Some(notice) => deliver(notifier.as_ref(), repos.as_ref(), &notice, &settings).await,
                None => break,
            },
            _ = &mut stopped => {
                receiver.close();
                let mut drained = 0usize;
                while let Some(notice) = receiver.recv().await {
                    deliver(notifier.as_ref(), repos.as_ref(), &notice, &settings).await;
                    drained += 1;
                }
                info!("📨 Notification worker drained {} queued notices", drained);
                break;
            }
        }
    }

    info!("📨 Notification worker stopped");
}

async fn deliver(
    notifier: &dyn BookingNotifier,
    repos: &dyn RepositoryProvider,
    notice: &BookingNotice,
    settings: &DispatcherSettings,
) {
    let timeout = settings.timeout;
    let attempts = AtomicU32::new(0);
    let attempts = &attempts;

    let outcome = retry_with_backoff(
        settings.retry.clone(),
        move || async move {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            let result = match tokio::time::timeout(timeout, notifier.notify(notice)).await {
                Ok(Ok(true)) => Ok(()),
                Ok(Ok(false)) => Err(DomainError::Unavailable(
                    "notifier declined delivery".to_string(),
                )),
                Ok(Err(e)) => Err(e),
                Err(_) => Err(DomainError::Unavailable(format!(
                    "notification timed out after {:?}",
                    timeout
                ))),
            };
            record_attempt(repos, notice, attempt, &result).await;
            result
        },
        DomainError::is_transient,
        "notify_booking",
    )
    .await;

    match outcome {
        Ok(()) => debug!(
            booking_id = notice.booking_id,
            kind = %notice.kind,
            "Notification delivered"
        ),
        Err(e) => {
            error!(
                booking_id = notice.booking_id,
                requester_id = notice.requester_id,
                kind = %notice.kind,
                error = %e,
                "Notification delivery failed"
            );
            metrics::counter!("notifications_failed_total", "kind" => notice.kind.as_str())
                .increment(1);
        }
    }
}

/// Append one SENT or FAILED row; a failed write is logged and otherwise ignored.
async fn record_attempt(
    repos: &dyn RepositoryProvider,
    notice: &BookingNotice,
    attempt: u32,
    result: &Result<(), DomainError>,
) {
    let (status, error) = match result {
        Ok(()) => (NotificationStatus::Sent, None),
        Err(e) => (NotificationStatus::Failed, Some(e.to_string())),
    };
    let record = NewNotification {
        booking_id: notice.booking_id,
        requester_id: notice.requester_id,
        subject: notice.subject(),
        body: notice.body(),
        status,
        attempt,
        error,
    };
    if let Err(e) = repos.notifications().create(record).await {
        warn!(
            booking_id = notice.booking_id,
            attempt,
            error = %e,
            "Failed to record notification attempt"
        );
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::NotificationKind;
    use crate::domain::DomainResult;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::Semaphore;

    fn notice(booking_id: i32) -> BookingNotice {
        BookingNotice {
            booking_id,
            requester_id: 1,
            show_id: 1,
            seat_ids: vec!["A1".into()],
            kind: NotificationKind::Created,
        }
    }

    fn log() -> Arc<InMemoryRepositoryProvider> {
        Arc::new(InMemoryRepositoryProvider::new())
    }

    fn fast_settings(queue_capacity: usize) -> DispatcherSettings {
        DispatcherSettings {
            queue_capacity,
            timeout: Duration::from_millis(50),
            retry: RetryConfig {
                max_attempts: 3,
                initial_delay: Duration::from_millis(1),
                backoff_multiplier: 2.0,
                max_delay: Duration::from_millis(5),
            },
        }
    }

    /// Fails the first `failures` calls, then records deliveries
    #[derive(Default)]
    struct Recorder {
        failures: u32,
        calls: AtomicU32,
        delivered: Mutex<Vec<i32>>,
    }

    #[async_trait]
    impl BookingNotifier for Recorder {
        async fn notify(&self, notice: &BookingNotice) -> DomainResult<bool> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(DomainError::Unavailable("smtp down".into()));
            }
            self.delivered.lock().unwrap().push(notice.booking_id);
            Ok(true)
        }
    }

    struct Hanging;

    #[async_trait]
    impl BookingNotifier for Hanging {
        async fn notify(&self, _notice: &BookingNotice) -> DomainResult<bool> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(true)
        }
    }

    /// Blocks every delivery until a permit is released
    struct Gated {
        gate: Arc<Semaphore>,
    }

    #[async_trait]
    impl BookingNotifier for Gated {
        async fn notify(&self, _notice: &BookingNotice) -> DomainResult<bool> {
            let _permit = self.gate.acquire().await;
            Ok(true)
        }
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let recorder = Arc::new(Recorder {
            failures: 2,
            ..Default::default()
        });
        let repos = log();
        let shutdown = ShutdownSignal::new();
        let (dispatcher, worker) =
            NotificationDispatcher::start(recorder.clone(), repos.clone(), fast_settings(8), shutdown.clone());

        assert!(dispatcher.enqueue(notice(1)));
        shutdown.trigger();
        worker.await.unwrap();

        assert_eq!(recorder.calls.load(Ordering::SeqCst), 3);
        assert_eq!(*recorder.delivered.lock().unwrap(), vec![1]);

        let attempts = repos.notifications().find_by_booking(1).await.unwrap();
        let statuses: Vec<(u32, NotificationStatus)> =
            attempts.iter().map(|n| (n.attempt, n.status)).collect();
        assert_eq!(
            statuses,
            vec![
                (1, NotificationStatus::Failed),
                (2, NotificationStatus::Failed),
                (3, NotificationStatus::Sent),
            ]
        );
        assert!(attempts[0].error.as_deref().unwrap().contains("smtp down"));
        assert_eq!(attempts[2].subject, "Booking #1 created");
        assert_eq!(attempts[2].error, None);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let recorder = Arc::new(Recorder {
            failures: 10,
            ..Default::default()
        });
        let shutdown = ShutdownSignal::new();
        let (dispatcher, worker) =
            NotificationDispatcher::start(recorder.clone(), log(), fast_settings(8), shutdown.clone());

        dispatcher.enqueue(notice(1));
        shutdown.trigger();
        worker.await.unwrap();

        assert_eq!(recorder.calls.load(Ordering::SeqCst), 3);
        assert!(recorder.delivered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn slow_delivery_is_cut_off_by_timeout() {
        let repos = log();
        let shutdown = ShutdownSignal::new();
        let (dispatcher, worker) = NotificationDispatcher::start(
            Arc::new(Hanging),
            repos.clone(),
            fast_settings(8),
            shutdown.clone(),
        );

        dispatcher.enqueue(notice(1));
        shutdown.trigger();

        // three 50ms attempts plus backoff, far below the notifier's 60s sleep
        tokio::time::timeout(Duration::from_secs(5), worker)
            .await
            .expect("worker should finish")
            .unwrap();

        let attempts = repos.notifications().find_by_booking(1).await.unwrap();
        assert_eq!(attempts.len(), 3);
        assert!(attempts
            .iter()
            .all(|n| n.status == NotificationStatus::Failed
                && n.error.as_deref().unwrap().contains("timed out")));
    }

    #[tokio::test]
    async fn full_queue_drops_notice() {
        let gate = Arc::new(Semaphore::new(0));
        let shutdown = ShutdownSignal::new();
        let (dispatcher, worker) = NotificationDispatcher::start(
            Arc::new(Gated { gate: gate.clone() }),
            log(),
            DispatcherSettings {
                timeout: Duration::from_secs(5),
                ..fast_settings(1)
            },
            shutdown.clone(),
        );

        assert!(dispatcher.enqueue(notice(1)));
        // wait until the worker has taken the first notice off the queue
        while dispatcher.sender.capacity() == 0 {
            tokio::task::yield_now().await;
        }
        assert!(dispatcher.enqueue(notice(2)));
        assert!(!dispatcher.enqueue(notice(3)));

        gate.add_permits(10);
        shutdown.trigger();
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn queued_notices_are_drained_on_shutdown() {
        let recorder = Arc::new(Recorder::default());
        let shutdown = ShutdownSignal::new();
        let (dispatcher, worker) =
            NotificationDispatcher::start(recorder.clone(), log(), fast_settings(16), shutdown.clone());

        for id in 1..=5 {
            assert!(dispatcher.enqueue(notice(id)));
        }
        shutdown.trigger();
        worker.await.unwrap();

        assert_eq!(*recorder.delivered.lock().unwrap(), vec![1, 2, 3, 4, 5]);
        assert!(!dispatcher.enqueue(notice(6)));
    }
}
