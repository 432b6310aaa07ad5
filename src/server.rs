//! Reusable seat booking server runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: metrics recorder, database and
//! migrations, lock store, notification worker, booking orchestrator,
//! payment coordinator, REST API and graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use chrono::{Duration as ChronoDuration, Utc};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::application::{BookingOrchestrator, PaymentCoordinator, ShowCatalog};
use crate::config::{AppConfig, LockBackend, LockStoreConfig, LoggingConfig};
use crate::domain::{DomainResult, NewShow, RepositoryProvider, Requester, SeatLockStore};
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::{
    init_database, DatabaseConfig, InMemorySeatLockStore, RedisSeatLockStore,
    SeaOrmRepositoryProvider,
};
use crate::interfaces::http::{create_api_router, ApiState};
use crate::notifications::{create_event_bus, EventBusNotifier, NotificationDispatcher, SharedEventBus};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
    /// Seed a demo requester and show into an empty database (default: from config).
    pub seed_demo_data: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        let config = AppConfig::default();
        Self {
            seed_demo_data: config.seed.demo_data,
            config,
            auto_migrate: true,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running seat booking service.
///
/// ```rust,no_run
/// use seat_booking::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.shutdown_signal().wait().await;
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// Booking notices republished for in-process subscribers.
    pub event_bus: SharedEventBus,
    pub repos: Arc<dyn RepositoryProvider>,
    pub orchestrator: Arc<BookingOrchestrator>,
    pub payments: Arc<PaymentCoordinator>,
    pub config: AppConfig,
    /// Address the REST API is bound to.
    pub api_addr: SocketAddr,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: JoinHandle<()>,
    notification_worker: JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;

        info!("Starting seat booking service...");

        let prometheus_handle = prometheus_handle();

        // ── Database ───────────────────────────────────────────
        let db_config = DatabaseConfig {
            url: app_cfg.database.connection_url(),
        };
        let db = init_database(&db_config).await?;

        if opts.auto_migrate {
            info!("Running database migrations...");
            Migrator::up(&db, None).await?;
            info!("Migrations completed");
        }

        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(db.clone()));

        if opts.seed_demo_data {
            if let Err(e) = seed_demo_data(repos.as_ref()).await {
                error!(error = %e, "Failed to seed demo data");
            }
        }

        // ── Seat locks ─────────────────────────────────────────
        let locks = build_lock_store(&app_cfg.lock_store).await?;

        // ── Notifications ──────────────────────────────────────
        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        let event_bus = create_event_bus();
        let notifier = Arc::new(EventBusNotifier::new(event_bus.clone()));
        let (dispatcher, notification_worker) = NotificationDispatcher::start(
            notifier,
            repos.clone(),
            app_cfg.notifications.dispatcher_settings(),
            shutdown_signal.clone(),
        );

        // ── Booking saga & payments ────────────────────────────
        let orchestrator = Arc::new(BookingOrchestrator::new(
            repos.clone(),
            locks.clone(),
            dispatcher,
            app_cfg.lock_store.booking_settings(),
        ));
        let payments = Arc::new(PaymentCoordinator::new(
            repos.clone(),
            orchestrator.clone(),
            Arc::from(app_cfg.payment.outcome.policy()),
        ));
        info!(outcome = ?app_cfg.payment.outcome, "Payment outcome policy configured");

        // ── REST API server ────────────────────────────────────
        let api_router = create_api_router(
            ApiState {
                catalog: Arc::new(ShowCatalog::new(repos.clone())),
                locks,
                orchestrator: orchestrator.clone(),
                payments: payments.clone(),
                db: db.clone(),
                started_at: Arc::new(Instant::now()),
            },
            prometheus_handle,
        );

        let listener = tokio::net::TcpListener::bind(app_cfg.server.address()).await?;
        let api_addr = listener.local_addr()?;
        info!("REST API server listening on http://{}", api_addr);
        info!("Swagger UI available at http://{}/docs/", api_addr);

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(listener, api_router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("🛑 REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        info!("🚀 Seat booking service started.");

        Ok(Self {
            event_bus,
            repos,
            orchestrator,
            payments,
            config: app_cfg,
            api_addr,
            db,
            shutdown,
            api_task,
            notification_worker,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the shutdown signal, let in-flight requests and queued
    /// notifications finish (bounded by `server.shutdown_timeout`), then
    /// close the database.
    pub async fn wait(self) {
        let api_task = self.api_task;
        let notification_worker = self.notification_worker;

        self.shutdown
            .shutdown_with_cleanup(|| async move {
                match api_task.await {
                    Ok(()) => info!("REST API server stopped"),
                    Err(e) => error!("REST API server task panicked: {}", e),
                }
                match notification_worker.await {
                    Ok(()) => info!("Notification worker drained"),
                    Err(e) => error!("Notification worker panicked: {}", e),
                }
            })
            .await;

        if let Err(e) = self.db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("✅ Database connection closed");
        }

        info!("👋 Seat booking service shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("🛑 Shutting down seat booking service...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// The global recorder can only be installed once per process; restarts
/// within the same process reuse it.
fn prometheus_handle() -> Option<PrometheusHandle> {
    use std::sync::OnceLock;
    static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

    if let Some(handle) = PROM_HANDLE.get() {
        return Some(handle.clone());
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            info!("📊 Prometheus metrics recorder installed");
            Some(PROM_HANDLE.get_or_init(|| handle).clone())
        }
        Err(e) => {
            warn!("Prometheus recorder unavailable, /metrics disabled: {}", e);
            None
        }
    }
}

pub async fn build_lock_store(
    config: &LockStoreConfig,
) -> DomainResult<Arc<dyn SeatLockStore>> {
    match config.backend {
        LockBackend::Memory => {
            warn!("Using in-process seat locks; locks are not shared between instances");
            Ok(Arc::new(InMemorySeatLockStore::new(config.ttl())))
        }
        LockBackend::Redis => {
            let store =
                RedisSeatLockStore::connect(&config.redis_url, &config.key_prefix, config.ttl())
                    .await?;
            info!(url = %config.redis_url, ttl_secs = config.seat_lock_ttl_secs, "Redis seat lock store connected");
            Ok(Arc::new(store))
        }
    }
}

/// Create a demo requester and show when the database has none, so the
/// API can be exercised right after first start. Returns whether anything
/// was created.
pub async fn seed_demo_data(repos: &dyn RepositoryProvider) -> DomainResult<bool> {
    let mut seeded = false;

    if repos.requesters().count().await? == 0 {
        repos
            .requesters()
            .save(Requester {
                id: 1,
                email: "demo@example.com".to_string(),
                display_name: "Demo Requester".to_string(),
                created_at: Utc::now(),
            })
            .await?;
        info!(requester_id = 1, "Demo requester created");
        seeded = true;
    }

    if repos.shows().find_all().await?.is_empty() {
        let show = repos
            .shows()
            .create(NewShow {
                title: "Demo Show".to_string(),
                description: "Seeded on first start".to_string(),
                starts_at: Utc::now() + ChronoDuration::days(7),
                total_seats: 50,
                price_per_seat_cents: 1_500,
            })
            .await?;
        info!(show_id = show.id, total_seats = show.total_seats, "Demo show created");
        seeded = true;
    }

    Ok(seeded)
}

/// Initialize tracing (logging) from the application config.
///
/// `RUST_LOG` takes precedence over `logging.level`. Call once at process
/// startup (before [`ServerHandle::start`]).
pub fn init_tracing(config: &LoggingConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));

    if config.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::InMemoryRepositoryProvider;

    #[tokio::test]
    async fn seeding_only_fills_an_empty_store() {
        let repos = InMemoryRepositoryProvider::new();

        assert!(seed_demo_data(&repos).await.unwrap());
        assert!(repos.requesters().exists(1).await.unwrap());
        let shows = repos.shows().find_all().await.unwrap();
        assert_eq!(shows.len(), 1);
        assert_eq!(shows[0].available_seats, 50);

        assert!(!seed_demo_data(&repos).await.unwrap());
        assert_eq!(repos.shows().find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn memory_backend_needs_no_connection() {
        let locks = build_lock_store(&LockStoreConfig::default()).await.unwrap();
        assert!(locks.acquire(1, "A1", 1).await.unwrap());
        locks.ping().await.unwrap();
    }

    #[tokio::test]
    async fn server_starts_and_stops_on_in_memory_sqlite() {
        let mut config = AppConfig::default();
        config.server.api_host = "127.0.0.1".to_string();
        config.server.api_port = 0;
        config.server.shutdown_timeout = 5;
        config.database.url = Some("sqlite::memory:".to_string());

        let handle = ServerHandle::start(ServerOptions {
            config,
            auto_migrate: true,
            seed_demo_data: true,
        })
        .await
        .unwrap();

        assert_ne!(handle.api_addr.port(), 0);
        assert!(handle.repos.requesters().exists(1).await.unwrap());
        assert!(handle.is_running());

        handle.shutdown().await;
    }
}
