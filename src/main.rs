//! Seat booking service binary
//!
//! ```sh
//! # Run with default config (~/.config/seat-booking/config.toml)
//! seat-booking-service
//!
//! # Custom config path and port
//! seat-booking-service --config /etc/seat-booking/config.toml --api-port 9090
//!
//! # Validate config without starting
//! seat-booking-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use seat_booking::config::{default_config_path, AppConfig, LockBackend};
use seat_booking::server::{init_tracing, ServerHandle, ServerOptions};

/// Seat booking service: short-lived seat locks, bookings and payments.
#[derive(Parser, Debug)]
#[command(
    name = "seat-booking-service",
    version,
    about = "Seat reservation service with short-lived seat locks",
    long_about = "REST API for booking show seats. Seats are held in a lock store \
                  (in-process or Redis) while a booking is PENDING and removed from \
                  inventory when it is confirmed.\n\n\
                  Default config: ~/.config/seat-booking/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "BOOKING_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Skip seeding the demo requester and show.
    #[arg(long)]
    no_seed: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(default_config_path);

    let (mut config, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(port) = cli.api_port {
        config.server.api_port = port;
    }

    if cli.check {
        if let Some(e) = load_error {
            eprintln!("❌ Invalid configuration {}: {}", config_path.display(), e);
            std::process::exit(1);
        }
        println!("✅ Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}", config.server.address());
        println!("   Database    : {}", config.database.connection_url());
        match config.lock_store.backend {
            LockBackend::Memory => println!("   Lock store  : memory"),
            LockBackend::Redis => println!("   Lock store  : {}", config.lock_store.redis_url),
        }
        println!("   Seat TTL    : {}s", config.lock_store.seat_lock_ttl_secs);
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    init_tracing(&config.logging);
    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
    }

    // ── Start server ───────────────────────────────────────────
    let seed_demo_data = config.seed.demo_data && !cli.no_seed;
    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
        seed_demo_data,
    })
    .await?;

    handle.install_signal_handler();
    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.wait().await;

    Ok(())
}
