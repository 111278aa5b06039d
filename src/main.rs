//! register-service binary
//!
//! ```sh
//! # Run with default config (~/.config/register-service/config.toml)
//! register-service
//!
//! # Custom config path
//! register-service --config /etc/register-service/config.toml
//!
//! # Validate config without starting
//! register-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use register_service::config::AppConfig;
use register_service::server::{init_tracing, ServerHandle, ServerOptions};

/// User account service: registration, sessions and account lifecycle.
#[derive(Parser, Debug)]
#[command(
    name = "register-service",
    version,
    about = "User account service with JWT sessions",
    long_about = "REST API for registering users, issuing access/refresh tokens \
                  and managing accounts. Publishes user events over AMQP when enabled.\n\n\
                  Default config: ~/.config/register-service/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "REGISTER_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Skip seeding the configured admin user.
    #[arg(long)]
    no_admin: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli
        .config
        .unwrap_or_else(register_service::default_config_path);

    let loaded = AppConfig::load(&config_path);
    let mut config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => AppConfig::default(),
    };

    config.apply_env_overrides();
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.no_admin {
        config.admin = None;
    }

    init_tracing(&config);
    match loaded {
        Ok(_) => info!("Configuration loaded from {}", config_path.display()),
        Err(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        config.validate()?;
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}", config.server.address());
        println!("   Database    : {}", config.database.url);
        println!(
            "   Events      : {}",
            if config.events.enabled { config.events.amqp_url.as_str() } else { "disabled" }
        );
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
