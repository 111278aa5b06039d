//! Reusable service runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: metrics recorder, storage,
//! migrations, admin seed, event publisher and consumers, REST API and
//! graceful shutdown.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use crate::application::UseCaseFactory;
use crate::config::{AdminConfig, AppConfig, LogFormat};
use crate::domain::{CreateUserDto, DomainResult, EventPublisher, UserRole, UsersRepository};
use crate::infrastructure::crypto::PasswordHasher;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::{
    init_database, AmqpEventsProvider, InMemoryUsersRepository, NoopEventPublisher,
    SeaOrmUsersRepository, UserEventCache,
};
use crate::interfaces::http::{create_api_router, ApiDependencies};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running service.
///
/// ```rust,no_run
/// use register_service::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub repo: Arc<dyn UsersRepository>,
    /// Filled by the AMQP consumers, `None` when events are disabled
    pub user_cache: Option<Arc<UserEventCache>>,
    pub config: AppConfig,
    /// Port actually bound, which differs from the config when it is 0
    pub api_port: u16,

    db: Option<DatabaseConnection>,
    amqp: Option<AmqpEventsProvider>,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

/// The global metrics recorder can only be installed once per process, so
/// a restart within the same process reuses it.
fn prometheus_handle() -> PrometheusHandle {
    static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

    PROM_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("Prometheus metrics recorder installed");
                handle
            }
            Err(e) => {
                warn!("Metrics recorder not installed ({}), /metrics will stay empty", e);
                PrometheusBuilder::new().build_recorder().handle()
            }
        })
        .clone()
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        app_cfg.validate()?;

        info!("Starting register-service...");

        let metrics_handle = prometheus_handle();

        // ── Storage ────────────────────────────────────────────
        let (repo, db): (Arc<dyn UsersRepository>, Option<DatabaseConnection>) =
            if app_cfg.database.is_memory() {
                warn!("Using in-memory user storage, data is lost on exit");
                let repo: Arc<dyn UsersRepository> = Arc::new(InMemoryUsersRepository::new());
                (repo, None)
            } else {
                let db = init_database(&app_cfg.database).await?;

                if opts.auto_migrate {
                    info!("Running database migrations...");
                    Migrator::up(&db, None).await?;
                    info!("Migrations completed");
                }

                let repo: Arc<dyn UsersRepository> = Arc::new(SeaOrmUsersRepository::new(db.clone()));
                (repo, Some(db))
            };

        let hasher = app_cfg.security.password_hasher();

        if let Some(admin) = &app_cfg.admin {
            if let Err(e) = seed_admin(repo.as_ref(), &hasher, admin).await {
                error!("Failed to create admin user: {}", e);
            }
        }

        // ── Events ─────────────────────────────────────────────
        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);

        let mut amqp = None;
        let mut user_cache = None;
        let publisher: Arc<dyn EventPublisher> = if app_cfg.events.enabled {
            let provider =
                AmqpEventsProvider::new(app_cfg.events.amqp_url.clone(), app_cfg.events.exchange());
            info!(exchange = %app_cfg.events.exchange, "AMQP events enabled");

            let cache = Arc::new(UserEventCache::new());
            for request in app_cfg.events.listen_requests() {
                provider.listen(request, cache.clone()).await;
            }

            amqp = Some(provider.clone());
            user_cache = Some(cache);
            Arc::new(provider)
        } else {
            info!("Events disabled");
            Arc::new(NoopEventPublisher)
        };

        // ── REST API server ────────────────────────────────────
        let use_cases = UseCaseFactory::new(repo.clone(), publisher, hasher);

        let api_router = create_api_router(ApiDependencies {
            use_cases,
            jwt_config: app_cfg.security.jwt_config(),
            secure_cookies: app_cfg.security.secure_cookies,
            db: db.clone(),
            metrics_handle,
        });

        let listener = tokio::net::TcpListener::bind(app_cfg.server.address()).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API server listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/api-docs/", local_addr);

        let api_shutdown = shutdown.signal();
        let api_server = axum::serve(listener, api_router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            repo,
            user_cache,
            config: app_cfg,
            api_port: local_addr.port(),
            db,
            amqp,
            shutdown,
            api_task,
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

    /// Wait until the API server stops, then close AMQP and the database.
    pub async fn wait(self) {
        let signal = self.shutdown.signal();
        let mut api_task = self.api_task;

        tokio::select! {
            result = &mut api_task => {
                if let Err(e) = result {
                    error!("REST API server task panicked: {}", e);
                }
            }
            _ = async {
                signal.wait().await;
                tokio::time::sleep(Duration::from_secs(self.shutdown.timeout_secs())).await;
            } => {
                warn!("In-flight requests did not finish within {}s", self.shutdown.timeout_secs());
                api_task.abort();
            }
        }

        if let Some(amqp) = self.amqp {
            amqp.close().await;
        }

        if let Some(db) = self.db {
            if let Err(e) = db.close().await {
                warn!("Error closing database connection: {}", e);
            } else {
                info!("Database connection closed");
            }
        }

        info!("register-service shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("Shutting down register-service...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// Create the configured admin unless a user already owns the email.
/// Returns whether a user was created.
pub async fn seed_admin(
    repo: &dyn UsersRepository,
    hasher: &PasswordHasher,
    admin: &AdminConfig,
) -> DomainResult<bool> {
    if repo.find_by_email(&admin.email).await?.is_some() {
        return Ok(false);
    }

    let password_hash = hasher.hash(&admin.password)?;
    let user = repo
        .create(CreateUserDto {
            name: admin.name.clone(),
            email: admin.email.clone(),
            password_hash,
            role: Some(UserRole::Admin),
        })
        .await?;

    info!(user_id = %user.id, "Admin user created: {}", admin.email);
    warn!("Please change the admin password immediately!");
    Ok(true)
}

/// Initialize tracing (logging) from the application config.
///
/// Call this once at process startup (before [`ServerHandle::start`]).
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        LogFormat::Plain => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::DatabaseConfig;

    fn admin() -> AdminConfig {
        AdminConfig {
            name: "Admin".into(),
            email: "admin@example.com".into(),
            password: "changeme".into(),
        }
    }

    #[tokio::test]
    async fn seed_admin_runs_once() {
        let repo = InMemoryUsersRepository::new();
        let hasher = PasswordHasher::new(4);

        assert!(seed_admin(&repo, &hasher, &admin()).await.unwrap());
        assert!(!seed_admin(&repo, &hasher, &admin()).await.unwrap());

        let stored = repo.find_by_email("admin@example.com").await.unwrap().unwrap();
        assert_eq!(stored.role, UserRole::Admin);
        assert!(hasher.verify("changeme", &stored.password_hash));
    }

    fn test_config(database: DatabaseConfig) -> AppConfig {
        let mut config = AppConfig::default();
        config.server.host = "127.0.0.1".into();
        config.server.port = 0;
        config.server.shutdown_timeout = 1;
        config.security.bcrypt_cost = 4;
        config.database = database;
        config.admin = Some(admin());
        config
    }

    #[tokio::test]
    async fn starts_and_stops_with_memory_storage() {
        let config = test_config(DatabaseConfig {
            url: "memory".into(),
            ..DatabaseConfig::default()
        });

        let handle = ServerHandle::start(ServerOptions {
            config,
            auto_migrate: true,
        })
        .await
        .unwrap();

        assert_ne!(handle.api_port, 0);
        assert!(handle.is_running());
        assert!(handle.user_cache.is_none());
        assert!(handle
            .repo
            .find_by_email("admin@example.com")
            .await
            .unwrap()
            .is_some());

        tokio::time::timeout(Duration::from_secs(5), handle.shutdown())
            .await
            .expect("shutdown timed out");
    }

    #[tokio::test]
    async fn starts_with_migrated_sqlite() {
        let config = test_config(DatabaseConfig::in_memory_sqlite());

        let handle = ServerHandle::start(ServerOptions {
            config,
            auto_migrate: true,
        })
        .await
        .unwrap();

        assert!(handle
            .repo
            .find_by_email("admin@example.com")
            .await
            .unwrap()
            .is_some());

        tokio::time::timeout(Duration::from_secs(5), handle.shutdown())
            .await
            .expect("shutdown timed out");
    }

    #[tokio::test]
    async fn invalid_config_refuses_to_start() {
        let mut config = test_config(DatabaseConfig {
            url: "memory".into(),
            ..DatabaseConfig::default()
        });
        config.security.jwt_secret = String::new();

        assert!(ServerHandle::start(ServerOptions {
            config,
            auto_migrate: true,
        })
        .await
        .is_err());
    }
}
