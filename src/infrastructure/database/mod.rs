pub mod entities;
pub mod migrator;
pub mod repositories;

pub use repositories::SeaOrmUsersRepository;

use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://./register.db?mode=rwc"), or "memory"
    /// for the in-process repository
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./register.db?mode=rwc".to_string(),
            max_connections: 10,
            connect_timeout_secs: 8,
        }
    }
}

impl DatabaseConfig {
    /// Create config for SQLite
    pub fn sqlite(path: &str) -> Self {
        Self {
            url: format!("sqlite://{}?mode=rwc", path),
            ..Self::default()
        }
    }

    /// Private in-memory SQLite database. A single connection keeps every
    /// query on the same database.
    pub fn in_memory_sqlite() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            ..Self::default()
        }
    }

    /// True when users live in the process instead of a SQL database
    pub fn is_memory(&self) -> bool {
        self.url == "memory"
    }
}

/// Initialize database connection
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, sea_orm::DbErr> {
    info!("Connecting to database: {}", config.url);

    let mut opts = ConnectOptions::new(config.url.clone());
    opts.max_connections(config.max_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .sqlx_logging(false);

    let db = Database::connect(opts).await?;
    info!("Database connected successfully");
    Ok(db)
}

/// Round-trip a trivial query to prove the connection is usable
pub async fn ping(db: &DatabaseConnection) -> Result<(), sea_orm::DbErr> {
    let backend = db.get_database_backend();
    db.execute(Statement::from_string(backend, "SELECT 1".to_owned()))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_url_selects_in_process_store() {
        let cfg = DatabaseConfig {
            url: "memory".into(),
            ..DatabaseConfig::default()
        };
        assert!(cfg.is_memory());
        assert!(!DatabaseConfig::default().is_memory());
    }

    #[test]
    fn sqlite_helper_builds_rwc_url() {
        let cfg = DatabaseConfig::sqlite("/tmp/users.db");
        assert_eq!(cfg.url, "sqlite:///tmp/users.db?mode=rwc");
    }

    #[tokio::test]
    async fn in_memory_sqlite_answers_ping() {
        let db = init_database(&DatabaseConfig::in_memory_sqlite())
            .await
            .unwrap();
        ping(&db).await.unwrap();
    }
}
