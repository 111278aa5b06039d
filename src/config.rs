//! Configuration module
//!
//! `AppConfig` is read from a TOML file (`REGISTER_CONFIG`, or
//! `~/.config/register-service/config.toml`). Every section has defaults,
//! so an empty file is valid. A few environment variables override the
//! file for container deployments.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{Exchange, ExchangeType, ListenRequest};
use crate::domain::events::QueueBinding;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::crypto::PasswordHasher;
use crate::infrastructure::database::DatabaseConfig;
use crate::shared::InfraError;

pub const CONFIG_ENV: &str = "REGISTER_CONFIG";

/// `~/.config/register-service/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("register-service")
        .join("config.toml")
}

/// Path from `REGISTER_CONFIG`, else the default location
pub fn config_path_from_env() -> PathBuf {
    std::env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_config_path())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub events: EventsConfig,
    pub logging: LoggingConfig,
    /// Seeded on start-up when no user owns the email yet
    pub admin: Option<AdminConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3333,
            shutdown_timeout: 30,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub issuer: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
    pub bcrypt_cost: u32,
    /// Mark the refresh cookie `Secure`. Turn off only for plain HTTP.
    pub secure_cookies: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        let jwt = JwtConfig::default();
        Self {
            jwt_secret: jwt.secret,
            issuer: jwt.issuer,
            access_ttl_minutes: jwt.access_ttl_minutes,
            refresh_ttl_days: jwt.refresh_ttl_days,
            bcrypt_cost: PasswordHasher::default().cost(),
            secure_cookies: true,
        }
    }
}

impl SecurityConfig {
    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig {
            secret: self.jwt_secret.clone(),
            issuer: self.issuer.clone(),
            access_ttl_minutes: self.access_ttl_minutes,
            refresh_ttl_days: self.refresh_ttl_days,
        }
    }

    pub fn password_hasher(&self) -> PasswordHasher {
        PasswordHasher::new(self.bcrypt_cost)
    }
}

/// One consumer queue bound to an exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenConfig {
    pub queue: String,
    pub key: String,
    /// Defaults to the publishing exchange
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub exchange_type: Option<ExchangeType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    pub enabled: bool,
    pub amqp_url: String,
    pub exchange: String,
    pub exchange_type: ExchangeType,
    pub listen: Vec<ListenConfig>,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            amqp_url: "amqp://localhost:5672/%2f".to_string(),
            exchange: "user".to_string(),
            exchange_type: ExchangeType::Topic,
            listen: Vec::new(),
        }
    }
}

impl EventsConfig {
    /// Exchange user events are published on
    pub fn exchange(&self) -> Exchange {
        Exchange::new(self.exchange.clone(), self.exchange_type)
    }

    pub fn listen_requests(&self) -> Vec<ListenRequest> {
        self.listen
            .iter()
            .map(|l| ListenRequest {
                exchange: Exchange::new(
                    l.exchange.clone().unwrap_or_else(|| self.exchange.clone()),
                    l.exchange_type.unwrap_or(self.exchange_type),
                ),
                queue: QueueBinding {
                    name: l.queue.clone(),
                    key: l.key.clone(),
                },
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Plain,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl AppConfig {
    /// Parse a TOML file
    pub fn load(path: &Path) -> Result<Self, InfraError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| InfraError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, InfraError> {
        toml::from_str(content).map_err(|e| InfraError::Config(format!("invalid TOML: {}", e)))
    }

    /// Apply `JWT_SECRET`, `DATABASE_URL`, `AMQP_URL` and `PORT`
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(secret) = lookup("JWT_SECRET") {
            self.security.jwt_secret = secret;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(url) = lookup("AMQP_URL") {
            self.events.amqp_url = url;
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    pub fn validate(&self) -> Result<(), InfraError> {
        if self.security.jwt_secret.trim().is_empty() {
            return Err(InfraError::Config("security.jwt_secret must not be empty".into()));
        }
        if !(4..=31).contains(&self.security.bcrypt_cost) {
            return Err(InfraError::Config(format!(
                "security.bcrypt_cost must be between 4 and 31, got {}",
                self.security.bcrypt_cost
            )));
        }
        if self.security.access_ttl_minutes <= 0 || self.security.refresh_ttl_days <= 0 {
            return Err(InfraError::Config("token lifetimes must be positive".into()));
        }
        if self.events.enabled && self.events.amqp_url.is_empty() {
            return Err(InfraError::Config("events.amqp_url is required when events are enabled".into()));
        }
        Ok(())
    }
}
