//! # register-service
//!
//! User account microservice: registration, JWT sessions with refresh
//! cookies, profile updates and account removal. Account changes are
//! published as domain events over AMQP.
//!
//! ## Architecture
//!
//! - **domain**: users, events and the ports they are stored/published through
//! - **application**: one use case per operation
//! - **infrastructure**: SeaORM storage, bcrypt/JWT, AMQP messaging
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: process lifecycle and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::{init_database, DatabaseConfig};

pub use interfaces::http::{create_api_router, ApiDependencies, ApiDoc};
