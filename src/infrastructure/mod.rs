//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod messaging;
pub mod storage;

pub use crypto::{JwtConfig, PasswordHasher};
pub use database::{init_database, DatabaseConfig, SeaOrmUsersRepository};
pub use messaging::{AmqpEventsProvider, InMemoryEventPublisher, NoopEventPublisher, UserEventCache};
pub use storage::InMemoryUsersRepository;
