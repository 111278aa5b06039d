pub mod events;
pub mod user;

// Re-export commonly used types
pub use events::{EventHandler, EventPublisher, Exchange, ExchangeType, ListenRequest, UserEvent};
pub use user::{CreateUserDto, PublicUser, User, UserRole, UsersRepository};

pub use crate::shared::errors::{DomainError, DomainResult};
