//! Event publishing and consumption

mod amqp;
mod cache;
mod memory;

pub use amqp::AmqpEventsProvider;
pub use cache::UserEventCache;
pub use memory::{InMemoryEventPublisher, NoopEventPublisher};
