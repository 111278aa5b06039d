pub mod ports;
pub mod types;

pub use ports::{EventHandler, EventPublisher};
pub use types::*;
