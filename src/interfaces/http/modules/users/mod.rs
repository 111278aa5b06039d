//! Users module: registration, profile, update and removal

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
