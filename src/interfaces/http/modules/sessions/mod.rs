//! Sessions module: credential login and refresh-token rotation

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
