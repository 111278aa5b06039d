//! HTTP REST API interfaces
//!
//! - `common`: error bodies and the validated JSON extractor
//! - `middleware`: bearer access-token authentication
//! - `modules`: handlers and DTOs per resource
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;


pub use router::{create_api_router, ApiDependencies, ApiDoc};
