//! HTTP server layer
//!
//! Axum server with:
//! - CORS (any origin)
//! - Request tracing
//! - Per-request database session middleware
//! - Graceful shutdown
//! - JSON envelope responses

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, run_server, ServerConfig, ServerError};
