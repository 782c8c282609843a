//! carlot-server: car inventory HTTP API over MySQL
//!
//! Create, list, update and soft-delete cars. Every car route runs on its
//! own pooled connection, checked out and configured by the session
//! middleware and returned when the request finishes.

pub mod db;
pub mod http;
pub mod models;
pub mod state;

pub use state::AppState;
