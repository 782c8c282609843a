//! Database layer - pool, session seam and repositories
//!
//! # Design Principles
//!
//! - The pool is built once and injected; there is no global handle
//! - One connection per request, checked out as a `CarSession`
//! - Sessions return their connection on drop
//! - One statement per operation, no transactions

pub mod memory;
pub mod mysql;
pub mod pool;
pub mod repos;
pub mod session;

pub use memory::{FailPoint, MemoryStore};
pub use mysql::MySqlStore;
pub use pool::{create_pool, DbConfig};
pub use session::{CarSession, CarStore, InsertOutcome, SessionSettings, StoreError};
