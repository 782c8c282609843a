//! Repository implementations for database access

pub mod cars;

pub use cars::CarRepo;
