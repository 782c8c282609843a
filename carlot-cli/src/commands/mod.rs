//! Command implementations for carlot CLI

pub mod serve;

pub use serve::run_serve;
