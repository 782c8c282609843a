//! Domain models
//!
//! The car row as stored, the request payload as accepted, and the
//! validation error used for operator-supplied settings.

pub mod car;
pub mod validation;

pub use car::{Car, CarPayload};
pub use validation::ValidationError;
