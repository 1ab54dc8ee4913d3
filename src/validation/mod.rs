//! Error taxonomy and input validation failures

pub mod error;

pub use error::{ErrorClass, FusionError, FusionResult};
