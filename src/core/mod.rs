//! Core types and constants for the ellipse fusion system

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
