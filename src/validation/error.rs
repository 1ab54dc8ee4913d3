use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for fusion operations
pub type FusionResult<T> = Result<T, FusionError>;

/// Error classification for the ellipse fusion system
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FusionError {
    /// Grid string that cannot be decoded, or a position that cannot be encoded
    #[error("Invalid coordinate '{grid}': {reason}")]
    InvalidCoordinate { grid: String, reason: String },

    /// Zero-determinant covariance or information matrix
    #[error("Singular matrix in {context}: determinant is zero")]
    SingularMatrix { context: String },

    /// Malformed request or record at the boundary
    #[error("Invalid input{}: {reason}", record_label(.record))]
    InvalidInputShape { record: Option<usize>, reason: String },

    /// Major-axis eigenvector without a usable direction
    #[error("Degenerate orientation: eigenvector ({x}, {y}) has no direction")]
    DegenerateOrientation { x: f64, y: f64 },

    /// Ellipsoidal geodesic solver did not converge
    #[error("Geodesic solution did not converge after {iterations} iterations")]
    GeodesicDivergence { iterations: u32 },
}

/// Who has to act on an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    /// The request itself is malformed; fix the input
    Input,
    /// The input is well-formed but mathematically degenerate
    Domain,
}

impl FusionError {
    pub fn invalid_coordinate(grid: impl Into<String>, reason: impl Into<String>) -> Self {
        FusionError::InvalidCoordinate {
            grid: grid.into(),
            reason: reason.into(),
        }
    }

    pub fn singular(context: impl Into<String>) -> Self {
        FusionError::SingularMatrix {
            context: context.into(),
        }
    }

    /// Problem with one record, by position in the request
    pub fn invalid_input(index: usize, reason: impl Into<String>) -> Self {
        FusionError::InvalidInputShape {
            record: Some(index),
            reason: reason.into(),
        }
    }

    /// Problem with the request as a whole
    pub fn malformed_input(reason: impl Into<String>) -> Self {
        FusionError::InvalidInputShape {
            record: None,
            reason: reason.into(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            FusionError::InvalidCoordinate { .. } | FusionError::InvalidInputShape { .. } => ErrorClass::Input,
            FusionError::SingularMatrix { .. }
            | FusionError::DegenerateOrientation { .. }
            | FusionError::GeodesicDivergence { .. } => ErrorClass::Domain,
        }
    }

    /// Stable name of the error kind
    pub fn kind_name(&self) -> &'static str {
        match self {
            FusionError::InvalidCoordinate { .. } => "InvalidCoordinate",
            FusionError::SingularMatrix { .. } => "SingularMatrix",
            FusionError::InvalidInputShape { .. } => "InvalidInputShape",
            FusionError::DegenerateOrientation { .. } => "DegenerateOrientation",
            FusionError::GeodesicDivergence { .. } => "GeodesicDivergence",
        }
    }
}

fn record_label(record: &Option<usize>) -> String {
    record.map(|index| format!(" record {}", index)).unwrap_or_default()
}
