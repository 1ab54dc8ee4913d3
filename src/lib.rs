//! Ellipse Fusion
//!
//! Fuses independent Gaussian error ellipses anchored at MGRS grid
//! references into a single maximum-likelihood ellipse, reported as a grid
//! reference and a CEP radius in feet.

pub mod core;
pub mod algorithms;
pub mod processing;
pub mod validation;
pub mod utils;
pub mod api;

// Re-export commonly used types
pub use core::{EllipseRecord, ErrorEllipse, FusedResult, GeodeticPoint, GridReference, LocalPoint};
pub use algorithms::{CoordinateTransformer, InverseTransform, NumericSettings};
pub use processing::{parse_records, EllipseFusionPipeline, FusionReport};
pub use validation::{ErrorClass, FusionError, FusionResult};
pub use utils::{ConfigError, FusionConfig, LogConfig};
pub use api::{format_error, Figure, OutputFormat, ReportFormatter};
