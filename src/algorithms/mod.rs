//! Core fusion algorithms

pub mod rounding;
pub mod angles;
pub mod geodesy;
pub mod utm;
pub mod mgrs;
pub mod coordinates;
pub mod ellipse;
pub mod fusion;
pub mod extraction;

pub use coordinates::{CoordinateTransformer, InverseTransform};
pub use ellipse::{covariance_of, CovarianceMatrix, NumericSettings};
pub use extraction::extract;
pub use fusion::{fuse, FusedEstimate};
