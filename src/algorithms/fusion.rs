//! Information-form fusion of independent Gaussian ellipses
//!
//! Each ellipse contributes its information matrix (inverse covariance).
//! The fused covariance is the inverse of the summed information, and the
//! fused center is that covariance applied to the information-weighted sum
//! of centers.

use nalgebra::{Matrix2, Vector2};
use tracing::debug;

use crate::algorithms::ellipse::{covariance_of, invert, CovarianceMatrix, NumericSettings};
use crate::algorithms::rounding::{round_matrix, round_vector};
use crate::core::{ErrorEllipse, LocalPoint};
use crate::validation::{FusionError, FusionResult};

/// Fused covariance and center in the local frame
#[derive(Debug, Clone, PartialEq)]
pub struct FusedEstimate {
    pub covariance: CovarianceMatrix,
    pub center: LocalPoint,
}

/// Fuse ellipses already expressed in the local frame.
///
/// Fails with `InvalidInputShape` on an empty slice and with
/// `SingularMatrix` when any covariance or the information sum cannot be
/// inverted.
pub fn fuse(ellipses: &[ErrorEllipse], settings: &NumericSettings) -> FusionResult<FusedEstimate> {
    if ellipses.is_empty() {
        return Err(FusionError::malformed_input("at least one ellipse is required"));
    }

    let mut information_sum = Matrix2::zeros();
    let mut weighted_sum = Vector2::zeros();

    for ellipse in ellipses {
        let covariance = covariance_of(
            ellipse.semi_major,
            ellipse.semi_minor,
            ellipse.orientation_deg,
            settings,
        )?;
        let information = invert(&covariance, settings.decimals, "covariance inversion")?;
        let center = Vector2::new(ellipse.center.x, ellipse.center.y);

        information_sum += information;
        let weighted = round_vector(&(information * center), settings.decimals);
        weighted_sum = round_vector(&(weighted_sum + weighted), settings.decimals);
    }

    let information_sum = round_matrix(&information_sum, settings.decimals);
    let covariance = invert(&information_sum, settings.decimals, "information sum inversion")?;
    let center = round_vector(&(covariance * weighted_sum), settings.decimals);

    debug!(
        count = ellipses.len(),
        x = center.x,
        y = center.y,
        "fused ellipses"
    );

    Ok(FusedEstimate {
        covariance,
        center: LocalPoint::new(center.x, center.y),
    })
}
