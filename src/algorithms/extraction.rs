//! Fused covariance -> ellipse geometry

use tracing::debug;

use crate::algorithms::angles::axis_heading_of;
use crate::algorithms::ellipse::{CovarianceMatrix, NumericSettings};
use crate::algorithms::fusion::FusedEstimate;
use crate::algorithms::rounding::round_to;
use crate::core::{cep_radius_feet, FusedResult};
use crate::validation::{FusionError, FusionResult};

/// Eigen-decomposition of a symmetric 2x2 covariance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EigenAxes {
    pub lambda_max: f64,
    pub lambda_min: f64,
    /// Unit eigenvector of `lambda_max` (x east, y north)
    pub major_axis: (f64, f64),
}

/// Closed-form eigen-decomposition.
///
/// The off-diagonal terms are averaged since rounding can leave them a few
/// units apart in the last place. For a circular covariance the major axis
/// falls back to +x.
pub fn eigen_decompose(covariance: &CovarianceMatrix) -> EigenAxes {
    let a = covariance[(0, 0)];
    let d = covariance[(1, 1)];
    let b = 0.5 * (covariance[(0, 1)] + covariance[(1, 0)]);

    let mean = 0.5 * (a + d);
    let radius = (0.5 * (a - d)).hypot(b);
    let angle = 0.5 * (2.0 * b).atan2(a - d);

    EigenAxes {
        lambda_max: mean + radius,
        lambda_min: mean - radius,
        major_axis: (angle.cos(), angle.sin()),
    }
}

/// Recover semi-axes, heading and CEP from a fused estimate
pub fn extract(estimate: &FusedEstimate, settings: &NumericSettings) -> FusionResult<FusedResult> {
    let axes = eigen_decompose(&estimate.covariance);
    let (x, y) = axes.major_axis;

    if !x.is_finite() || !y.is_finite() || (x == 0.0 && y == 0.0) {
        return Err(FusionError::DegenerateOrientation { x, y });
    }
    if axes.lambda_min <= 0.0 {
        return Err(FusionError::singular("fused covariance"));
    }

    let semi_major = round_to((axes.lambda_max * settings.chi_squared).sqrt(), settings.decimals);
    let semi_minor = round_to((axes.lambda_min * settings.chi_squared).sqrt(), settings.decimals);
    let orientation_deg = round_to(axis_heading_of(x, y), settings.decimals);
    let cep_radius_ft = round_to(cep_radius_feet(semi_major), settings.decimals);

    debug!(semi_major, semi_minor, orientation_deg, cep_radius_ft, "extracted fused ellipse");

    Ok(FusedResult {
        center: estimate.center,
        semi_major,
        semi_minor,
        orientation_deg,
        cep_radius_ft,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::ellipse::covariance_of;
    use crate::core::LocalPoint;
    use nalgebra::Matrix2;

    fn estimate(covariance: Matrix2<f64>) -> FusedEstimate {
        FusedEstimate {
            covariance,
            center: LocalPoint::new(0.25, -0.5),
        }
    }

    #[test]
    fn test_sample_extraction() {
        let fused = estimate(Matrix2::new(0.0622, 0.0288, 0.0288, 0.1031));
        let result = extract(&fused, &NumericSettings::default()).unwrap();

        assert_eq!(result.semi_major, 0.8406);
        assert_eq!(result.semi_minor, 0.5324);
        assert_eq!(result.orientation_deg, 27.3113);
        assert_eq!(result.cep_radius_ft, 5107.5865);
        assert_eq!(result.center, LocalPoint::new(0.25, -0.5));
    }

    #[test]
    fn test_recovers_parameterized_ellipse() {
        let settings = NumericSettings::default();
        for &heading in &[10.0, 45.0, 90.0, 135.0, 170.0] {
            let covariance = covariance_of(3.0, 1.0, heading, &settings).unwrap();
            let result = extract(&estimate(covariance), &settings).unwrap();
            assert!((result.semi_major - 3.0).abs() < 1e-3, "{:?}", result);
            assert!((result.semi_minor - 1.0).abs() < 1e-3, "{:?}", result);
            assert!((result.orientation_deg - heading).abs() < 0.05, "{:?}", result);
        }
    }

    #[test]
    fn test_heading_stays_in_range() {
        let settings = NumericSettings::default();
        // Major axis along y, north-south
        let result = extract(&estimate(Matrix2::new(0.1, 0.0, 0.0, 0.5)), &settings).unwrap();
        assert!(result.orientation_deg.abs() < 1e-9);

        let result = extract(&estimate(Matrix2::new(0.3, -0.1, -0.1, 0.3)), &settings).unwrap();
        assert!((result.orientation_deg - 135.0).abs() < 1e-9);
        assert!((0.0..180.0).contains(&result.orientation_deg));
    }

    #[test]
    fn test_circular_covariance_is_stable() {
        let result = extract(&estimate(Matrix2::new(0.2, 0.0, 0.0, 0.2)), &NumericSettings::default()).unwrap();
        assert_eq!(result.semi_major, result.semi_minor);
        assert_eq!(result.orientation_deg, 90.0);
        assert!(!result.orientation_deg.is_nan());
    }

    #[test]
    fn test_non_finite_covariance_is_degenerate() {
        let result = extract(
            &estimate(Matrix2::new(f64::NAN, 0.0, 0.0, 0.2)),
            &NumericSettings::default(),
        );
        assert!(matches!(result, Err(FusionError::DegenerateOrientation { .. })));
    }

    #[test]
    fn test_non_positive_minor_eigenvalue_is_singular() {
        let result = extract(&estimate(Matrix2::new(0.2, 0.2, 0.2, 0.2)), &NumericSettings::default());
        assert!(matches!(result, Err(FusionError::SingularMatrix { .. })));
    }

    #[test]
    fn test_eigen_decompose() {
        let axes = eigen_decompose(&Matrix2::new(2.0, 1.0, 1.0, 2.0));
        assert!((axes.lambda_max - 3.0).abs() < 1e-12);
        assert!((axes.lambda_min - 1.0).abs() < 1e-12);
        let (x, y) = axes.major_axis;
        assert!((x - y).abs() < 1e-12);
    }
}
