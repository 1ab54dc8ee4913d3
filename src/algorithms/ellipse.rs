//! Error ellipse <-> covariance matrix parameterization

use nalgebra::Matrix2;
use serde::{Deserialize, Serialize};

use crate::algorithms::angles::heading_to_math_deg;
use crate::algorithms::rounding::round_matrix;
use crate::core::{CHI_SQUARED_95_2DOF, ROUNDING_DECIMALS};
use crate::validation::{FusionError, FusionResult};

/// Symmetric positive-definite 2x2 covariance (NM^2) in the east/north frame
pub type CovarianceMatrix = Matrix2<f64>;

/// Confidence scaling and rounding cadence shared by the numerical stages
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericSettings {
    /// Chi-squared value tying axis lengths to covariance eigenvalues
    pub chi_squared: f64,
    /// Decimal places kept after every matrix/vector operation
    pub decimals: u32,
}

impl Default for NumericSettings {
    fn default() -> Self {
        Self {
            chi_squared: CHI_SQUARED_95_2DOF,
            decimals: ROUNDING_DECIMALS,
        }
    }
}

/// Covariance of an ellipse given its axes (NM) and major-axis heading.
///
/// Covariance = V * D * V^-1 with D = diag(a^2, b^2) / chi-squared and V the
/// rotation by the mathematical angle of the heading. V^-1 goes through
/// [`invert`] and is rounded like every other intermediate.
pub fn covariance_of(
    semi_major: f64,
    semi_minor: f64,
    orientation_deg: f64,
    settings: &NumericSettings,
) -> FusionResult<CovarianceMatrix> {
    let d = Matrix2::new(
        semi_major * semi_major / settings.chi_squared,
        0.0,
        0.0,
        semi_minor * semi_minor / settings.chi_squared,
    );
    let v = rotation(heading_to_math_deg(orientation_deg));
    let v_inv = invert(&v, settings.decimals, "axis rotation")?;

    Ok(round_matrix(&(v * d * v_inv), settings.decimals))
}

/// Closed-form 2x2 inverse, rounded to `decimals`.
///
/// Only an exactly zero determinant is rejected.
pub fn invert(matrix: &Matrix2<f64>, decimals: u32, context: &str) -> FusionResult<Matrix2<f64>> {
    let (a, b, c, d) = (matrix[(0, 0)], matrix[(0, 1)], matrix[(1, 0)], matrix[(1, 1)]);
    let determinant = a * d - b * c;

    if determinant == 0.0 {
        return Err(FusionError::singular(context));
    }

    let inverse = Matrix2::new(
        d / determinant,
        -b / determinant,
        -c / determinant,
        a / determinant,
    );
    Ok(round_matrix(&inverse, decimals))
}

/// Counter-clockwise rotation by `angle_deg`
pub fn rotation(angle_deg: f64) -> Matrix2<f64> {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    Matrix2::new(cos, -sin, sin, cos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> NumericSettings {
        NumericSettings::default()
    }

    #[test]
    fn test_north_south_major_axis() {
        // Heading 0: major axis along y
        let cov = covariance_of(2.0, 1.0, 0.0, &settings()).unwrap();
        assert!((cov[(0, 0)] - 0.1669).abs() < 1e-12);
        assert!((cov[(1, 1)] - 0.6678).abs() < 1e-12);
        assert!(cov[(0, 1)].abs() < 1e-12);
        assert!(cov[(1, 0)].abs() < 1e-12);
    }

    #[test]
    fn test_east_west_major_axis() {
        let cov = covariance_of(2.0, 1.0, 90.0, &settings()).unwrap();
        assert!((cov[(0, 0)] - 0.6678).abs() < 1e-12);
        assert!((cov[(1, 1)] - 0.1669).abs() < 1e-12);
    }

    #[test]
    fn test_diagonal_heading_has_positive_correlation() {
        // Heading 45 points north-east, so x and y grow together
        let cov = covariance_of(2.0, 1.0, 45.0, &settings()).unwrap();
        assert!(cov[(0, 1)] > 0.0);
        let cov = covariance_of(2.0, 1.0, 135.0, &settings()).unwrap();
        assert!(cov[(0, 1)] < 0.0);
    }

    #[test]
    fn test_covariance_is_symmetric_within_rounding() {
        for &(a, b) in &[(3.7757, 0.56), (1.73, 0.86), (1.0, 1.0), (2.0, 1.0)] {
            let mut theta = 0.0;
            while theta < 180.0 {
                let cov = covariance_of(a, b, theta, &settings()).unwrap();
                assert!(
                    (cov[(0, 1)] - cov[(1, 0)]).abs() < 1.5e-4,
                    "asymmetric for a={} b={} theta={}: {}",
                    a,
                    b,
                    theta,
                    cov
                );
                theta += 7.5;
            }
        }
    }

    #[test]
    fn test_sample_covariances() {
        let first = covariance_of(3.7757, 0.56, 29.16, &settings()).unwrap();
        assert_eq!(first, Matrix2::new(0.605, 0.9904, 0.9905, 1.8274));
        let second = covariance_of(1.73, 0.86, 123.0, &settings()).unwrap();
        assert_eq!(second, Matrix2::new(0.3881, -0.1718, -0.1718, 0.2351));
    }

    #[test]
    fn test_covariance_trace_matches_axes() {
        let cov = covariance_of(3.7757, 0.56, 29.16, &settings()).unwrap();
        let expected = (3.7757f64.powi(2) + 0.56f64.powi(2)) / CHI_SQUARED_95_2DOF;
        assert!((cov.trace() - expected).abs() < 1e-3);
    }

    #[test]
    fn test_invert() {
        let m = Matrix2::new(4.0, 7.0, 2.0, 6.0);
        let inv = invert(&m, 4, "test").unwrap();
        assert_eq!(inv, Matrix2::new(0.6, -0.7, -0.2, 0.4));
    }

    #[test]
    fn test_invert_singular() {
        let m = Matrix2::new(1.0, 2.0, 2.0, 4.0);
        let result = invert(&m, 4, "test");
        assert!(matches!(result, Err(FusionError::SingularMatrix { .. })));
    }

    #[test]
    fn test_invert_accepts_tiny_determinant() {
        let m = Matrix2::new(1e-6, 0.0, 0.0, 1e-6);
        assert!(invert(&m, 4, "test").is_ok());
    }

    #[test]
    fn test_degenerate_ellipse_is_singular() {
        // Minor axis vanishes below the rounding resolution
        let cov = covariance_of(1.0, 0.001, 0.0, &settings()).unwrap();
        assert!(matches!(invert(&cov, 4, "covariance"), Err(FusionError::SingularMatrix { .. })));
    }
}
