//! Fixed-decimal rounding applied after every intermediate operation.
//!
//! Values are scaled by 10^decimals, rounded half-to-even and scaled back,
//! so results line up with recorded baselines produced the same way.

use nalgebra::{Matrix2, Vector2};

/// Round a scalar to `decimals` places (ties to even)
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round_ties_even() / factor
}

pub fn round_matrix(matrix: &Matrix2<f64>, decimals: u32) -> Matrix2<f64> {
    matrix.map(|v| round_to(v, decimals))
}

pub fn round_vector(vector: &Vector2<f64>, decimals: u32) -> Vector2<f64> {
    vector.map(|v| round_to(v, decimals))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 4), 1.2346);
        assert_eq!(round_to(-1.23454, 4), -1.2345);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(3.5, 0), 4.0);
        assert_eq!(round_to(7.0, 4), 7.0);
    }

    #[test]
    fn test_round_matrix() {
        let m = Matrix2::new(0.123449, 1.0 / 3.0, -2.0 / 3.0, 10.00005001);
        let r = round_matrix(&m, 4);
        assert_eq!(r, Matrix2::new(0.1234, 0.3333, -0.6667, 10.0001));
    }
}
