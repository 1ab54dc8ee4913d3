//! WGS84 geodesic computations.
//!
//! Distances come from Vincenty's iterative solution on the ellipsoid,
//! which agrees with Karney's algorithm to well under a millimetre for the
//! separations handled here. The initial bearing used to split a distance
//! into east/north components is the spherical forward azimuth.

use crate::core::{GeodeticPoint, WGS84_A, WGS84_B, WGS84_F};
use crate::validation::{FusionError, FusionResult};

/// Iteration cap for the Vincenty solvers
pub const MAX_ITERATIONS: u32 = 200;

/// Convergence threshold on lambda / sigma (radians)
const CONVERGENCE: f64 = 1e-12;

/// Solution of the inverse geodesic problem
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodesicInverse {
    /// Ellipsoidal distance (meters)
    pub distance_m: f64,
    /// Ellipsoidal forward azimuth at the first point (degrees from north)
    pub azimuth_deg: f64,
}

/// Ellipsoidal distance and azimuth between two points
pub fn inverse(from: &GeodeticPoint, to: &GeodeticPoint) -> FusionResult<GeodesicInverse> {
    let l = (to.lon - from.lon).to_radians();
    let u1 = ((1.0 - WGS84_F) * from.lat.to_radians().tan()).atan();
    let u2 = ((1.0 - WGS84_F) * to.lat.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    let mut iterations = 0;

    let (sin_sigma, cos_sigma, sigma, cos_sq_alpha, cos_2sigma_m, sin_lambda, cos_lambda) = loop {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();

        if sin_sigma == 0.0 {
            // Coincident points
            return Ok(GeodesicInverse {
                distance_m: 0.0,
                azimuth_deg: 0.0,
            });
        }

        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        // Equatorial line: cos_sq_alpha = 0
        let cos_2sigma_m = if cos_sq_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            0.0
        };
        let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));

        let previous = lambda;
        lambda = l
            + (1.0 - c)
                * WGS84_F
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

        iterations += 1;
        if (lambda - previous).abs() < CONVERGENCE {
            let (sin_lambda, cos_lambda) = lambda.sin_cos();
            break (sin_sigma, cos_sigma, sigma, cos_sq_alpha, cos_2sigma_m, sin_lambda, cos_lambda);
        }
        if iterations >= MAX_ITERATIONS {
            return Err(FusionError::GeodesicDivergence { iterations });
        }
    };

    let u_sq = cos_sq_alpha * (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);
    let a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
    let delta_sigma = delta_sigma(b, sin_sigma, cos_sigma, cos_2sigma_m);

    let distance_m = WGS84_B * a * (sigma - delta_sigma);
    let azimuth = (cos_u2 * sin_lambda).atan2(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda);

    Ok(GeodesicInverse {
        distance_m,
        azimuth_deg: azimuth.to_degrees().rem_euclid(360.0),
    })
}

/// Destination reached from `from` along `azimuth_deg` for `distance_m`
pub fn direct(from: &GeodeticPoint, azimuth_deg: f64, distance_m: f64) -> FusionResult<GeodeticPoint> {
    if distance_m == 0.0 {
        return Ok(*from);
    }

    let (sin_alpha1, cos_alpha1) = azimuth_deg.to_radians().sin_cos();
    let tan_u1 = (1.0 - WGS84_F) * from.lat.to_radians().tan();
    let cos_u1 = 1.0 / (1.0 + tan_u1 * tan_u1).sqrt();
    let sin_u1 = tan_u1 * cos_u1;

    let sigma1 = tan_u1.atan2(cos_alpha1);
    let sin_alpha = cos_u1 * sin_alpha1;
    let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
    let u_sq = cos_sq_alpha * (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);
    let a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));

    let base = distance_m / (WGS84_B * a);
    let mut sigma = base;
    let mut iterations = 0;

    let (sin_sigma, cos_sigma, cos_2sigma_m) = loop {
        let cos_2sigma_m = (2.0 * sigma1 + sigma).cos();
        let (sin_sigma, cos_sigma) = sigma.sin_cos();
        let previous = sigma;
        sigma = base + delta_sigma(b, sin_sigma, cos_sigma, cos_2sigma_m);

        iterations += 1;
        if (sigma - previous).abs() < CONVERGENCE {
            let (sin_sigma, cos_sigma) = sigma.sin_cos();
            break (sin_sigma, cos_sigma, (2.0 * sigma1 + sigma).cos());
        }
        if iterations >= MAX_ITERATIONS {
            return Err(FusionError::GeodesicDivergence { iterations });
        }
    };

    let tmp = sin_u1 * sin_sigma - cos_u1 * cos_sigma * cos_alpha1;
    let lat = (sin_u1 * cos_sigma + cos_u1 * sin_sigma * cos_alpha1)
        .atan2((1.0 - WGS84_F) * (sin_alpha * sin_alpha + tmp * tmp).sqrt());
    let lambda = (sin_sigma * sin_alpha1).atan2(cos_u1 * cos_sigma - sin_u1 * sin_sigma * cos_alpha1);
    let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));
    let l = lambda
        - (1.0 - c)
            * WGS84_F
            * sin_alpha
            * (sigma
                + c * sin_sigma * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

    Ok(GeodeticPoint::new(lat.to_degrees(), from.lon + l.to_degrees()).normalized())
}

/// Spherical initial bearing from `from` to `to`, degrees in (-180, 180]
pub fn initial_bearing_deg(from: &GeodeticPoint, to: &GeodeticPoint) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let dlon = (to.lon - from.lon).to_radians();

    let x = lat2.cos() * dlon.sin();
    let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    x.atan2(y).to_degrees()
}

fn delta_sigma(b: f64, sin_sigma: f64, cos_sigma: f64, cos_2sigma_m: f64) -> f64 {
    b * sin_sigma
        * (cos_2sigma_m
            + b / 4.0
                * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                    - b / 6.0
                        * cos_2sigma_m
                        * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                        * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coincident_points() {
        let p = GeodeticPoint::new(25.5, 123.2);
        let result = inverse(&p, &p).unwrap();
        assert_eq!(result.distance_m, 0.0);
    }

    #[test]
    fn test_one_degree_of_latitude_at_equator() {
        let a = GeodeticPoint::new(0.0, 0.0);
        let b = GeodeticPoint::new(1.0, 0.0);
        let result = inverse(&a, &b).unwrap();
        // Meridian arc for the first degree of latitude on WGS84
        assert!((result.distance_m - 110574.389).abs() < 0.01);
        assert!(result.azimuth_deg.abs() < 1e-9);
    }

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        let a = GeodeticPoint::new(0.0, 0.0);
        let b = GeodeticPoint::new(0.0, 1.0);
        let result = inverse(&a, &b).unwrap();
        assert!((result.distance_m - 111319.491).abs() < 0.01);
        assert!((result.azimuth_deg - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_flinders_peak_to_buninyong() {
        // Vincenty's published reference line
        let flinders = GeodeticPoint::new(-(37.0 + 57.0 / 60.0 + 3.72030 / 3600.0), 144.0 + 25.0 / 60.0 + 29.52440 / 3600.0);
        let buninyong = GeodeticPoint::new(-(37.0 + 39.0 / 60.0 + 10.15610 / 3600.0), 143.0 + 55.0 / 60.0 + 35.38390 / 3600.0);
        let result = inverse(&flinders, &buninyong).unwrap();
        assert!((result.distance_m - 54972.271).abs() < 0.001);
        assert!((result.azimuth_deg - 306.868159).abs() < 1e-5);
    }

    #[test]
    fn test_direct_inverts_inverse() {
        let from = GeodeticPoint::new(25.53, 123.45);
        let to = GeodeticPoint::new(25.61, 123.38);
        let solved = inverse(&from, &to).unwrap();
        let reached = direct(&from, solved.azimuth_deg, solved.distance_m).unwrap();
        assert!((reached.lat - to.lat).abs() < 1e-9);
        assert!((reached.lon - to.lon).abs() < 1e-9);
    }

    #[test]
    fn test_near_antipodal_diverges() {
        let a = GeodeticPoint::new(0.0, 0.0);
        let b = GeodeticPoint::new(0.5, 179.7);
        assert!(matches!(inverse(&a, &b), Err(FusionError::GeodesicDivergence { .. })));
    }

    #[test]
    fn test_initial_bearing_cardinal_directions() {
        let origin = GeodeticPoint::new(0.0, 0.0);
        assert!(initial_bearing_deg(&origin, &GeodeticPoint::new(1.0, 0.0)).abs() < 1e-9);
        assert!((initial_bearing_deg(&origin, &GeodeticPoint::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((initial_bearing_deg(&origin, &GeodeticPoint::new(-1.0, 0.0)).abs() - 180.0).abs() < 1e-9);
        assert!((initial_bearing_deg(&origin, &GeodeticPoint::new(0.0, -1.0)) + 90.0).abs() < 1e-9);
    }
}
