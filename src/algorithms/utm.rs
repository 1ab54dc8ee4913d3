//! Universal Transverse Mercator projection on WGS84
//!
//! Uses Krüger's series in the third flattening to fourth order, which keeps
//! round-trip error at the micrometre level anywhere inside a zone. Zone
//! selection includes the Norway and Svalbard exceptions.

use crate::core::{GeodeticPoint, WGS84_A, WGS84_F};

/// Central scale factor
pub const K0: f64 = 0.9996;

/// False easting (meters)
pub const FALSE_EASTING: f64 = 500000.0;

/// False northing applied in the southern hemisphere (meters)
pub const FALSE_NORTHING_SOUTH: f64 = 10000000.0;

/// Southern and northern latitude limits of the UTM grid
pub const MIN_LATITUDE: f64 = -80.0;
pub const MAX_LATITUDE: f64 = 84.0;

/// Projected UTM coordinate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtmCoordinate {
    pub zone: u8,
    pub north: bool,
    pub easting: f64,
    pub northing: f64,
}

/// Series coefficients derived from the ellipsoid
struct KruegerSeries {
    /// Rectifying radius scaled to the 2*pi meridian
    big_a: f64,
    /// First eccentricity
    e: f64,
    alpha: [f64; 4],
    beta: [f64; 4],
    delta: [f64; 4],
}

impl KruegerSeries {
    fn wgs84() -> Self {
        let n = WGS84_F / (2.0 - WGS84_F);
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;

        Self {
            big_a: WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0),
            e: (WGS84_F * (2.0 - WGS84_F)).sqrt(),
            alpha: [
                n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0 + 41.0 * n4 / 180.0,
                13.0 * n2 / 48.0 - 3.0 * n3 / 5.0 + 557.0 * n4 / 1440.0,
                61.0 * n3 / 240.0 - 103.0 * n4 / 140.0,
                49561.0 * n4 / 161280.0,
            ],
            beta: [
                n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0 - n4 / 360.0,
                n2 / 48.0 + n3 / 15.0 - 437.0 * n4 / 1440.0,
                17.0 * n3 / 480.0 - 37.0 * n4 / 840.0,
                4397.0 * n4 / 161280.0,
            ],
            delta: [
                2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3 + 116.0 * n4 / 45.0,
                7.0 * n2 / 3.0 - 8.0 * n3 / 5.0 - 227.0 * n4 / 45.0,
                56.0 * n3 / 15.0 - 136.0 * n4 / 35.0,
                4279.0 * n4 / 630.0,
            ],
        }
    }
}

/// Standard 6-degree zone for a longitude, 1..=60
pub fn standard_zone(longitude: f64) -> u8 {
    let zone = ((longitude + 180.0) / 6.0).floor() as i32 + 1;
    zone.clamp(1, 60) as u8
}

/// Zone for a position including the Norway and Svalbard exceptions
pub fn zone_for(point: &GeodeticPoint) -> u8 {
    let (lat, lon) = (point.lat, point.lon);

    if (56.0..64.0).contains(&lat) && (3.0..12.0).contains(&lon) {
        return 32;
    }

    if (72.0..=84.0).contains(&lat) && (0.0..42.0).contains(&lon) {
        return match lon {
            l if l < 9.0 => 31,
            l if l < 21.0 => 33,
            l if l < 33.0 => 35,
            _ => 37,
        };
    }

    standard_zone(lon)
}

/// Central meridian of a zone (degrees)
pub fn central_meridian(zone: u8) -> f64 {
    (zone as f64 - 1.0) * 6.0 - 180.0 + 3.0
}

/// Project a geodetic point into its own zone
pub fn from_geodetic(point: &GeodeticPoint) -> UtmCoordinate {
    project(point, zone_for(point))
}

/// Project a geodetic point into a given zone
pub fn project(point: &GeodeticPoint, zone: u8) -> UtmCoordinate {
    let series = KruegerSeries::wgs84();
    let phi = point.lat.to_radians();
    let dlambda = (point.lon - central_meridian(zone)).to_radians();
    let dlambda = (dlambda + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI) - std::f64::consts::PI;

    let sin_phi = phi.sin();
    let t = (sin_phi.atanh() - series.e * (series.e * sin_phi).atanh()).sinh();
    let xi_prime = t.atan2(dlambda.cos());
    let eta_prime = (dlambda.sin() / (1.0 + t * t).sqrt()).atanh();

    let mut xi = xi_prime;
    let mut eta = eta_prime;
    for (j, alpha) in series.alpha.iter().enumerate() {
        let k = 2.0 * (j as f64 + 1.0);
        xi += alpha * (k * xi_prime).sin() * (k * eta_prime).cosh();
        eta += alpha * (k * xi_prime).cos() * (k * eta_prime).sinh();
    }

    let north = point.lat >= 0.0;
    let false_northing = if north { 0.0 } else { FALSE_NORTHING_SOUTH };

    UtmCoordinate {
        zone,
        north,
        easting: FALSE_EASTING + K0 * series.big_a * eta,
        northing: false_northing + K0 * series.big_a * xi,
    }
}

/// Unproject a UTM coordinate back to a geodetic point
pub fn to_geodetic(utm: &UtmCoordinate) -> GeodeticPoint {
    let series = KruegerSeries::wgs84();
    let false_northing = if utm.north { 0.0 } else { FALSE_NORTHING_SOUTH };

    let xi = (utm.northing - false_northing) / (K0 * series.big_a);
    let eta = (utm.easting - FALSE_EASTING) / (K0 * series.big_a);

    let mut xi_prime = xi;
    let mut eta_prime = eta;
    for (j, beta) in series.beta.iter().enumerate() {
        let k = 2.0 * (j as f64 + 1.0);
        xi_prime -= beta * (k * xi).sin() * (k * eta).cosh();
        eta_prime -= beta * (k * xi).cos() * (k * eta).sinh();
    }

    let chi = (xi_prime.sin() / eta_prime.cosh()).asin();
    let mut phi = chi;
    for (j, delta) in series.delta.iter().enumerate() {
        let k = 2.0 * (j as f64 + 1.0);
        phi += delta * (k * chi).sin();
    }

    let dlambda = eta_prime.sinh().atan2(xi_prime.cos());

    GeodeticPoint::new(phi.to_degrees(), central_meridian(utm.zone) + dlambda.to_degrees()).normalized()
}

/// Coordinate range checks
pub struct UtmValidator;

impl UtmValidator {
    /// Latitude inside the UTM grid
    pub fn validate_latitude(lat: f64) -> Result<(), &'static str> {
        if !lat.is_finite() || !(MIN_LATITUDE..=MAX_LATITUDE).contains(&lat) {
            return Err("latitude outside the UTM grid (80S to 84N)");
        }
        Ok(())
    }

    pub fn validate_zone(zone: u8) -> Result<(), &'static str> {
        if !(1..=60).contains(&zone) {
            return Err("UTM zone must be between 1 and 60");
        }
        Ok(())
    }
}
