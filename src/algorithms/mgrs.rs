//! Military Grid Reference System codec (WGS84 "AA" lettering).
//!
//! A grid reference is `<zone><band><column><row><easting><northing>`,
//! e.g. `51RVG9297470182`. Decoding yields the south-west corner of the
//! addressed cell. Polar (UPS) references are not supported.

use crate::algorithms::utm::{self, UtmCoordinate, UtmValidator};
use crate::core::{GeodeticPoint, GridReference};
use crate::validation::{FusionError, FusionResult};

/// Latitude band letters from 80S northward, 8 degrees each (X spans 12)
const BAND_LETTERS: &[u8; 20] = b"CDEFGHJKLMNPQRSTUVWX";

/// 100 km column letters, three sets of eight
const COLUMN_LETTERS: &[u8; 24] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";

/// 100 km row letters, cycling every 2000 km
const ROW_LETTERS: &[u8; 20] = b"ABCDEFGHJKLMNPQRSTUV";

/// Lowest northing (meters) reached by each latitude band, same order as BAND_LETTERS
const BAND_MIN_NORTHING: [f64; 20] = [
    1_100_000.0, 2_000_000.0, 2_800_000.0, 3_700_000.0, 4_600_000.0,
    5_500_000.0, 6_400_000.0, 7_300_000.0, 8_200_000.0, 9_100_000.0,
    0.0, 800_000.0, 1_700_000.0, 2_600_000.0, 3_500_000.0,
    4_400_000.0, 5_300_000.0, 6_200_000.0, 7_000_000.0, 7_900_000.0,
];

const ONE_HUNDRED_KM: f64 = 100_000.0;
const TWO_THOUSAND_KM: f64 = 2_000_000.0;

/// Tolerance when checking a decoded latitude against its band (degrees)
const BAND_TOLERANCE_DEG: f64 = 0.5;

/// Highest supported digits per axis (1 m cells)
pub const MAX_PRECISION: u8 = 5;

/// Parsed but not yet projected grid reference
#[derive(Debug, Clone, Copy, PartialEq)]
struct GridParts {
    zone: u8,
    band: usize,
    column: usize,
    row: usize,
    easting: f64,
    northing: f64,
    precision: u8,
}

/// Decode a grid reference to the geodetic position of its south-west corner
pub fn decode(grid: &GridReference) -> FusionResult<GeodeticPoint> {
    let parts = parse(grid.as_str()).map_err(|reason| FusionError::invalid_coordinate(grid.as_str(), reason))?;
    let utm = to_utm(&parts).map_err(|reason| FusionError::invalid_coordinate(grid.as_str(), reason))?;
    let point = utm::to_geodetic(&utm);

    let (south, north) = band_limits(parts.band);
    if point.lat < south - BAND_TOLERANCE_DEG || point.lat > north + BAND_TOLERANCE_DEG {
        return Err(FusionError::invalid_coordinate(
            grid.as_str(),
            format!(
                "latitude {:.4} lies outside band {}",
                point.lat, BAND_LETTERS[parts.band] as char
            ),
        ));
    }

    Ok(point)
}

/// Encode a geodetic position with `precision` digits per axis (1..=5)
pub fn encode(point: &GeodeticPoint, precision: u8) -> FusionResult<GridReference> {
    let label = format!("({:.6}, {:.6})", point.lat, point.lon);
    if !(1..=MAX_PRECISION).contains(&precision) {
        return Err(FusionError::invalid_coordinate(label, "grid precision must be 1 to 5 digits"));
    }
    if !point.lon.is_finite() {
        return Err(FusionError::invalid_coordinate(label, "longitude is not finite"));
    }
    UtmValidator::validate_latitude(point.lat).map_err(|reason| FusionError::invalid_coordinate(label.clone(), reason))?;

    let point = point.normalized();
    let utm = utm::from_geodetic(&point);
    let band = band_index(point.lat);

    let divisor = 10f64.powi((MAX_PRECISION - precision) as i32);
    let easting = (utm.easting / divisor).round_ties_even() * divisor;
    let northing = (utm.northing / divisor).round_ties_even() * divisor;

    let column_in_set = (easting / ONE_HUNDRED_KM).floor() as i64;
    if !(1..=8).contains(&column_in_set) {
        return Err(FusionError::invalid_coordinate(label, "easting outside the zone's 100 km columns"));
    }
    let column = column_origin(utm.zone) + (column_in_set as usize - 1);

    let row_in_cycle = ((northing / ONE_HUNDRED_KM).floor() as i64).rem_euclid(20) as usize;
    let row = (row_in_cycle + row_offset(utm.zone)) % 20;

    let east_digits = (easting.rem_euclid(ONE_HUNDRED_KM) / divisor).floor() as u64;
    let north_digits = (northing.rem_euclid(ONE_HUNDRED_KM) / divisor).floor() as u64;
    let width = precision as usize;

    Ok(GridReference::new(&format!(
        "{:02}{}{}{}{:0width$}{:0width$}",
        utm.zone,
        BAND_LETTERS[band] as char,
        COLUMN_LETTERS[column] as char,
        ROW_LETTERS[row] as char,
        east_digits,
        north_digits,
        width = width
    )))
}

fn parse(raw: &str) -> Result<GridParts, String> {
    let bytes = raw.as_bytes();
    if !raw.is_ascii() {
        return Err("grid reference must be ASCII".to_string());
    }

    let zone_len = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if zone_len == 0 || zone_len > 2 {
        return Err("expected a 1 or 2 digit zone number".to_string());
    }
    let zone: u8 = raw[..zone_len].parse().map_err(|_| "unreadable zone number".to_string())?;
    UtmValidator::validate_zone(zone)?;

    let letters = &bytes[zone_len..];
    if letters.len() < 3 {
        return Err("expected band and 100 km square letters after the zone".to_string());
    }

    let band = BAND_LETTERS
        .iter()
        .position(|&b| b == letters[0])
        .ok_or_else(|| format!("'{}' is not a UTM latitude band", letters[0] as char))?;

    let column = COLUMN_LETTERS
        .iter()
        .position(|&b| b == letters[1])
        .ok_or_else(|| format!("'{}' is not a 100 km column letter", letters[1] as char))?;
    let origin = column_origin(zone);
    if column < origin || column >= origin + 8 {
        return Err(format!("column letter '{}' is not used in zone {}", letters[1] as char, zone));
    }

    let row = ROW_LETTERS
        .iter()
        .position(|&b| b == letters[2])
        .ok_or_else(|| format!("'{}' is not a 100 km row letter", letters[2] as char))?;

    let digits = &raw[zone_len + 3..];
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err("easting and northing must be digits".to_string());
    }
    if digits.len() % 2 != 0 || digits.len() > 2 * MAX_PRECISION as usize {
        return Err("easting and northing must have the same number of digits (at most 5 each)".to_string());
    }

    let precision = (digits.len() / 2) as u8;
    let scale = 10f64.powi((MAX_PRECISION - precision) as i32);
    let (east, north) = digits.split_at(precision as usize);
    let easting = if precision == 0 { 0.0 } else { east.parse::<u32>().map_err(|e| e.to_string())? as f64 * scale };
    let northing = if precision == 0 { 0.0 } else { north.parse::<u32>().map_err(|e| e.to_string())? as f64 * scale };

    Ok(GridParts {
        zone,
        band,
        column,
        row,
        easting,
        northing,
        precision,
    })
}

fn to_utm(parts: &GridParts) -> Result<UtmCoordinate, String> {
    let grid_easting = (parts.column - column_origin(parts.zone) + 1) as f64 * ONE_HUNDRED_KM;

    // Northing of the row letter within the 2000 km cycle
    let row_in_cycle = (parts.row as i64 - row_offset(parts.zone) as i64).rem_euclid(20);
    let mut grid_northing = row_in_cycle as f64 * ONE_HUNDRED_KM;

    // Resolve the cycle from the band's lowest northing
    let min_northing = BAND_MIN_NORTHING[parts.band];
    let scaled_min = min_northing % TWO_THOUSAND_KM;
    grid_northing -= scaled_min;
    if grid_northing < 0.0 {
        grid_northing += TWO_THOUSAND_KM;
    }
    grid_northing += min_northing;

    let north = band_is_north(parts.band);
    let northing = grid_northing + parts.northing;
    if !north && northing > utm::FALSE_NORTHING_SOUTH {
        return Err("northing beyond the equator for a southern band".to_string());
    }

    Ok(UtmCoordinate {
        zone: parts.zone,
        north,
        easting: grid_easting + parts.easting,
        northing,
    })
}

fn column_origin(zone: u8) -> usize {
    ((zone as usize - 1) % 3) * 8
}

fn row_offset(zone: u8) -> usize {
    if zone % 2 == 0 {
        5
    } else {
        0
    }
}

fn band_index(lat: f64) -> usize {
    (((lat + 80.0) / 8.0).floor() as i64).clamp(0, 19) as usize
}

fn band_is_north(band: usize) -> bool {
    band >= 10
}

fn band_limits(band: usize) -> (f64, f64) {
    let south = -80.0 + 8.0 * band as f64;
    let north = if band == 19 { 84.0 } else { south + 8.0 };
    (south, north)
}
