//! Core data types for the ellipse fusion system

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

use crate::core::constants::FEET_PER_NM;

/// Geodetic position (degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeodeticPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// True when latitude is within [-90, 90] and longitude within (-180, 180]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && self.lon > -180.0
            && self.lon <= 180.0
    }

    /// Wrap longitude into (-180, 180]
    pub fn normalized(self) -> Self {
        let mut lon = (self.lon + 180.0).rem_euclid(360.0) - 180.0;
        if lon == -180.0 {
            lon = 180.0;
        }
        Self { lat: self.lat, lon }
    }
}

/// Alphanumeric grid reference (MGRS), stored upper-case without spaces
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridReference(String);

impl GridReference {
    /// Wrap a raw grid string; whitespace is removed and letters upper-cased.
    /// The string is not validated until it is decoded.
    pub fn new(raw: &str) -> Self {
        Self(
            raw.chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| c.to_ascii_uppercase())
                .collect(),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GridReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GridReference {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Offset from a reference point in nautical miles (x east, y north)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalPoint {
    pub x: f64,
    pub y: f64,
}

impl LocalPoint {
    pub const ORIGIN: LocalPoint = LocalPoint { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_nm(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// Gaussian error ellipse in the local frame.
///
/// `orientation_deg` is the compass heading of the major axis, clockwise
/// from north, in [0, 180).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorEllipse {
    pub center: LocalPoint,
    pub semi_major: f64,
    pub semi_minor: f64,
    pub orientation_deg: f64,
}

impl ErrorEllipse {
    pub fn new(center: LocalPoint, semi_major: f64, semi_minor: f64, orientation_deg: f64) -> Self {
        Self {
            center,
            semi_major,
            semi_minor,
            orientation_deg,
        }
    }

    /// Area in square nautical miles
    pub fn area(&self) -> f64 {
        PI * self.semi_major * self.semi_minor
    }
}

/// One input record as received at the boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EllipseRecord {
    pub grid: GridReference,
    pub semi_major_nm: f64,
    pub semi_minor_nm: f64,
    pub orientation_deg: f64,
}

impl EllipseRecord {
    pub fn new(grid: &str, semi_major_nm: f64, semi_minor_nm: f64, orientation_deg: f64) -> Self {
        Self {
            grid: GridReference::new(grid),
            semi_major_nm,
            semi_minor_nm,
            orientation_deg,
        }
    }
}

/// Fused ellipse in the local frame plus its CEP radius
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusedResult {
    pub center: LocalPoint,
    pub semi_major: f64,
    pub semi_minor: f64,
    pub orientation_deg: f64,
    /// Fused semi-major axis in feet
    pub cep_radius_ft: f64,
}

impl FusedResult {
    pub fn as_ellipse(&self) -> ErrorEllipse {
        ErrorEllipse::new(self.center, self.semi_major, self.semi_minor, self.orientation_deg)
    }
}

/// CEP radius in feet for a semi-major axis in nautical miles
pub fn cep_radius_feet(semi_major_nm: f64) -> f64 {
    semi_major_nm * FEET_PER_NM
}
