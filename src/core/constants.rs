//! Physical constants and fixed fusion parameters

/// Metres in one international nautical mile
pub const METERS_PER_NM: f64 = 1852.0;

/// Feet in one international nautical mile
pub const FEET_PER_NM: f64 = 6076.12;

/// Chi-squared value for 95% confidence at 2 degrees of freedom
pub const CHI_SQUARED_95_2DOF: f64 = 5.99;

/// Decimal places kept after every intermediate matrix/vector operation
pub const ROUNDING_DECIMALS: u32 = 4;

/// Nautical miles per degree used by the flat small-angle inverse transform
pub const NM_PER_DEGREE: f64 = 60.0;

/// WGS84 semi-major axis (meters)
pub const WGS84_A: f64 = 6378137.0;

/// WGS84 flattening
pub const WGS84_F: f64 = 1.0 / 298.257223563;

/// WGS84 semi-minor axis (meters)
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);
