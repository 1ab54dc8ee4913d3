//! Grid reference <-> local planar frame transformation
//!
//! The local frame is centred on a reference grid reference, with x pointing
//! east and y pointing north, both in nautical miles.
//! - Forward: ellipsoidal distance split along the spherical initial bearing
//! - Inverse: flat small-angle approximation (default) or the ellipsoidal
//!   direct solution

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::algorithms::{geodesy, mgrs, rounding::round_to};
use crate::core::{GeodeticPoint, GridReference, LocalPoint, METERS_PER_NM, NM_PER_DEGREE, ROUNDING_DECIMALS};
use crate::validation::{FusionError, FusionResult};

/// How local offsets are mapped back to grid references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InverseTransform {
    /// Divide both offsets by 60 NM per degree and add to the reference.
    /// Ignores the cos(latitude) shrinkage of longitude degrees, but matches
    /// previously recorded outputs.
    #[default]
    FlatSmallAngle,
    /// Walk the geodesic from the reference along atan2(x, y) for hypot(x, y)
    Ellipsoidal,
}

/// Converts between grid references and the local nautical-mile frame
#[derive(Debug, Clone)]
pub struct CoordinateTransformer {
    inverse: InverseTransform,
    grid_precision: u8,
    decimals: u32,
}

impl Default for CoordinateTransformer {
    fn default() -> Self {
        Self {
            inverse: InverseTransform::FlatSmallAngle,
            grid_precision: mgrs::MAX_PRECISION,
            decimals: ROUNDING_DECIMALS,
        }
    }
}

impl CoordinateTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the inverse transform
    pub fn with_inverse(mut self, inverse: InverseTransform) -> Self {
        self.inverse = inverse;
        self
    }

    /// Digits per axis of emitted grid references (1..=5)
    pub fn with_grid_precision(mut self, precision: u8) -> Self {
        self.grid_precision = precision;
        self
    }

    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    /// Convert each target to its offset from `reference`.
    ///
    /// Every grid string is decoded before any offset is computed, so an
    /// invalid target fails the whole call.
    pub fn to_local(&self, reference: &GridReference, targets: &[GridReference]) -> FusionResult<Vec<LocalPoint>> {
        let origin = mgrs::decode(reference)?;
        let points = targets.iter().map(mgrs::decode).collect::<FusionResult<Vec<_>>>()?;

        points.iter().map(|point| self.local_offset(&origin, point)).collect()
    }

    /// Offset of `target` from `origin`, rounded to the configured decimals
    pub fn local_offset(&self, origin: &GeodeticPoint, target: &GeodeticPoint) -> FusionResult<LocalPoint> {
        let distance_nm = geodesy::inverse(origin, target)?.distance_m / METERS_PER_NM;
        let bearing = geodesy::initial_bearing_deg(origin, target).to_radians();

        let local = LocalPoint::new(
            round_to(distance_nm * bearing.sin(), self.decimals),
            round_to(distance_nm * bearing.cos(), self.decimals),
        );
        trace!(
            distance_nm,
            bearing_deg = bearing.to_degrees(),
            x = local.x,
            y = local.y,
            "local offset"
        );
        Ok(local)
    }

    /// Grid reference reached by applying `offset` to `reference`
    pub fn to_grid(&self, reference: &GridReference, offset: &LocalPoint) -> FusionResult<GridReference> {
        let origin = mgrs::decode(reference)?;
        let target = self.apply_offset(&origin, offset)?;
        mgrs::encode(&target, self.grid_precision)
    }

    /// Geodetic position reached by applying `offset` to `origin`
    pub fn apply_offset(&self, origin: &GeodeticPoint, offset: &LocalPoint) -> FusionResult<GeodeticPoint> {
        let target = match self.inverse {
            InverseTransform::FlatSmallAngle => GeodeticPoint::new(
                origin.lat + offset.y / NM_PER_DEGREE,
                origin.lon + offset.x / NM_PER_DEGREE,
            ),
            InverseTransform::Ellipsoidal => {
                let azimuth_deg = offset.x.atan2(offset.y).to_degrees();
                geodesy::direct(origin, azimuth_deg, offset.distance_nm() * METERS_PER_NM)?
            }
        };

        // Longitude may wrap past the antimeridian, latitude may not pass a pole
        if !target.normalized().is_valid() {
            return Err(FusionError::invalid_coordinate(
                format!("({:.6}, {:.6})", target.lat, target.lon),
                "offset leaves the geodetic range",
            ));
        }
        Ok(target)
    }
}
