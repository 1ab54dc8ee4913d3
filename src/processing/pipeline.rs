//! End-to-end fusion request pipeline
//!
//! Transform -> Parameterize -> Fuse -> Extract -> inverse Transform. The
//! first record's grid reference anchors the local frame. Any failure aborts
//! the whole request.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use crate::algorithms::coordinates::CoordinateTransformer;
use crate::algorithms::ellipse::NumericSettings;
use crate::algorithms::{extraction, fusion};
use crate::processing::parser::validate_record;
use crate::core::{EllipseRecord, ErrorEllipse, FusedResult, GridReference};
use crate::utils::config::FusionConfig;
use crate::validation::{FusionError, FusionResult};

/// Outcome of one fusion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionReport {
    /// Grid reference of the fused center
    pub center_grid: GridReference,
    pub cep_radius_ft: f64,
    /// Fused ellipse in the local frame
    pub fused: FusedResult,
    /// Input ellipses in the local frame, fused ellipse appended last
    pub ellipses: Vec<ErrorEllipse>,
}

impl FusionReport {
    /// Input ellipses without the fused one
    pub fn inputs(&self) -> &[ErrorEllipse] {
        &self.ellipses[..self.ellipses.len().saturating_sub(1)]
    }
}

/// Stateless fusion pipeline; every call works on its own data
#[derive(Debug, Clone, Default)]
pub struct EllipseFusionPipeline {
    transformer: CoordinateTransformer,
    settings: NumericSettings,
}

impl EllipseFusionPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &FusionConfig) -> Self {
        Self {
            transformer: CoordinateTransformer::new()
                .with_inverse(config.inverse_transform)
                .with_grid_precision(config.grid_precision)
                .with_decimals(config.decimals),
            settings: config.numeric_settings(),
        }
    }

    /// Fuse `records` into a single ellipse
    pub fn run(&self, records: &[EllipseRecord]) -> FusionResult<FusionReport> {
        let span = info_span!("fusion", records = records.len());
        let _guard = span.enter();

        self.fuse_records(records).inspect_err(|err| {
            warn!(kind = err.kind_name(), class = ?err.class(), error = %err, "fusion request rejected");
        })
    }

    fn fuse_records(&self, records: &[EllipseRecord]) -> FusionResult<FusionReport> {
        let reference = records
            .first()
            .map(|record| record.grid.clone())
            .ok_or_else(|| FusionError::malformed_input("at least one ellipse record is required"))?;
        for (index, record) in records.iter().enumerate() {
            validate_record(index, record)?;
        }

        let grids: Vec<GridReference> = records.iter().map(|record| record.grid.clone()).collect();
        let centers = self.transformer.to_local(&reference, &grids)?;
        debug!(reference = %reference, ?centers, "local centers");

        let mut ellipses: Vec<ErrorEllipse> = records
            .iter()
            .zip(centers)
            .map(|(record, center)| {
                ErrorEllipse::new(
                    center,
                    record.semi_major_nm,
                    record.semi_minor_nm,
                    record.orientation_deg,
                )
            })
            .collect();

        let estimate = fusion::fuse(&ellipses, &self.settings)?;
        debug!(covariance = %estimate.covariance, "fused covariance");

        let fused = extraction::extract(&estimate, &self.settings)?;
        let center_grid = self.transformer.to_grid(&reference, &fused.center)?;

        info!(
            center = %center_grid,
            cep_radius_ft = fused.cep_radius_ft,
            semi_major = fused.semi_major,
            semi_minor = fused.semi_minor,
            orientation_deg = fused.orientation_deg,
            "combined ellipse"
        );

        ellipses.push(fused.as_ellipse());
        Ok(FusionReport {
            center_grid,
            cep_radius_ft: fused.cep_radius_ft,
            fused,
            ellipses,
        })
    }
}

/// The two-ellipse sample used by the `demo` command
pub fn sample_records() -> Vec<EllipseRecord> {
    vec![
        EllipseRecord::new("51RVG9297470182", 3.7757, 0.56, 29.16),
        EllipseRecord::new("51RVG9116274139", 1.73, 0.86, 123.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::coordinates::InverseTransform;
    use crate::core::LocalPoint;
    use crate::validation::ErrorClass;

    #[test]
    fn test_sample_request() {
        let report = EllipseFusionPipeline::new().run(&sample_records()).unwrap();

        assert_eq!(report.center_grid, GridReference::new("51RVG9373472343"));
        assert_eq!(report.cep_radius_ft, 5107.5865);
        assert_eq!(report.fused.center, LocalPoint::new(0.4484, 1.1712));
        assert_eq!(report.fused.semi_major, 0.8406);
        assert_eq!(report.fused.semi_minor, 0.5324);
        assert_eq!(report.fused.orientation_deg, 27.3113);
    }

    #[test]
    fn test_report_lists_fused_ellipse_last() {
        let report = EllipseFusionPipeline::new().run(&sample_records()).unwrap();

        assert_eq!(report.ellipses.len(), 3);
        assert_eq!(report.inputs().len(), 2);
        assert_eq!(report.ellipses[0].center, LocalPoint::ORIGIN);
        assert_eq!(report.ellipses[1].center, LocalPoint::new(-0.9753, 2.139));
        assert_eq!(report.ellipses[1].orientation_deg, 123.0);
        assert_eq!(report.ellipses[2], report.fused.as_ellipse());
    }

    #[test]
    fn test_single_record_round_trips() {
        let records = vec![EllipseRecord::new("51RVG9297470182", 2.0, 1.0, 30.0)];
        let report = EllipseFusionPipeline::new().run(&records).unwrap();

        assert_eq!(report.center_grid, records[0].grid);
        assert!((report.fused.semi_major - 2.0).abs() < 1e-3);
        assert!((report.fused.semi_minor - 1.0).abs() < 1e-3);
        assert!((report.fused.orientation_deg - 30.0).abs() < 0.05);
    }

    #[test]
    fn test_fusion_is_order_independent() {
        let pipeline = EllipseFusionPipeline::new();
        let forward = pipeline.run(&sample_records()).unwrap();
        let mut reversed = sample_records();
        reversed.reverse();
        let backward = pipeline.run(&reversed).unwrap();

        // The reference moves to the other record, the shape does not
        assert_eq!(forward.fused.semi_major, backward.fused.semi_major);
        assert_eq!(forward.cep_radius_ft, backward.cep_radius_ft);
        assert_eq!(backward.ellipses[1].center, LocalPoint::new(0.9756, -2.1389));
    }

    #[test]
    fn test_ellipsoidal_inverse_config() {
        let config = FusionConfig {
            inverse_transform: InverseTransform::Ellipsoidal,
            ..Default::default()
        };
        let report = EllipseFusionPipeline::from_config(&config).run(&sample_records()).unwrap();

        assert_eq!(report.center_grid, GridReference::new("51RVG9380572350"));
        assert_eq!(report.cep_radius_ft, 5107.5865);
    }

    #[test]
    fn test_grid_precision_config() {
        let config = FusionConfig {
            grid_precision: 3,
            ..Default::default()
        };
        let report = EllipseFusionPipeline::from_config(&config).run(&sample_records()).unwrap();
        assert_eq!(report.center_grid, GridReference::new("51RVG937723"));
    }

    #[test]
    fn test_invalid_grid_aborts_request() {
        let mut records = sample_records();
        records.push(EllipseRecord::new("51RVG12345", 1.0, 0.5, 10.0));
        records.push(EllipseRecord::new("not-a-grid", 1.0, 0.5, 10.0));

        let err = EllipseFusionPipeline::new().run(&records).unwrap_err();
        assert!(matches!(err, FusionError::InvalidCoordinate { .. }));
        assert_eq!(err.class(), ErrorClass::Input);
    }

    #[test]
    fn test_degenerate_ellipse_is_domain_error() {
        let records = vec![EllipseRecord::new("51RVG9297470182", 1.0, 0.001, 0.0)];
        let err = EllipseFusionPipeline::new().run(&records).unwrap_err();
        assert!(matches!(err, FusionError::SingularMatrix { .. }));
        assert_eq!(err.class(), ErrorClass::Domain);
    }

    #[test]
    fn test_records_are_validated_before_fusion() {
        let pipeline = EllipseFusionPipeline::new();

        let negative = vec![EllipseRecord::new("51RVG9297470182", -2.0, 3.0, 400.0)];
        let err = pipeline.run(&negative).unwrap_err();
        assert!(matches!(err, FusionError::InvalidInputShape { record: Some(0), .. }));
        assert_eq!(err.class(), ErrorClass::Input);

        let mut records = sample_records();
        records.push(EllipseRecord::new("51RVG9297470182", 1.0, 0.5, f64::NAN));
        let err = pipeline.run(&records).unwrap_err();
        assert!(matches!(err, FusionError::InvalidInputShape { record: Some(2), .. }));
        assert_eq!(err.class(), ErrorClass::Input);
    }

    #[test]
    fn test_empty_request() {
        let err = EllipseFusionPipeline::new().run(&[]).unwrap_err();
        assert!(matches!(err, FusionError::InvalidInputShape { record: None, .. }));
    }
}
