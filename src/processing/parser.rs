//! Boundary parser for ellipse records.
//!
//! Accepts a JSON array whose elements are either positional
//! `[grid, semi_major_nm, semi_minor_nm, orientation_deg]` arrays or objects
//! with those field names. Record indices in errors are zero-based.

use serde_json::Value;

use crate::core::{EllipseRecord, GridReference};
use crate::validation::{FusionError, FusionResult};

const FIELDS: [&str; 4] = ["grid", "semi_major_nm", "semi_minor_nm", "orientation_deg"];

/// Parse and validate a request document
pub fn parse_records(json: &str) -> FusionResult<Vec<EllipseRecord>> {
    let document: Value =
        serde_json::from_str(json).map_err(|e| FusionError::malformed_input(format!("not valid JSON: {}", e)))?;

    let elements = document
        .as_array()
        .ok_or_else(|| FusionError::malformed_input("expected a JSON array of ellipse records"))?;

    if elements.is_empty() {
        return Err(FusionError::malformed_input("at least one ellipse record is required"));
    }

    elements
        .iter()
        .enumerate()
        .map(|(index, element)| {
            let record = parse_element(index, element)?;
            validate_record(index, &record)?;
            Ok(record)
        })
        .collect()
}

/// Range checks on a single record
pub fn validate_record(index: usize, record: &EllipseRecord) -> FusionResult<()> {
    let numbers = [
        ("semi_major_nm", record.semi_major_nm),
        ("semi_minor_nm", record.semi_minor_nm),
        ("orientation_deg", record.orientation_deg),
    ];
    for (name, value) in numbers {
        if !value.is_finite() {
            return Err(FusionError::invalid_input(index, format!("{} must be finite", name)));
        }
    }

    if record.grid.as_str().is_empty() {
        return Err(FusionError::invalid_input(index, "grid reference is empty"));
    }
    if record.semi_major_nm <= 0.0 {
        return Err(FusionError::invalid_input(index, "semi-major axis must be positive"));
    }
    if record.semi_minor_nm <= 0.0 {
        return Err(FusionError::invalid_input(index, "semi-minor axis must be positive"));
    }
    if record.semi_minor_nm > record.semi_major_nm {
        return Err(FusionError::invalid_input(index, "semi-minor axis exceeds semi-major axis"));
    }
    if !(0.0..180.0).contains(&record.orientation_deg) {
        return Err(FusionError::invalid_input(index, "orientation must be in [0, 180) degrees"));
    }

    Ok(())
}

fn parse_element(index: usize, element: &Value) -> FusionResult<EllipseRecord> {
    let values: Vec<&Value> = match element {
        Value::Array(items) => {
            if items.len() != FIELDS.len() {
                return Err(FusionError::invalid_input(
                    index,
                    format!("expected {} values, found {}", FIELDS.len(), items.len()),
                ));
            }
            items.iter().collect()
        }
        Value::Object(map) => FIELDS
            .iter()
            .map(|field| {
                map.get(*field)
                    .ok_or_else(|| FusionError::invalid_input(index, format!("missing field '{}'", field)))
            })
            .collect::<FusionResult<_>>()?,
        _ => {
            return Err(FusionError::invalid_input(index, "expected an array or an object"));
        }
    };

    let grid = values[0]
        .as_str()
        .ok_or_else(|| FusionError::invalid_input(index, "grid must be a string"))?;

    Ok(EllipseRecord {
        grid: GridReference::new(grid),
        semi_major_nm: number(index, FIELDS[1], values[1])?,
        semi_minor_nm: number(index, FIELDS[2], values[2])?,
        orientation_deg: number(index, FIELDS[3], values[3])?,
    })
}

fn number(index: usize, field: &str, value: &Value) -> FusionResult<f64> {
    value
        .as_f64()
        .ok_or_else(|| FusionError::invalid_input(index, format!("{} must be a number", field)))
}
