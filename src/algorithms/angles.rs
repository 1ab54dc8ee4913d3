//! Compass heading <-> mathematical angle conversion.
//!
//! Headings are measured clockwise from north, mathematical angles
//! counter-clockwise from the +x (east) axis. Both directions are the same
//! reflection about the 45 degree line: `angle = 90 - heading`. Ellipse axes
//! are undirected, so axis headings are folded into [0, 180).

/// Convert a compass heading (degrees) to a mathematical angle (degrees)
pub fn heading_to_math_deg(heading_deg: f64) -> f64 {
    90.0 - heading_deg
}

/// Convert a mathematical angle (degrees) to a compass heading (degrees)
pub fn math_to_heading_deg(angle_deg: f64) -> f64 {
    90.0 - angle_deg
}

/// Fold an undirected axis heading into [0, 180)
pub fn fold_axis_heading(heading_deg: f64) -> f64 {
    let folded = heading_deg.rem_euclid(180.0);
    // rem_euclid can return 180.0 for tiny negative inputs
    if folded >= 180.0 {
        0.0
    } else {
        folded
    }
}

/// Heading of the axis spanned by the direction vector (x east, y north)
pub fn axis_heading_of(x: f64, y: f64) -> f64 {
    fold_axis_heading(math_to_heading_deg(y.atan2(x).to_degrees()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_is_involution() {
        for heading in [0.0, 29.16, 90.0, 123.0, 179.9] {
            let back = math_to_heading_deg(heading_to_math_deg(heading));
            assert!((back - heading).abs() < 1e-12);
        }
    }

    #[test]
    fn test_axis_heading() {
        assert!((axis_heading_of(0.0, 1.0) - 0.0).abs() < 1e-12);
        assert!((axis_heading_of(0.0, -1.0) - 0.0).abs() < 1e-12);
        assert!((axis_heading_of(1.0, 0.0) - 90.0).abs() < 1e-12);
        assert!((axis_heading_of(1.0, 1.0) - 45.0).abs() < 1e-12);
        assert!((axis_heading_of(-1.0, -1.0) - 45.0).abs() < 1e-12);
        assert!((axis_heading_of(1.0, -1.0) - 135.0).abs() < 1e-12);
        assert!((axis_heading_of(-1.0, 1.0) - 135.0).abs() < 1e-12);
    }

    #[test]
    fn test_fold() {
        assert_eq!(fold_axis_heading(180.0), 0.0);
        assert!((fold_axis_heading(-30.0) - 150.0).abs() < 1e-12);
        assert!((fold_axis_heading(200.0) - 20.0).abs() < 1e-12);
    }
}
