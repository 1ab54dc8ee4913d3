//! Figure model for rendering fused ellipses.
//!
//! A [`Figure`] is an explicit value built from a [`FusionReport`]: one
//! closed outline per ellipse, inputs first and the combined ellipse last.
//! It serializes to JSON for external plotting and renders to SVG.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt::Write;

use crate::algorithms::angles::heading_to_math_deg;
use crate::core::ErrorEllipse;
use crate::processing::pipeline::FusionReport;

/// Points per outline, first and last coincide
pub const OUTLINE_POINTS: usize = 100;

pub const TITLE: &str = "Combining Error Ellipses";
pub const X_LABEL: &str = "Relative Longitude in NM";
pub const Y_LABEL: &str = "Relative Latitude in NM";

const PALETTE: [&str; 6] = ["#1f77b4", "#ff7f0e", "#2ca02c", "#9467bd", "#8c564b", "#e377c2"];
const COMBINED_COLOR: &str = "#d62728";

/// One labelled outline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Whether this is the combined ellipse
    pub combined: bool,
}

/// Axis-aligned plot bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub traces: Vec<Trace>,
}

/// Parametric outline of an ellipse in the local frame
pub fn outline(ellipse: &ErrorEllipse, points: usize) -> (Vec<f64>, Vec<f64>) {
    let (sin, cos) = heading_to_math_deg(ellipse.orientation_deg).to_radians().sin_cos();
    let steps = points.saturating_sub(1).max(1) as f64;

    (0..points)
        .map(|i| {
            let t = 2.0 * PI * i as f64 / steps;
            let u = ellipse.semi_major * t.cos();
            let v = ellipse.semi_minor * t.sin();
            (
                ellipse.center.x + u * cos - v * sin,
                ellipse.center.y + u * sin + v * cos,
            )
        })
        .unzip()
}

impl Figure {
    pub fn from_report(report: &FusionReport) -> Self {
        let mut traces: Vec<Trace> = report
            .inputs()
            .iter()
            .enumerate()
            .map(|(i, ellipse)| {
                let (x, y) = outline(ellipse, OUTLINE_POINTS);
                Trace {
                    label: format!("Ellipse {}", i + 1),
                    x,
                    y,
                    combined: false,
                }
            })
            .collect();

        let (x, y) = outline(&report.fused.as_ellipse(), OUTLINE_POINTS);
        traces.push(Trace {
            label: format!(
                "Combined Ellipse\nCenter: {}\nCEP: {} ft",
                report.center_grid, report.cep_radius_ft
            ),
            x,
            y,
            combined: true,
        });

        Self {
            title: TITLE.to_string(),
            x_label: X_LABEL.to_string(),
            y_label: Y_LABEL.to_string(),
            traces,
        }
    }

    /// Equal-aspect bounds around every trace with a 5% margin
    pub fn bounds(&self) -> Bounds {
        let xs = self.traces.iter().flat_map(|t| t.x.iter().copied());
        let ys = self.traces.iter().flat_map(|t| t.y.iter().copied());
        let (min_x, max_x) = xs.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        let (min_y, max_y) = ys.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

        if !min_x.is_finite() || !min_y.is_finite() {
            return Bounds {
                min_x: -1.0,
                max_x: 1.0,
                min_y: -1.0,
                max_y: 1.0,
            };
        }

        let half = 0.5 * (max_x - min_x).max(max_y - min_y).max(1e-6) * 1.05;
        let (cx, cy) = (0.5 * (min_x + max_x), 0.5 * (min_y + max_y));
        Bounds {
            min_x: cx - half,
            max_x: cx + half,
            min_y: cy - half,
            max_y: cy + half,
        }
    }

    /// Render as a standalone SVG document
    pub fn to_svg(&self, width: u32, height: u32) -> String {
        let margin = 60.0;
        let (w, h) = (width as f64, height as f64);
        let plot = (w - 2.0 * margin).min(h - 2.0 * margin).max(1.0);
        let bounds = self.bounds();
        let scale = plot / bounds.width();
        let left = (w - plot) / 2.0;
        let top = (h - plot) / 2.0;
        let px = |x: f64| left + (x - bounds.min_x) * scale;
        let py = |y: f64| top + (bounds.max_y - y) * scale;

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = width,
            h = height
        );
        let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
        let _ = writeln!(
            svg,
            r##"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="none" stroke="#888"/>"##,
            left, top, plot, plot
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="16">{}</text>"#,
            w / 2.0,
            top / 2.0,
            escape(&self.title)
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="12">{}</text>"#,
            w / 2.0,
            h - margin / 3.0,
            escape(&self.x_label)
        );
        let _ = writeln!(
            svg,
            r#"<text x="{x:.1}" y="{y:.1}" text-anchor="middle" font-size="12" transform="rotate(-90 {x:.1} {y:.1})">{label}</text>"#,
            x = margin / 3.0,
            y = h / 2.0,
            label = escape(&self.y_label)
        );

        let mut palette = PALETTE.iter().cycle();
        for (i, trace) in self.traces.iter().enumerate() {
            let color = if trace.combined {
                COMBINED_COLOR
            } else {
                palette.next().copied().unwrap_or(COMBINED_COLOR)
            };
            let points: Vec<String> = trace
                .x
                .iter()
                .zip(&trace.y)
                .map(|(&x, &y)| format!("{:.2},{:.2}", px(x), py(y)))
                .collect();
            let _ = writeln!(
                svg,
                r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{}"/>"#,
                points.join(" "),
                color,
                if trace.combined { 2.5 } else { 1.5 }
            );

            for (line, text) in trace.label.lines().enumerate() {
                let _ = writeln!(
                    svg,
                    r#"<text x="{:.1}" y="{:.1}" font-size="11" fill="{}">{}</text>"#,
                    left + 8.0,
                    top + 14.0 * (i * 3 + line + 1) as f64,
                    color,
                    escape(text)
                );
            }
        }

        svg.push_str("</svg>\n");
        svg
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LocalPoint;
    use crate::processing::pipeline::{sample_records, EllipseFusionPipeline};

    fn figure() -> Figure {
        Figure::from_report(&EllipseFusionPipeline::new().run(&sample_records()).unwrap())
    }

    #[test]
    fn test_outline_is_closed() {
        let ellipse = ErrorEllipse::new(LocalPoint::new(1.0, 2.0), 3.0, 1.0, 30.0);
        let (x, y) = outline(&ellipse, OUTLINE_POINTS);

        assert_eq!(x.len(), OUTLINE_POINTS);
        assert!((x[0] - x[OUTLINE_POINTS - 1]).abs() < 1e-9);
        assert!((y[0] - y[OUTLINE_POINTS - 1]).abs() < 1e-9);
    }

    #[test]
    fn test_outline_follows_heading() {
        // Heading 0 puts the major axis on the north-south line
        let ellipse = ErrorEllipse::new(LocalPoint::ORIGIN, 3.0, 1.0, 0.0);
        let (x, y) = outline(&ellipse, OUTLINE_POINTS);

        assert!(x[0].abs() < 1e-9);
        assert!((y[0] - 3.0).abs() < 1e-9);
        let widest = x.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        assert!(widest <= 1.0 + 1e-9);
    }

    #[test]
    fn test_figure_labels() {
        let figure = figure();
        assert_eq!(figure.title, "Combining Error Ellipses");
        assert_eq!(figure.traces.len(), 3);
        assert_eq!(figure.traces[0].label, "Ellipse 1");
        assert_eq!(figure.traces[1].label, "Ellipse 2");

        let combined = &figure.traces[2];
        assert!(combined.combined);
        assert_eq!(
            combined.label,
            "Combined Ellipse\nCenter: 51RVG9373472343\nCEP: 5107.5865 ft"
        );
    }

    #[test]
    fn test_bounds_are_square_and_cover_traces() {
        let figure = figure();
        let bounds = figure.bounds();

        assert!((bounds.width() - bounds.height()).abs() < 1e-9);
        for trace in &figure.traces {
            assert!(trace.x.iter().all(|&x| x >= bounds.min_x && x <= bounds.max_x));
            assert!(trace.y.iter().all(|&y| y >= bounds.min_y && y <= bounds.max_y));
        }
    }

    #[test]
    fn test_empty_figure_bounds() {
        let figure = Figure {
            title: TITLE.to_string(),
            x_label: X_LABEL.to_string(),
            y_label: Y_LABEL.to_string(),
            traces: Vec::new(),
        };
        assert_eq!(figure.bounds().width(), 2.0);
    }

    #[test]
    fn test_svg_output() {
        let svg = figure().to_svg(800, 800);

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<polyline").count(), 3);
        assert!(svg.contains("Relative Longitude in NM"));
        assert!(svg.contains("CEP: 5107.5865 ft"));
    }
}
