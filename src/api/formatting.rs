//! Fusion report output formatting
//!
//! Text output leads with the two headline lines (combined center and CEP
//! radius) followed by a table of the local-frame ellipses. JSON output is
//! the serialized report.

use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::str::FromStr;

use crate::core::ErrorEllipse;
use crate::processing::pipeline::FusionReport;
use crate::validation::FusionError;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

/// Formatter for fusion reports
#[derive(Debug, Clone)]
pub struct ReportFormatter {
    format: OutputFormat,
    pretty: bool,
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Text)
    }
}

impl ReportFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format, pretty: true }
    }

    /// Single-line JSON output
    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }

    pub fn format(&self, report: &FusionReport) -> Result<String, serde_json::Error> {
        match self.format {
            OutputFormat::Text => Ok(format_text(report)),
            OutputFormat::Json if self.pretty => serde_json::to_string_pretty(report),
            OutputFormat::Json => serde_json::to_string(report),
        }
    }
}

/// The two headline lines
pub fn headline(report: &FusionReport) -> String {
    format!(
        "Combined Ellipse Center is {}\nCircular Error Probability Radius is {} ft",
        report.center_grid, report.cep_radius_ft
    )
}

/// Headline followed by the ellipse table
pub fn format_text(report: &FusionReport) -> String {
    let mut out = headline(report);
    out.push_str("\n\n");

    let _ = writeln!(
        out,
        "{:<10} {:>10} {:>10} {:>10} {:>10} {:>8}",
        "Ellipse", "x (NM)", "y (NM)", "major", "minor", "heading"
    );

    let inputs = report.inputs();
    for (i, ellipse) in inputs.iter().enumerate() {
        let _ = writeln!(out, "{}", table_row(&format!("{}", i + 1), ellipse));
    }
    if let Some(fused) = report.ellipses.last() {
        let _ = write!(out, "{}", table_row("Combined", fused));
    }

    out
}

fn table_row(label: &str, ellipse: &ErrorEllipse) -> String {
    format!(
        "{:<10} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>8.2}",
        label, ellipse.center.x, ellipse.center.y, ellipse.semi_major, ellipse.semi_minor, ellipse.orientation_deg
    )
}

/// User-facing message for a rejected request
pub fn format_error(error: &FusionError) -> String {
    format!("Error Processing Input: {}", error)
}
