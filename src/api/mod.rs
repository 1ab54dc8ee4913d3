//! Output surfaces: report formatting and figure rendering

pub mod formatting;
pub mod plot;

pub use formatting::{format_error, OutputFormat, ReportFormatter};
pub use plot::{Bounds, Figure, Trace};
