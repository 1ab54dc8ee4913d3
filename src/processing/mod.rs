//! Request parsing and the end-to-end fusion pipeline

pub mod parser;
pub mod pipeline;

pub use parser::parse_records;
pub use pipeline::{EllipseFusionPipeline, FusionReport};
