//! ellipse-fusion command line tool

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use ellipse_fusion::api::{format_error, Figure, OutputFormat, ReportFormatter};
use ellipse_fusion::processing::pipeline::sample_records;
use ellipse_fusion::utils::{init_logging, FusionConfig, LogLevel};
use ellipse_fusion::{parse_records, EllipseFusionPipeline, EllipseRecord, FusionReport};

const SVG_SIZE: u32 = 800;

#[derive(Parser, Debug)]
#[command(name = "ellipse-fusion")]
#[command(author, version, about = "Fuse error ellipses anchored at MGRS grid references", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fuse ellipse records read from a file, the command line or stdin
    Fuse {
        /// JSON file with the ellipse records
        #[arg(short, long, value_name = "FILE", conflicts_with = "data")]
        input: Option<PathBuf>,

        /// Inline JSON ellipse records
        #[arg(short, long, value_name = "JSON")]
        data: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Fuse the built-in two-ellipse sample
    Demo {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Write the default configuration to FILE
    InitConfig {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Output format (text or json)
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Write the figure as SVG
    #[arg(long, value_name = "FILE")]
    svg: Option<PathBuf>,

    /// Write the figure as JSON
    #[arg(long, value_name = "FILE")]
    figure_json: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level, overridden by RUST_LOG
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<LogLevel>,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();

    match args.command {
        Command::Fuse { input, data, output } => {
            let json = read_request(input.as_deref(), data)?;
            let config = load_config(&output)?;
            match parse_records(&json) {
                Ok(records) => fuse(&records, &config, &output),
                Err(e) => {
                    eprintln!("{}", format_error(&e));
                    Ok(ExitCode::from(2))
                }
            }
        }
        Command::Demo { output } => {
            let config = load_config(&output)?;
            fuse(&sample_records(), &config, &output)
        }
        Command::InitConfig { path } => {
            if path.exists() {
                bail!("Refusing to overwrite existing file '{}'", path.display());
            }
            FusionConfig::default()
                .save_to_file(&path)
                .with_context(|| format!("Failed to write default config to '{}'", path.display()))?;
            println!("Wrote default configuration to {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_request(input: Option<&Path>, data: Option<String>) -> Result<String> {
    if let Some(data) = data {
        return Ok(data);
    }
    if let Some(path) = input {
        return fs::read_to_string(path).with_context(|| format!("Failed to read input file '{}'", path.display()));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read ellipse records from stdin")?;
    Ok(buffer)
}

fn load_config(output: &OutputArgs) -> Result<FusionConfig> {
    let mut config = match &output.config {
        Some(path) => FusionConfig::load_from_file(path).context("Failed to load configuration")?,
        None => FusionConfig::default(),
    };
    if let Some(level) = output.log_level {
        config.logging = config.logging.with_level(level);
    }

    init_logging(&config.logging).context("Failed to initialise logging")?;
    Ok(config)
}

fn fuse(records: &[EllipseRecord], config: &FusionConfig, output: &OutputArgs) -> Result<ExitCode> {
    let pipeline = EllipseFusionPipeline::from_config(config);
    let report = match pipeline.run(records) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{}", format_error(&e));
            return Ok(ExitCode::from(2));
        }
    };

    let text = ReportFormatter::new(output.format)
        .format(&report)
        .context("Failed to serialize report")?;
    println!("{}", text);

    write_figure(&report, output)?;
    Ok(ExitCode::SUCCESS)
}

fn write_figure(report: &FusionReport, output: &OutputArgs) -> Result<()> {
    if output.svg.is_none() && output.figure_json.is_none() {
        return Ok(());
    }

    let figure = Figure::from_report(report);
    if let Some(path) = &output.svg {
        fs::write(path, figure.to_svg(SVG_SIZE, SVG_SIZE))
            .with_context(|| format!("Failed to write SVG to '{}'", path.display()))?;
    }
    if let Some(path) = &output.figure_json {
        let json = serde_json::to_string_pretty(&figure).context("Failed to serialize figure")?;
        fs::write(path, json).with_context(|| format!("Failed to write figure JSON to '{}'", path.display()))?;
    }
    Ok(())
}
