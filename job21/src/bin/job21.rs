//!
//! # Job Description to Stepper Job File CLI
//!
//! Exports a job description, in any of [`job21::Job`]'s markup formats (JSON, YAML, or TOML),
//! to the stepper's job text format.
//!

use clap::Parser;
use std::error::Error;

// Use our own crate, by name
use job21::convert::{convert, ConvOptions};

/// Job Description to Stepper Job File Converter
/// Exports a JSON, YAML, or TOML job description to the stepper's job text format.
#[derive(Parser)]
pub struct ProgramOptions {
    /// Job Description Input File
    #[arg(short = 'i', long = "input")]
    pub inp: String,
    /// Job File Output
    #[arg(short = 'o', long = "output")]
    pub out: String,
    /// Export Options File (JSON, YAML, or TOML)
    #[arg(short = 'c', long, default_value = "")]
    pub config: String,
    /// Input Format. One of ("json", "yaml", "toml"). Inferred from the input file extension if omitted.
    #[arg(short = 'f', long = "format", default_value = "")]
    pub fmt: String,
    /// Verbose Output Mode
    #[arg(short, long)]
    pub verbose: bool,
}

impl From<ProgramOptions> for ConvOptions {
    fn from(p: ProgramOptions) -> Self {
        Self {
            inp: p.inp,
            out: p.out,
            config: p.config,
            fmt: p.fmt,
            verbose: p.verbose,
        }
    }
}

/// Main entry point.
/// Parses the command-line arguments, sets up `warn`-level logging (`info` if verbose), and calls [`convert`].
pub fn main() -> Result<(), Box<dyn Error>> {
    let options = ProgramOptions::parse();
    let level = if options.verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    // Warnings are reported through the logger as they arise
    convert(&options.into())?;
    Ok(())
}
