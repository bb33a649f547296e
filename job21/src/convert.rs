//!
//! # Job Description to Job File Conversion
//!
//! The core logic of the `job21` CLI: load a markup job description, check it, and export it.
//!

// Std-Lib
use std::path::Path;

// Crates.io
use log::{info, warn};

// Local imports
use crate::utils::{SerdeFile, SerializationFormat};
use crate::{ExportOptions, Job, JobResult, JobWarning};

/// # Conversion Options
///
/// The CLI's `ProgramOptions`, without the `clap` annotations.
///
#[derive(Debug, Clone, Default)]
pub struct ConvOptions {
    /// Job description input file, in JSON, YAML or TOML
    pub inp: String,
    /// Job file output
    pub out: String,
    /// Export options file. Defaults apply if empty.
    pub config: String,
    /// Input format. One of ("json", "yaml", "toml"). Inferred from the input file extension if empty.
    pub fmt: String,
    /// Verbose output mode
    pub verbose: bool,
}

/// Convert an on-disk job description to an on-disk job file.
/// Returns any warnings raised while checking and exporting it, after logging them.
pub fn convert(options: &ConvOptions) -> JobResult<Vec<JobWarning>> {
    let fmt = parse_format(&options.fmt, &options.inp)?;
    let job: Job = fmt.open(&options.inp)?;
    let mut warnings = job.validate()?;
    if options.verbose {
        info!("Loaded {:?}\n{}", options.inp, job);
    }

    let opts = if options.config.is_empty() {
        ExportOptions::default()
    } else {
        let opts = ExportOptions::open_any(&options.config)?;
        opts.validate()?;
        opts
    };
    warnings.extend(crate::write::save(&job, &options.out, &opts)?);
    if !warnings.is_empty() {
        warn!("{} warnings exporting {:?}", warnings.len(), options.inp);
    }
    Ok(warnings)
}

/// Get the [SerializationFormat], from format-string `fmt` if provided, or otherwise from the extension of `fname`
fn parse_format(fmt: &str, fname: impl AsRef<Path>) -> JobResult<SerializationFormat> {
    if fmt.is_empty() {
        Ok(SerializationFormat::from_path(fname)?)
    } else {
        Ok(fmt.parse::<SerializationFormat>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::CellCR;
    use tempfile::TempDir;

    /// Write job description `yaml` into a fresh scratch directory, and set up to convert it
    fn setup(yaml: &str) -> JobResult<(TempDir, ConvOptions)> {
        let dir = tempfile::tempdir()?;
        let inp = dir.path().join("job.yaml");
        std::fs::write(&inp, yaml)?;
        let options = ConvOptions {
            inp: inp.to_string_lossy().into_owned(),
            out: dir.path().join("job.txt").to_string_lossy().into_owned(),
            ..Default::default()
        };
        Ok((dir, options))
    }

    #[test]
    fn test_convert_yaml() -> JobResult<()> {
        let (_dir, options) = setup(
            "cell: {size: {x: 20, y: 20}}\n\
             images:\n\
             \x20 - {id: A, reticle_id: R, size: {x: 10, y: 10}, placements: [{cell: {col: 0, row: 0}}, {cell: {col: 3, row: 0}}]}\n\
             layers:\n\
             \x20 - {id: \"\"}\n",
        )?;
        let warnings = convert(&options)?;
        // Cell 3 reaches out to x=65, past the 47mm usable radius
        assert_eq!(
            warnings,
            vec![JobWarning::EdgeDieExcluded {
                image: "A".into(),
                cell: CellCR::new(3, 0),
            }]
        );
        let text = std::fs::read_to_string(&options.out)?;
        assert!(text.contains("IMAGE_DISTRIBUTION"));
        Ok(())
    }
    #[test]
    fn test_convert_shifted() -> JobResult<()> {
        let (_dir, options) = setup(
            "cell: {size: {x: 20, y: 20}}\n\
             images:\n\
             \x20 - {id: A, reticle_id: R, size: {x: 10, y: 10}, placements: [{cell: {col: 0, row: 0}, shift: {x: 10, y: 0}}]}\n",
        )?;
        let warnings = convert(&options)?;
        // Half a cell or more: reported, and still exported
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0],
            JobWarning::ExcessiveShift { ref image, .. } if image == "A"
        ));
        let text = std::fs::read_to_string(&options.out)?;
        let shift = text.lines().find(|l| l.trim_start().starts_with("IMAGE_CELL_SHIFT"));
        assert!(shift.is_some_and(|l| l.contains("10.")));
        Ok(())
    }
    #[test]
    fn test_convert_invalid() -> JobResult<()> {
        let (_dir, options) = setup(
            "images:\n\
             \x20 - {id: A, reticle_id: R, size: {x: 0, y: 10}}\n",
        )?;
        assert!(convert(&options).is_err());
        assert!(!std::path::Path::new(&options.out).exists());
        Ok(())
    }
    #[test]
    fn test_parse_format() -> JobResult<()> {
        assert_eq!(parse_format("", "job.yml")?, SerializationFormat::Yaml);
        assert_eq!(parse_format("JSON", "job.yml")?, SerializationFormat::Json);
        assert!(parse_format("", "job").is_err());
        assert!(parse_format("xml", "job.yml").is_err());
        Ok(())
    }
}
