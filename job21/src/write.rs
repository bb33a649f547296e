//!
//! # Job Writer Module
//!
//! Encodes a [Job] into the stepper's line-oriented job text format.
//!
//! The file is a series of sections, each bracketed by `START_SECTION <name>` and `END_SECTION`.
//! Inside, each record is a keyword padded to a fixed column, followed by its value.
//! Multi-valued records continue on following lines, aligned to the value column.
//!

// Std-Lib
use std::fmt::Display;
use std::io::Write;
use std::ops::{AddAssign, SubAssign};
use std::path::Path;

// Crates.io
use log::{debug, info};
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};

// Local imports
use crate::utils::{self, enumstr, EnumStr, Unwrapper};
use crate::{
    check_name, Checker, ErrorContext, ExportOptions, Exposure, Job, JobDecimal, JobError,
    JobResult, JobWarning, Layer, Xy,
};

enumstr!(
    /// # Job File Sections
    JobSection {
        General: "GENERAL",
        ImageDefinition: "IMAGE_DEFINITION",
        ImageDistribution: "IMAGE_DISTRIBUTION",
        MarkDefinition: "MARK_DEFINITION",
        AlignStrategy: "WFR_ALIGN_STRATEGY",
        LayerDefinition: "LAYER_DEFINITION",
        ImageInfo: "IMAGE_INFO",
    }
);

enumstr!(
    ///
    /// # Job File Keywords
    ///
    /// The fixed keyword table of the job format.
    /// Each record starts with one of these.
    ///
    JobKey {
        StartSection: "START_SECTION",
        EndSection: "END_SECTION",
        Comment: "COMMENT",
        WaferDiameter: "WFR_DIAMETER",
        CellSize: "CELL_SIZE",
        MatrixShift: "MATRIX_SHIFT",
        RoundEdgeClearance: "ROUND_EDGE_CLEARANCE",
        FlatEdgeClearance: "FLAT_EDGE_CLEARANCE",
        EdgeExclusion: "EDGE_EXCLUSION",
        NumberDies: "NUMBER_DIES",
        MinNumberDies: "MIN_NUMBER_DIES",
        ProcessEdgeDies: "PROCESS_EDGE_DIES",
        ImageId: "IMAGE_ID",
        ReticleId: "RETICLE_ID",
        ImageSize: "IMAGE_SIZE",
        ImageShift: "IMAGE_SHIFT",
        CellSelection: "CELL_SELECTION",
        DistributionAction: "DISTRIBUTION_ACTION",
        ImageCellShift: "IMAGE_CELL_SHIFT",
        MarkId: "MARK_ID",
        MarkType: "MARK_TYPE",
        MarkLocation: "MARK_LOCATION",
        StrategyId: "STRATEGY_ID",
        AlignMarks: "ALIGN_MARKS",
        LayerNo: "LAYER_NO",
        LayerId: "LAYER_ID",
        AlignStrategy: "WFR_ALIGN_STRATEGY",
        Energy: "ENERGY",
        Focus: "FOCUS",
        FocusTilt: "FOCUS_TILT",
        NumericalAperture: "NUMERICAL_APERTURE",
        SigmaOuter: "SIGMA_OUTER",
        SigmaInner: "SIGMA_INNER",
    }
);

enumstr!(
    /// # Yes/No Flag Values
    YesNo {
        Yes: "Y",
        No: "N",
    }
);
impl From<bool> for YesNo {
    fn from(b: bool) -> Self {
        if b {
            Self::Yes
        } else {
            Self::No
        }
    }
}

/// Distribution action: expose the image in the selected cell
const ACTION_EXPOSE: &str = "I";

/// Result of a successful export: the job text, plus any warnings raised along the way
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobExport {
    pub text: String,
    pub warnings: Vec<JobWarning>,
}

/// Export [Job] `job` with options `opts`.
/// Nothing is produced on failure: the text is either complete, or an error is returned.
pub fn export(job: &Job, opts: &ExportOptions) -> JobResult<JobExport> {
    opts.validate()?;
    let mut buf = Vec::new();
    let warnings = {
        let mut writer = JobWriter::new(&mut buf, opts);
        writer.write_job(job)?;
        writer.session.warnings
    };
    let text = String::from_utf8(buf)
        .unwrapper(&Checker(ErrorContext::Job), "Invalid UTF-8 in job text")?;
    Ok(JobExport { text, warnings })
}
/// Export [Job] `job` to a [String], with the default [ExportOptions].
pub fn to_string(job: &Job) -> JobResult<String> {
    Ok(export(job, &crate::DEFAULT_OPTIONS)?.text)
}
/// Write [Job] `job` to file `fname`, returning any warnings.
/// Written to a temporary file in the same directory first, then renamed into place.
pub fn save(job: &Job, fname: impl AsRef<Path>, opts: &ExportOptions) -> JobResult<Vec<JobWarning>> {
    let fname = fname.as_ref();
    let JobExport { text, warnings } = export(job, opts)?;
    utils::write_file(fname, text)?;
    info!("Wrote job file {:?}", fname);
    Ok(warnings)
}

/// # Job Writing Helper
struct JobWriter<'wr> {
    /// Write Destination
    dest: Box<dyn Write + 'wr>,
    /// Layout Options
    opts: &'wr ExportOptions,
    /// Indentation Helper
    indent: Indent,
    /// Session State
    session: JobWriterSession,
}
impl<'wr> JobWriter<'wr> {
    /// Create a new [JobWriter] to destination `dest`.
    /// Destination is boxed internally.
    fn new(dest: impl Write + 'wr, opts: &'wr ExportOptions) -> Self {
        Self {
            dest: Box::new(dest),
            opts,
            indent: Indent::new(opts.indent.clone()),
            session: JobWriterSession::default(),
        }
    }
    /// Write a [Job] to the destination, section by section
    fn write_job(&mut self, job: &Job) -> JobResult<()> {
        self.write_general(job)?;
        self.write_images(job)?;
        self.write_distribution(job)?;
        self.write_alignment(job)?;
        for (num, layer) in job.layers.iter().enumerate() {
            self.write_layer(job, num, layer)?;
        }
        self.dest.flush()?;
        Ok(())
    }
    /// Write the comment block and the cell & wafer geometry
    fn write_general(&mut self, job: &Job) -> JobResult<()> {
        use JobKey::*;
        // Check every comment line before writing anything
        let max = self.opts.max_comment_len;
        for (idx, line) in job.comment.iter().enumerate() {
            let len = line.chars().count();
            if len > max {
                return Err(JobError::CommentTooLong {
                    line: idx + 1,
                    len,
                    max,
                });
            }
        }
        let (cell, wafer) = (&job.cell, &job.wafer);
        self.start_section(JobSection::General)?;
        if job.comment.is_empty() {
            self.write_str(Comment, "")?;
        }
        for line in job.comment.iter() {
            self.write_str(Comment, line)?;
        }
        self.write_record(WaferDiameter, self.dec(wafer.diameter))?;
        self.write_record(CellSize, self.xy(cell.size))?;
        self.write_record(MatrixShift, self.xy(cell.matrix_shift))?;
        self.write_record(RoundEdgeClearance, self.dec(wafer.round_edge_clearance))?;
        self.write_record(FlatEdgeClearance, self.dec(wafer.flat_edge_clearance))?;
        self.write_record(EdgeExclusion, self.dec(wafer.edge_exclusion))?;
        let (cols, rows) = cell.die_per_cell;
        self.write_record(NumberDies, format_args!("{} {}", cols, rows))?;
        self.write_record(MinNumberDies, cell.min_number_die)?;
        self.write_record(ProcessEdgeDies, YesNo::from(job.expose_edge_die))?;
        self.end_section()
    }
    /// Write each image definition
    fn write_images(&mut self, job: &Job) -> JobResult<()> {
        use JobKey::*;
        for image in job.images.iter() {
            self.start_section(JobSection::ImageDefinition)?;
            self.write_str(ImageId, &image.id)?;
            self.write_str(ReticleId, &image.reticle_id)?;
            self.write_record(ImageSize, self.xy(image.size))?;
            self.write_record(ImageShift, self.xy(image.shift))?;
            self.end_section()?;
        }
        Ok(())
    }
    /// Write every placement, grouped by image.
    /// Unless edge die are exposed, placements reaching past the usable wafer area are left out.
    fn write_distribution(&mut self, job: &Job) -> JobResult<()> {
        use JobKey::*;
        for image in job.images.iter() {
            for placement in image.placements.iter() {
                if !job.expose_edge_die && !job.footprint_on_wafer(image, placement) {
                    let warning = JobWarning::EdgeDieExcluded {
                        image: image.id.clone(),
                        cell: placement.cell,
                    };
                    self.session.warnings.push(warning.logged());
                    continue;
                }
                self.start_section(JobSection::ImageDistribution)?;
                self.write_str(ImageId, &image.id)?;
                let cell = placement.cell;
                self.write_record(CellSelection, format_args!("{} {}", cell.col, cell.row))?;
                self.write_record(DistributionAction, ACTION_EXPOSE)?;
                self.write_record(ImageCellShift, self.xy(placement.shift))?;
                self.end_section()?;
            }
        }
        Ok(())
    }
    /// Write alignment marks and strategies, if there are any marks
    fn write_alignment(&mut self, job: &Job) -> JobResult<()> {
        use JobKey::*;
        let alignment = &job.alignment;
        if alignment.is_empty() {
            return Ok(());
        }
        // Check every strategy's references before writing anything
        for strategy in alignment.strategies.iter() {
            alignment.check_strategy(strategy)?;
        }
        for mark in alignment.marks.iter() {
            self.start_section(JobSection::MarkDefinition)?;
            self.write_str(MarkId, &mark.id)?;
            self.write_record(MarkType, mark.mark_type)?;
            self.write_record(MarkLocation, self.xy(mark.location))?;
            self.end_section()?;
        }
        for strategy in alignment.strategies.iter() {
            self.start_section(JobSection::AlignStrategy)?;
            self.write_str(StrategyId, &strategy.id)?;
            let mut marks = strategy.marks.iter();
            match marks.next() {
                Some(first) => self.write_str(AlignMarks, first)?,
                None => self.write_str(AlignMarks, "")?,
            }
            for mark in marks {
                let value = self.quoted(ErrorContext::Strategy(strategy.id.clone()), mark)?;
                self.write_continuation(value)?;
            }
            self.end_section()?;
        }
        Ok(())
    }
    /// Write a [Layer] definition and its exposures
    fn write_layer(&mut self, job: &Job, num: usize, layer: &Layer) -> JobResult<()> {
        use JobKey::*;
        // Check references first
        let ctx = ErrorContext::Layer(layer.id.clone());
        let mut images = Vec::with_capacity(layer.exposures.len());
        for entry in layer.exposures.iter() {
            match job.get_image(&entry.image) {
                Some(image) => images.push(image),
                None => {
                    return Err(JobError::UnknownImageReference {
                        image: entry.image.clone(),
                        context: ctx,
                    })
                }
            }
        }
        if let Some(ref s) = layer.strategy {
            job.check_layer_strategy(&layer.id, s)?;
        }

        self.start_section(JobSection::LayerDefinition)?;
        self.write_record(LayerNo, num)?;
        self.write_str(LayerId, &layer.id)?;
        if let Some(ref s) = layer.strategy {
            self.write_str(AlignStrategy, s)?;
        }
        self.end_section()?;

        for (entry, image) in layer.exposures.iter().zip(images) {
            self.start_section(JobSection::ImageInfo)?;
            self.write_str(LayerId, &layer.id)?;
            self.write_str(ImageId, &image.id)?;
            self.write_str(ReticleId, &image.reticle_id)?;
            self.write_exposure(&entry.params)?;
            self.end_section()?;
        }
        Ok(())
    }
    /// Write the records of an [Exposure]
    fn write_exposure(&mut self, params: &Exposure) -> JobResult<()> {
        use JobKey::*;
        self.write_record(Energy, self.dec(params.energy))?;
        self.write_record(Focus, self.dec(params.focus))?;
        self.write_record(FocusTilt, self.xy(params.focus_tilt))?;
        if let Some(na) = params.numerical_aperture {
            self.write_record(NumericalAperture, self.dec(na))?;
        }
        if let Some(s) = params.sigma_outer {
            self.write_record(SigmaOuter, self.dec(s))?;
        }
        if let Some(s) = params.sigma_inner {
            self.write_record(SigmaInner, self.dec(s))?;
        }
        Ok(())
    }
    /// Open a section. Section brackets sit at the outer indentation level.
    fn start_section(&mut self, section: JobSection) -> JobResult<()> {
        debug!("Writing {} section", section);
        self.session.section = Some(section);
        self.write_record(JobKey::StartSection, section)?;
        self.indent += 1;
        Ok(())
    }
    /// Close the current section, followed by a blank line
    fn end_section(&mut self) -> JobResult<()> {
        self.indent -= 1;
        self.write_line(format_args!("{}", JobKey::EndSection))?;
        writeln!(self.dest)?;
        self.session.section = None;
        Ok(())
    }
    /// Write a record with a quoted string value
    fn write_str(&mut self, key: JobKey, value: &str) -> JobResult<()> {
        let ctx = match self.session.section {
            Some(section) => ErrorContext::Section(section),
            None => ErrorContext::Job,
        };
        let value = self.quoted(ctx, value)?;
        self.write_record(key, value)
    }
    /// Write a record, padding `key` out to the value column
    fn write_record(&mut self, key: JobKey, value: impl Display) -> JobResult<()> {
        let width = self.opts.key_width;
        self.write_line(format_args!("{:<width$}{}", key.to_str(), value, width = width))?;
        Ok(())
    }
    /// Write a continuation line of a multi-valued record
    fn write_continuation(&mut self, value: impl Display) -> JobResult<()> {
        let width = self.opts.key_width;
        self.write_line(format_args!("{:<width$}{}", "", value, width = width))?;
        Ok(())
    }
    /// Write a line at the current indentation
    fn write_line(&mut self, args: std::fmt::Arguments) -> std::io::Result<()> {
        writeln!(self.dest, "{}{}", self.indent.state, args)
    }
    /// Quote string `s`, failing if it holds characters the format cannot carry
    fn quoted(&self, ctx: ErrorContext, s: &str) -> JobResult<String> {
        check_name(ctx, s, true)?;
        Ok(format!("\"{}\"", s))
    }
    /// Format a decimal value at the configured precision
    fn dec(&self, val: JobDecimal) -> String {
        format_decimal(val, self.opts.precision)
    }
    /// Format an [Xy] pair, space-separated
    fn xy(&self, val: Xy) -> String {
        format!("{} {}", self.dec(val.x), self.dec(val.y))
    }
}

/// Format `val` with exactly `precision` decimal places, rounding half away from zero.
/// Negative zero, whether given or produced by rounding, is written as zero.
pub(crate) fn format_decimal(val: JobDecimal, precision: u32) -> String {
    let rounded = val.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero);
    let rounded = if rounded.is_zero() {
        JobDecimal::ZERO
    } else {
        rounded
    };
    format!("{:.*}", precision as usize, rounded)
}

/// Job-Writing Session State
#[derive(Debug, Default)]
struct JobWriterSession {
    /// Section currently being written, if any
    section: Option<JobSection>,
    /// Warnings raised so far
    warnings: Vec<JobWarning>,
}

/// Indentation Helper
struct Indent {
    unit: String,
    level: usize,
    state: String,
}
impl Indent {
    /// Create a new [Indent], initially at level 0
    fn new(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            level: 0,
            state: String::new(),
        }
    }
}
impl AddAssign<usize> for Indent {
    fn add_assign(&mut self, rhs: usize) {
        self.level += rhs;
        self.state = self.unit.repeat(self.level);
    }
}
impl SubAssign<usize> for Indent {
    fn sub_assign(&mut self, rhs: usize) {
        self.level = self.level.saturating_sub(rhs);
        self.state = self.unit.repeat(self.level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(dec!(1.5), 3), "1.500");
        assert_eq!(format_decimal(dec!(-0.0000004), 6), "0.000000");
        assert_eq!(format_decimal(dec!(2.0000005), 6), "2.000001");
        assert_eq!(format_decimal(dec!(-2.0000005), 6), "-2.000001");
        assert_eq!(format_decimal(dec!(-0), 2), "0.00");
        assert_eq!(format_decimal(dec!(100), 0), "100");
    }
    #[test]
    fn test_keys_unique() {
        let keys = JobKey::all();
        for (idx, key) in keys.iter().enumerate() {
            assert!(keys[..idx].iter().all(|k| k.to_str() != key.to_str()));
            assert_eq!(JobKey::from_str(key.to_str()), Some(*key));
        }
        assert_eq!(JobSection::parse_ignore_case("image_info"), Some(JobSection::ImageInfo));
    }
    #[test]
    fn test_yes_no() {
        assert_eq!(YesNo::from(true).to_str(), "Y");
        assert_eq!(YesNo::from(false).to_string(), "N");
    }
}
