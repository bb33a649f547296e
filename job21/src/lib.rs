//!
//! # Job21 Wafer-Stepper Exposure Jobs
//!
//! Models the layout of a photolithography exposure job:
//! the wafer, its periodic grid of cells, the reticle [Image]s placed onto that grid,
//! the [Layer]s binding images to exposure parameters, and the wafer [Alignment] marks.
//! A composed [Job] is exported to the stepper's line-oriented job-description text format.
//!
//! All lengths are in millimeters at wafer scale, stored as [JobDecimal]s.
//!
//! ```rust
//! use job21::{CellCR, Exposure, Job, JobResult, Xy};
//!
//! fn build() -> JobResult<String> {
//!     let mut job = Job::new();
//!     job.set_comment(["Demo Job"])?;
//!     job.set_cell_size(Xy::new(4, 4))?;
//!     job.image("Res", "OPC1", Xy::new(3, 3), Xy::default())?;
//!     job.distribute("Res", CellCR::new(0, 0), Xy::default())?;
//!     job.zero_layer()?;
//!     job.layer("Metal")?;
//!     job.expose_image("Metal", "Res", Exposure::new(21, 0))?;
//!     job.to_text()
//! }
//! assert!(build().unwrap().contains("IMAGE_DEFINITION"));
//! ```
//!

// Crates.io
pub use rust_decimal;

// Internal modules & re-exports
pub use job21utils as utils;

pub mod error;
pub use error::*;

pub mod coords;
pub use coords::*;

pub mod wafer;
pub use wafer::*;

pub mod image;
pub use image::*;

pub mod layer;
pub use layer::*;

pub mod align;
pub use align::*;

pub mod job;
pub use job::*;

pub mod options;
pub use options::*;

pub mod write;
pub use write::{JobExport, JobKey, JobSection};

pub mod convert;


///
/// # JobDecimal
///
/// Type alias for all decimal-valued data: lengths, shifts, energies and focus offsets.
/// Uses [rust_decimal](https://crates.io/crates/rust_decimal) internally,
/// so that values entered in decimal millimeters are represented, and summed, exactly.
///
pub type JobDecimal = rust_decimal::Decimal;

/// Check an identifier-string destined for a quoted field of the job file.
/// Quotes and line-breaks cannot be represented there.
pub(crate) fn check_name(ctx: ErrorContext, name: &str, allow_empty: bool) -> JobResult<()> {
    use utils::ErrorHelper;
    let checker = Checker(ctx);
    checker.assert(allow_empty || !name.is_empty(), "Empty identifier")?;
    checker.assert(
        !name.contains(|c: char| c == '"' || c == '\n' || c == '\r'),
        format!("Invalid character in \"{}\": quotes and line-breaks are not allowed", name),
    )
}
