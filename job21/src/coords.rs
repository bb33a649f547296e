//!
//! # Cell & Wafer Coordinates
//!
//! Two coordinate systems describe a location on the wafer:
//! * Wafer coordinates: absolute (x,y) millimeters relative to the wafer center.
//! * Cell coordinates: an integer (column, row) on the cell grid, plus a local (x,y) shift from that cell's center.
//!
//! [CellGrid] maps between the two:
//! `wafer = (column, row) * cell_size + matrix_shift + shift`.
//!

// Crates.io
use derive_more::{Add, AddAssign, Sub, SubAssign};
use rust_decimal::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// Local imports
use crate::utils::ErrorHelper;
use crate::{Checker, ErrorContext, JobDecimal, JobResult};

/// # Xy Pair
///
/// Used for wafer locations, shifts, and sizes alike.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Deserialize,
    Serialize,
    JsonSchema,
    PartialEq,
    Eq,
    Hash,
    Add,
    AddAssign,
    Sub,
    SubAssign,
)]
pub struct Xy {
    pub x: JobDecimal,
    pub y: JobDecimal,
}
impl Xy {
    /// Create a new [Xy]
    pub fn new(x: impl Into<JobDecimal>, y: impl Into<JobDecimal>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }
    /// Boolean indication of whether both coordinates are strictly positive
    pub fn is_positive(&self) -> bool {
        self.x > JobDecimal::ZERO && self.y > JobDecimal::ZERO
    }
}
impl std::fmt::Display for Xy {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}, {}", self.x, self.y)
    }
}

/// # Cell (Column, Row) Index
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Deserialize,
    Serialize,
    JsonSchema,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
)]
pub struct CellCR {
    pub col: i64,
    pub row: i64,
}
impl CellCR {
    /// Create a new [CellCR]
    pub fn new(col: i64, row: i64) -> Self {
        Self { col, row }
    }
}
impl std::fmt::Display for CellCR {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}, {}", self.col, self.row)
    }
}

///
/// # Cell Grid
///
/// The periodic cell structure laid over the wafer.
/// Cell (0,0) is centered at `matrix_shift`.
///
/// Size and shift are frozen by the owning [crate::Job] once any image is distributed.
///
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(default)]
pub struct CellGrid {
    /// Cell size, (width, height)
    pub(crate) size: Xy,
    /// Offset of the whole grid from the wafer center
    pub(crate) matrix_shift: Xy,
    /// Number of die exposed per cell, (columns, rows)
    pub(crate) die_per_cell: (u32, u32),
    /// Minimum number of die on the wafer for a cell to be exposed
    pub(crate) min_number_die: u32,
}
impl Default for CellGrid {
    /// 10x10mm cells, unshifted, one die each
    fn default() -> Self {
        Self {
            size: Xy::new(10, 10),
            matrix_shift: Xy::default(),
            die_per_cell: (1, 1),
            min_number_die: 1,
        }
    }
}
impl CellGrid {
    /// Create a new [CellGrid] of `size`, with all other attributes at their defaults
    pub fn new(size: Xy) -> JobResult<Self> {
        let grid = Self {
            size,
            ..Default::default()
        };
        grid.validate()?;
        Ok(grid)
    }
    /// Cell size, (width, height)
    pub fn size(&self) -> Xy {
        self.size
    }
    /// Grid offset from the wafer center
    pub fn matrix_shift(&self) -> Xy {
        self.matrix_shift
    }
    /// Number of die per cell, (columns, rows)
    pub fn die_per_cell(&self) -> (u32, u32) {
        self.die_per_cell
    }
    /// Minimum number of die required for exposure
    pub fn min_number_die(&self) -> u32 {
        self.min_number_die
    }
    /// Check our internal invariants
    pub(crate) fn validate(&self) -> JobResult<()> {
        let checker = Checker(ErrorContext::Cell);
        checker.assert(
            self.size.is_positive(),
            format!("Cell size ({}) must be positive", self.size),
        )?;
        checker.assert(
            self.die_per_cell.0 >= 1 && self.die_per_cell.1 >= 1,
            "Number of die per cell must be at least one in each dimension",
        )?;
        checker.assert(
            self.min_number_die >= 1,
            "Minimum number of die must be at least one",
        )
    }
    /// Convert cell `cell` and center-relative `shift` to absolute wafer coordinates.
    /// Fails if the result is beyond the range of [JobDecimal].
    pub fn cell_to_wafer(&self, cell: CellCR, shift: Xy) -> JobResult<Xy> {
        let x = axis_to_wafer(cell.col, self.size.x, self.matrix_shift.x, shift.x);
        let y = axis_to_wafer(cell.row, self.size.y, self.matrix_shift.y, shift.y);
        match (x, y) {
            (Some(x), Some(y)) => Ok(Xy { x, y }),
            _ => Checker(ErrorContext::Cell).fail(format!(
                "Cell ({}) with shift ({}) is beyond the wafer coordinate range",
                cell, shift
            )),
        }
    }
    /// Convert absolute wafer coordinates `pt` to a cell and its center-relative shift.
    ///
    /// Every point maps to exactly one cell: the returned shift lies in
    /// `[-width/2, width/2)` by `[-height/2, height/2)`.
    /// Fails if the cell index is beyond the range of an `i64`,
    /// or intermediate values beyond the range of [JobDecimal].
    pub fn wafer_to_cell(&self, pt: Xy) -> JobResult<(CellCR, Xy)> {
        let x = pt
            .x
            .checked_sub(self.matrix_shift.x)
            .and_then(|offset| axis_to_cell(offset, self.size.x));
        let y = pt
            .y
            .checked_sub(self.matrix_shift.y)
            .and_then(|offset| axis_to_cell(offset, self.size.y));
        match (x, y) {
            (Some((col, x)), Some((row, y))) => Ok((CellCR::new(col, row), Xy { x, y })),
            _ => Checker(ErrorContext::Cell).fail(format!(
                "Wafer point ({}) is beyond the cell grid's range",
                pt
            )),
        }
    }
}
/// Wafer coordinate of cell-index `idx` plus `shift`, along one axis. [None] on overflow.
fn axis_to_wafer(
    idx: i64,
    pitch: JobDecimal,
    offset: JobDecimal,
    shift: JobDecimal,
) -> Option<JobDecimal> {
    JobDecimal::from(idx)
        .checked_mul(pitch)?
        .checked_add(offset)?
        .checked_add(shift)
}
/// Split the grid-relative offset `offset` into a cell index and a center-relative remainder, along one axis.
/// [None] on overflow.
fn axis_to_cell(offset: JobDecimal, pitch: JobDecimal) -> Option<(i64, JobDecimal)> {
    let half = pitch / JobDecimal::new(2, 0);
    // Division can round in the last digit; the remainder is corrected below
    let mut idx = offset
        .checked_div(pitch)?
        .checked_add(JobDecimal::new(5, 1))?
        .floor();
    let mut rem = offset.checked_sub(idx.checked_mul(pitch)?)?;
    if rem >= half {
        idx = idx.checked_add(JobDecimal::ONE)?;
        rem -= pitch;
    } else if rem < -half {
        idx = idx.checked_sub(JobDecimal::ONE)?;
        rem += pitch;
    }
    Some((idx.to_i64()?, rem))
}
