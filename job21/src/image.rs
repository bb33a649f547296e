//!
//! # Images & their Distribution
//!
//! An [Image] is one pattern on a reticle. Distribution places it onto cells of the [CellGrid];
//! each such location is a [Placement].
//!

// Crates.io
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// Local imports
use crate::utils::ErrorHelper;
use crate::{
    check_name, CellCR, CellGrid, Checker, ErrorContext, JobDecimal, JobError, JobResult,
    JobWarning, Xy,
};

/// # Placement
///
/// One location of an [Image]: a cell, plus a shift from that cell's center.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct Placement {
    pub cell: CellCR,
    #[serde(default)]
    pub shift: Xy,
}

///
/// # Image
///
/// A named pattern on reticle `reticle_id`, and the ordered list of cells it is exposed into.
///
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct Image {
    /// Image ID, unique within its [crate::Job]
    pub(crate) id: String,
    /// Reticle ID (barcode)
    pub(crate) reticle_id: String,
    /// Image size, at wafer scale
    pub(crate) size: Xy,
    /// Image location on the reticle, at wafer scale
    #[serde(default)]
    pub(crate) shift: Xy,
    /// Placements, in distribution order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) placements: Vec<Placement>,
}
impl Image {
    /// Create a new [Image], initially without placements.
    /// Its reticle-shift defaults to zero.
    pub fn new(id: impl Into<String>, reticle_id: impl Into<String>, size: Xy) -> JobResult<Self> {
        let image = Self {
            id: id.into(),
            reticle_id: reticle_id.into(),
            size,
            shift: Xy::default(),
            placements: Vec::new(),
        };
        image.validate_attrs()?;
        Ok(image)
    }
    /// Set the image location on the reticle. Consumes and returns `self` for chainability.
    pub fn shifted(mut self, shift: Xy) -> Self {
        self.shift = shift;
        self
    }
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn reticle_id(&self) -> &str {
        &self.reticle_id
    }
    pub fn size(&self) -> Xy {
        self.size
    }
    pub fn shift(&self) -> Xy {
        self.shift
    }
    /// Placements, in distribution order
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }
    /// Boolean indication of whether we already have a placement in `cell`
    pub fn is_placed(&self, cell: CellCR) -> bool {
        self.placements.iter().any(|p| p.cell == cell)
    }
    ///
    /// Distribute into cell `cell` of `grid`, shifted `shift` from the cell center.
    ///
    /// A cell can hold only one placement per image: a repeat fails with [JobError::DuplicatePlacement],
    /// leaving the image unchanged.
    /// A shift of at least half the cell size, in either dimension, is accepted,
    /// and reported as a [JobWarning::ExcessiveShift].
    ///
    pub(crate) fn distribute(
        &mut self,
        grid: &CellGrid,
        cell: CellCR,
        shift: Xy,
    ) -> JobResult<Option<JobWarning>> {
        if self.is_placed(cell) {
            return Err(JobError::DuplicatePlacement {
                image: self.id.clone(),
                cell,
            });
        }
        let warning = self.shift_warning(grid, cell, shift).map(JobWarning::logged);
        self.placements.push(Placement { cell, shift });
        Ok(warning)
    }
    /// The [JobWarning::ExcessiveShift] for a placement in `cell` shifted by `shift`, if any.
    /// Not logged.
    pub(crate) fn shift_warning(&self, grid: &CellGrid, cell: CellCR, shift: Xy) -> Option<JobWarning> {
        let two = JobDecimal::new(2, 0);
        let size = grid.size();
        if shift.x.abs() >= size.x / two || shift.y.abs() >= size.y / two {
            Some(JobWarning::ExcessiveShift {
                image: self.id.clone(),
                cell,
                shift,
            })
        } else {
            None
        }
    }
    /// Check our attributes, short of placements
    fn validate_attrs(&self) -> JobResult<()> {
        let ctx = ErrorContext::Image(self.id.clone());
        check_name(ctx.clone(), &self.id, false)?;
        check_name(ctx.clone(), &self.reticle_id, true)?;
        Checker(ctx).assert(
            self.size.is_positive(),
            format!("Image size ({}) must be positive", self.size),
        )
    }
    /// Check all of our internal invariants, including unique placement cells
    pub(crate) fn validate(&self) -> JobResult<()> {
        self.validate_attrs()?;
        for (idx, p) in self.placements.iter().enumerate() {
            if self.placements[..idx].iter().any(|q| q.cell == p.cell) {
                return Err(JobError::DuplicatePlacement {
                    image: self.id.clone(),
                    cell: p.cell,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_distribute() -> JobResult<()> {
        let grid = CellGrid::new(Xy::new(4, 4))?;
        let mut image = Image::new("Res", "OPC1", Xy::new(3, 3))?;

        assert_eq!(image.distribute(&grid, CellCR::new(2, 3), Xy::default())?, None);
        let w = image.distribute(&grid, CellCR::new(0, 0), Xy::new(dec!(-1.5), dec!(2.0)))?;
        assert_eq!(
            w,
            Some(JobWarning::ExcessiveShift {
                image: "Res".into(),
                cell: CellCR::new(0, 0),
                shift: Xy::new(dec!(-1.5), dec!(2.0)),
            })
        );
        // Shifted placements are still recorded, in call order
        let cells: Vec<CellCR> = image.placements().iter().map(|p| p.cell).collect();
        assert_eq!(cells, vec![CellCR::new(2, 3), CellCR::new(0, 0)]);
        Ok(())
    }
    #[test]
    fn test_duplicate_placement() -> JobResult<()> {
        let grid = CellGrid::default();
        let mut image = Image::new("Res", "OPC1", Xy::new(3, 3))?;
        image.distribute(&grid, CellCR::new(2, 3), Xy::default())?;
        let err = image
            .distribute(&grid, CellCR::new(2, 3), Xy::new(1, 1))
            .unwrap_err();
        match err {
            JobError::DuplicatePlacement { image: ref id, cell } => {
                assert_eq!(id, "Res");
                assert_eq!(cell, CellCR::new(2, 3));
            }
            _ => panic!("Expected DuplicatePlacement, got {:?}", err),
        }
        assert_eq!(image.placements().len(), 1);
        Ok(())
    }
    #[test]
    fn test_invalid_images() {
        assert!(Image::new("", "OPC1", Xy::new(1, 1)).is_err());
        assert!(Image::new("A", "OPC1", Xy::new(0, 1)).is_err());
        assert!(Image::new("A\"B", "OPC1", Xy::new(1, 1)).is_err());
        assert!(Image::new("A", "", Xy::new(1, 1)).is_ok());
    }
}
