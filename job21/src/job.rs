//!
//! # Job
//!
//! The root of the exposure-job tree, and the construction API for everything below it.
//!

// Std-Lib
use std::path::Path;

// Crates.io
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// Local imports
use crate::utils::{ErrorHelper, SerdeFile};
use crate::{
    check_name, write, Alignment, CellCR, CellGrid, Checker, ErrorContext, ExportOptions,
    Exposure, Image, JobDecimal, JobError, JobExport, JobResult, JobWarning, Layer,
    LayerExposure, Placement, WaferGeometry, Xy,
};

///
/// # Exposure Job
///
/// Owns the cell grid, wafer geometry, images, layers and alignment of one stepper job.
///
/// Cross-references between its children (layer to image, layer to strategy, strategy to mark)
/// are by ID, so the derived [Clone] is a complete, self-consistent copy of the tree.
///
/// Mutation goes through the methods here, each of which checks its input first,
/// and leaves the job unchanged when it fails.
///
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(default)]
pub struct Job {
    /// Comment lines
    pub(crate) comment: Vec<String>,
    /// Cell structure
    pub(crate) cell: CellGrid,
    /// Wafer geometry
    pub(crate) wafer: WaferGeometry,
    /// Whether to expose cells which fall partially off the usable wafer area
    pub(crate) expose_edge_die: bool,
    /// Image definitions, in insertion order
    pub(crate) images: Vec<Image>,
    /// Layer definitions, in insertion order
    pub(crate) layers: Vec<Layer>,
    /// Alignment marks & strategies
    pub(crate) alignment: Alignment,
}
impl Job {
    /// Create a new [Job], with default cell and wafer geometry, and no images, layers, or marks.
    pub fn new() -> Self {
        Self::default()
    }

    // Comments

    pub fn comment(&self) -> &[String] {
        &self.comment
    }
    /// Replace the comment lines.
    /// Line length is checked against the export format, at export time.
    pub fn set_comment<S: Into<String>>(&mut self, lines: impl IntoIterator<Item = S>) -> JobResult<()> {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        for line in lines.iter() {
            check_name(ErrorContext::Comment, line, true)?;
        }
        self.comment = lines;
        Ok(())
    }

    // Cell & Wafer Geometry

    pub fn cell(&self) -> &CellGrid {
        &self.cell
    }
    pub fn wafer(&self) -> &WaferGeometry {
        &self.wafer
    }
    /// Boolean indication of whether any image has been distributed
    pub fn has_placements(&self) -> bool {
        self.images.iter().any(|i| !i.placements.is_empty())
    }
    /// Boolean indication of whether `placement` of `image` lies entirely within the usable wafer area.
    /// Placements beyond the wafer coordinate range are not.
    pub(crate) fn footprint_on_wafer(&self, image: &Image, placement: &Placement) -> bool {
        match self.cell.cell_to_wafer(placement.cell, placement.shift) {
            Ok(center) => self.wafer.contains_footprint(center, image.size),
            Err(_) => false,
        }
    }
    /// Set the cell size
    pub fn set_cell_size(&mut self, size: Xy) -> JobResult<()> {
        self.update_cell(ErrorContext::Cell, |c| c.size = size)
    }
    /// Set the cell matrix shift
    pub fn set_matrix_shift(&mut self, shift: Xy) -> JobResult<()> {
        self.update_cell(ErrorContext::Cell, |c| c.matrix_shift = shift)
    }
    /// Set the number of die per cell, (columns, rows)
    pub fn set_die_per_cell(&mut self, cols: u32, rows: u32) -> JobResult<()> {
        let mut cell = self.cell.clone();
        cell.die_per_cell = (cols, rows);
        cell.validate()?;
        self.cell = cell;
        Ok(())
    }
    /// Set the minimum number of die on the wafer for a cell to be exposed
    pub fn set_min_number_die(&mut self, num: u32) -> JobResult<()> {
        let mut cell = self.cell.clone();
        cell.min_number_die = num;
        cell.validate()?;
        self.cell = cell;
        Ok(())
    }
    pub fn set_wafer_diameter(&mut self, mm: impl Into<JobDecimal>) -> JobResult<()> {
        let mm = mm.into();
        self.update_wafer(|w| w.diameter = mm)
    }
    pub fn set_round_edge_clearance(&mut self, mm: impl Into<JobDecimal>) -> JobResult<()> {
        let mm = mm.into();
        self.update_wafer(|w| w.round_edge_clearance = mm)
    }
    pub fn set_flat_edge_clearance(&mut self, mm: impl Into<JobDecimal>) -> JobResult<()> {
        let mm = mm.into();
        self.update_wafer(|w| w.flat_edge_clearance = mm)
    }
    pub fn set_edge_exclusion(&mut self, mm: impl Into<JobDecimal>) -> JobResult<()> {
        let mm = mm.into();
        self.update_wafer(|w| w.edge_exclusion = mm)
    }
    pub fn expose_edge_die(&self) -> bool {
        self.expose_edge_die
    }
    /// Set whether placements reaching past the usable wafer area are exported (`true`) or dropped (`false`).
    pub fn set_expose_edge_die(&mut self, enabled: bool) {
        self.expose_edge_die = enabled;
    }
    /// Fail if geometry is frozen, i.e. once images have been distributed
    fn check_unfrozen(&self, ctx: ErrorContext) -> JobResult<()> {
        Checker(ctx).assert(
            !self.has_placements(),
            "Cell and wafer geometry cannot change after images are distributed",
        )
    }
    /// Apply `f` to a copy of our [CellGrid], and keep it if it checks out
    fn update_cell(&mut self, ctx: ErrorContext, f: impl FnOnce(&mut CellGrid)) -> JobResult<()> {
        self.check_unfrozen(ctx)?;
        let mut cell = self.cell.clone();
        f(&mut cell);
        cell.validate()?;
        self.cell = cell;
        Ok(())
    }
    /// Apply `f` to a copy of our [WaferGeometry], and keep it if it checks out
    fn update_wafer(&mut self, f: impl FnOnce(&mut WaferGeometry)) -> JobResult<()> {
        self.check_unfrozen(ErrorContext::Wafer)?;
        let mut wafer = self.wafer.clone();
        f(&mut wafer);
        wafer.validate()?;
        self.wafer = wafer;
        Ok(())
    }

    // Images

    /// Image definitions, in insertion order
    pub fn images(&self) -> &[Image] {
        &self.images
    }
    /// Get a reference to the [Image] with ID `id`
    pub fn get_image(&self, id: &str) -> Option<&Image> {
        self.images.iter().find(|i| i.id == id)
    }
    /// Create and add a new [Image]
    pub fn image(
        &mut self,
        id: impl Into<String>,
        reticle_id: impl Into<String>,
        size: Xy,
        shift: Xy,
    ) -> JobResult<&Image> {
        let image = Image::new(id, reticle_id, size)?.shifted(shift);
        self.add_image(image)
    }
    /// Add an [Image]. Fails if its ID is already in use.
    pub fn add_image(&mut self, image: Image) -> JobResult<&Image> {
        image.validate()?;
        if self.get_image(&image.id).is_some() {
            return Err(JobError::DuplicateId {
                kind: "Image",
                id: image.id,
            });
        }
        self.images.push(image);
        let idx = self.images.len() - 1;
        Ok(&self.images[idx])
    }
    ///
    /// Distribute image `image` into cell `cell`, shifted by `shift` from the cell center.
    ///
    /// Returns the [JobWarning] for a shift of half a cell or more, if any.
    /// Fails if `image` is not one of ours, or already has a placement in `cell`.
    ///
    pub fn distribute(
        &mut self,
        image: &str,
        cell: CellCR,
        shift: Xy,
    ) -> JobResult<Option<JobWarning>> {
        let grid = &self.cell;
        let target = match self.images.iter_mut().find(|i| i.id == image) {
            Some(i) => i,
            None => {
                return Err(JobError::UnknownImageReference {
                    image: image.to_string(),
                    context: ErrorContext::Job,
                })
            }
        };
        target.distribute(grid, cell, shift)
    }

    // Layers

    /// Layer definitions, in insertion order
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }
    /// Get a reference to the [Layer] with ID `id`
    pub fn get_layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }
    /// Create and add a new, initially empty [Layer]. Fails if `id` is already in use.
    pub fn layer(&mut self, id: impl Into<String>) -> JobResult<&Layer> {
        let id = id.into();
        check_name(ErrorContext::Layer(id.clone()), &id, true)?;
        if self.get_layer(&id).is_some() {
            return Err(JobError::DuplicateId { kind: "Layer", id });
        }
        self.layers.push(Layer {
            id,
            ..Default::default()
        });
        let idx = self.layers.len() - 1;
        Ok(&self.layers[idx])
    }
    /// Create and add the zero layer, i.e. the layer with the empty ID.
    /// Conventionally the first layer, and required even without alignment.
    pub fn zero_layer(&mut self) -> JobResult<&Layer> {
        self.layer("")
    }
    ///
    /// Expose image `image` on layer `layer`, with parameters `params`.
    ///
    /// Exposures are appended: exposing the same image again adds a second entry.
    /// Fails if either ID is unknown, or if `params` are out of range.
    ///
    pub fn expose_image(&mut self, layer: &str, image: &str, params: Exposure) -> JobResult<()> {
        if self.get_image(image).is_none() {
            return Err(JobError::UnknownImageReference {
                image: image.to_string(),
                context: ErrorContext::Layer(layer.to_string()),
            });
        }
        params.validate(ErrorContext::Layer(layer.to_string()))?;
        let target = self.layer_mut(layer)?;
        target.exposures.push(LayerExposure {
            image: image.to_string(),
            params,
        });
        Ok(())
    }
    /// Align layer `layer` with alignment strategy `strategy`
    /// Fails if the alignment has no marks, since mark-less alignment is not written.
    pub fn set_layer_strategy(&mut self, layer: &str, strategy: &str) -> JobResult<()> {
        self.check_layer_strategy(layer, strategy)?;
        let target = self.layer_mut(layer)?;
        target.strategy = Some(strategy.to_string());
        Ok(())
    }
    /// Check that layer `layer` can refer to alignment strategy `strategy`
    pub(crate) fn check_layer_strategy(&self, layer: &str, strategy: &str) -> JobResult<()> {
        if self.alignment.strategy(strategy).is_none() {
            return Err(JobError::UnknownStrategyReference {
                layer: layer.to_string(),
                strategy: strategy.to_string(),
            });
        }
        Checker(ErrorContext::Layer(layer.to_string())).assert(
            !self.alignment.is_empty(),
            format!(
                "Alignment strategy \"{}\" cannot be used without alignment marks",
                strategy
            ),
        )
    }
    fn layer_mut(&mut self, id: &str) -> JobResult<&mut Layer> {
        match self.layers.iter_mut().find(|l| l.id == id) {
            Some(l) => Ok(l),
            None => Err(JobError::UnknownLayerReference {
                layer: id.to_string(),
            }),
        }
    }

    // Alignment

    pub fn alignment(&self) -> &Alignment {
        &self.alignment
    }
    /// Mutable access to the [Alignment], for adding marks and strategies
    pub fn alignment_mut(&mut self) -> &mut Alignment {
        &mut self.alignment
    }

    // Validation & Export

    ///
    /// Check every construction-time invariant, across the whole tree.
    ///
    /// Jobs built through our methods always pass.
    /// Jobs loaded from markup files are checked here before export.
    ///
    /// Returns the non-fatal [JobWarning]s of the job's placements, logging each,
    /// as [Job::distribute] does for placements made through it.
    ///
    pub fn validate(&self) -> JobResult<Vec<JobWarning>> {
        for line in self.comment.iter() {
            check_name(ErrorContext::Comment, line, true)?;
        }
        self.cell.validate()?;
        self.wafer.validate()?;
        let mut warnings = Vec::new();
        for (idx, image) in self.images.iter().enumerate() {
            image.validate()?;
            for p in image.placements.iter() {
                if let Some(w) = image.shift_warning(&self.cell, p.cell, p.shift) {
                    warnings.push(w.logged());
                }
            }
            if self.images[..idx].iter().any(|i| i.id == image.id) {
                return Err(JobError::DuplicateId {
                    kind: "Image",
                    id: image.id.clone(),
                });
            }
        }
        self.alignment.validate()?;
        for (idx, layer) in self.layers.iter().enumerate() {
            let ctx = ErrorContext::Layer(layer.id.clone());
            check_name(ctx.clone(), &layer.id, true)?;
            if self.layers[..idx].iter().any(|l| l.id == layer.id) {
                return Err(JobError::DuplicateId {
                    kind: "Layer",
                    id: layer.id.clone(),
                });
            }
            for entry in layer.exposures.iter() {
                if self.get_image(&entry.image).is_none() {
                    return Err(JobError::UnknownImageReference {
                        image: entry.image.clone(),
                        context: ctx,
                    });
                }
                entry.params.validate(ctx.clone())?;
            }
            if let Some(ref s) = layer.strategy {
                self.check_layer_strategy(&layer.id, s)?;
            }
        }
        Ok(warnings)
    }
    /// Export to job-file text, with the default [ExportOptions].
    /// Warnings are logged, and otherwise dropped; see [Job::export] to collect them.
    pub fn to_text(&self) -> JobResult<String> {
        write::to_string(self)
    }
    /// Export to job-file text with options `opts`, collecting warnings
    pub fn export(&self, opts: &ExportOptions) -> JobResult<JobExport> {
        write::export(self, opts)
    }
    /// Export to job file `fname`, with the default [ExportOptions].
    /// Distinct from [SerdeFile::save], which writes the job's markup description.
    pub fn save_job_file(&self, fname: impl AsRef<Path>) -> JobResult<Vec<JobWarning>> {
        write::save(self, fname, &crate::DEFAULT_OPTIONS)
    }
}
impl SerdeFile for Job {}

impl std::fmt::Display for Job {
    /// Human-readable summary
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let cell = &self.cell;
        let wafer = &self.wafer;
        writeln!(f, "Job:")?;
        for line in self.comment.iter() {
            writeln!(f, "  # {}", line)?;
        }
        writeln!(
            f,
            "  Cell: size ({}) mm, matrix shift ({}) mm, {}x{} die, minimum {}",
            cell.size, cell.matrix_shift, cell.die_per_cell.0, cell.die_per_cell.1, cell.min_number_die
        )?;
        writeln!(
            f,
            "  Wafer: {} mm, round/flat clearance {}/{} mm, edge exclusion {} mm, edge die {}",
            wafer.diameter,
            wafer.round_edge_clearance,
            wafer.flat_edge_clearance,
            wafer.edge_exclusion,
            if self.expose_edge_die { "exposed" } else { "skipped" }
        )?;
        for image in self.images.iter() {
            writeln!(
                f,
                "  Image \"{}\" on \"{}\": size ({}), {} placements",
                image.id,
                image.reticle_id,
                image.size,
                image.placements.len()
            )?;
        }
        for layer in self.layers.iter() {
            writeln!(
                f,
                "  Layer \"{}\": {} exposures",
                layer.id,
                layer.exposures.len()
            )?;
        }
        write!(
            f,
            "  Alignment: {} marks, {} strategies",
            self.alignment.marks.len(),
            self.alignment.strategies.len()
        )
    }
}
