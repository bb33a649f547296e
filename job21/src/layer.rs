//!
//! # Layers & Exposure Parameters
//!

// Crates.io
use derive_builder::Builder;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// Local imports
use crate::utils::ErrorHelper;
use crate::{Checker, ErrorContext, JobDecimal, JobError, JobResult, Xy};

///
/// # Exposure Parameters
///
/// Per-image settings for one [Layer].
/// Energy is required. Focus and focus-tilt default to zero;
/// unset optical settings are left to the tool's defaults and not written.
///
/// Beyond the [Exposure::new] shorthand, the full set is available through [ExposureBuilder]:
///
/// ```rust
/// use job21::{Exposure, ExposureBuilder, JobDecimal};
///
/// let e: Exposure = ExposureBuilder::default()
///     .energy(21)
///     .numerical_aperture(JobDecimal::new(57, 2))
///     .build()
///     .unwrap();
/// assert_eq!(e.focus, JobDecimal::ZERO);
/// ```
///
#[derive(Debug, Clone, Builder, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[builder(pattern = "owned", setter(into))]
pub struct Exposure {
    /// Exposure energy, mJ/cm2
    pub energy: JobDecimal,
    /// Focus offset, um
    #[serde(default)]
    #[builder(default)]
    pub focus: JobDecimal,
    /// Focus tilt, (x,y) urad
    #[serde(default)]
    #[builder(default)]
    pub focus_tilt: Xy,
    /// Numerical aperture
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub numerical_aperture: Option<JobDecimal>,
    /// Illumination outer sigma
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub sigma_outer: Option<JobDecimal>,
    /// Illumination inner sigma
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub sigma_inner: Option<JobDecimal>,
}
impl Exposure {
    /// Create a new [Exposure] with `energy` and `focus`, and all other parameters at their defaults
    pub fn new(energy: impl Into<JobDecimal>, focus: impl Into<JobDecimal>) -> Self {
        Self {
            energy: energy.into(),
            focus: focus.into(),
            focus_tilt: Xy::default(),
            numerical_aperture: None,
            sigma_outer: None,
            sigma_inner: None,
        }
    }
    /// Check parameter ranges
    pub(crate) fn validate(&self, ctx: ErrorContext) -> JobResult<()> {
        let checker = Checker(ctx);
        let zero = JobDecimal::ZERO;
        let one = JobDecimal::ONE;
        checker.assert(
            self.energy > zero,
            format!("Exposure energy {} must be positive", self.energy),
        )?;
        if let Some(na) = self.numerical_aperture {
            checker.assert(
                na > zero && na <= one,
                format!("Numerical aperture {} must be in (0, 1]", na),
            )?;
        }
        for sigma in [self.sigma_outer, self.sigma_inner].iter().flatten() {
            checker.assert(
                *sigma >= zero && *sigma <= one,
                format!("Sigma {} must be in [0, 1]", sigma),
            )?;
        }
        if let (Some(outer), Some(inner)) = (self.sigma_outer, self.sigma_inner) {
            checker.assert(
                inner <= outer,
                format!("Inner sigma {} exceeds outer sigma {}", inner, outer),
            )?;
        }
        Ok(())
    }
}
impl From<ExposureBuilderError> for JobError {
    fn from(e: ExposureBuilderError) -> Self {
        JobError::validation(ErrorContext::Job, e.to_string())
    }
}

/// # Layer Exposure Entry
///
/// An [Exposure] of the image with ID `image`.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct LayerExposure {
    /// Image ID
    pub image: String,
    /// Exposure parameters
    pub params: Exposure,
}

///
/// # Layer
///
/// One lithographic exposure pass: an ordered list of image exposures,
/// optionally aligned by a named alignment strategy.
/// The layer with the empty ID is the "zero layer".
///
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct Layer {
    /// Layer ID, unique within its [crate::Job]
    pub(crate) id: String,
    /// Image exposures, in insertion order. An image may appear more than once.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) exposures: Vec<LayerExposure>,
    /// Alignment strategy ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) strategy: Option<String>,
}
impl Layer {
    pub fn id(&self) -> &str {
        &self.id
    }
    /// Boolean indication of whether this is the zero layer
    pub fn is_zero(&self) -> bool {
        self.id.is_empty()
    }
    /// Image exposures, in insertion order
    pub fn exposures(&self) -> &[LayerExposure] {
        &self.exposures
    }
    /// Alignment strategy ID, if any
    pub fn strategy(&self) -> Option<&str> {
        self.strategy.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_exposure_builder() -> JobResult<()> {
        let e = ExposureBuilder::default()
            .energy(dec!(22.5))
            .focus(dec!(-0.1))
            .sigma_outer(dec!(0.6))
            .sigma_inner(dec!(0.3))
            .build()?;
        assert_eq!(e.numerical_aperture, None);
        assert_eq!(e.sigma_outer, Some(dec!(0.6)));
        e.validate(ErrorContext::Job)?;

        // Energy is required
        let e: JobResult<Exposure> = ExposureBuilder::default().focus(1).build().map_err(|e| e.into());
        assert!(e.is_err());
        Ok(())
    }
    #[test]
    fn test_exposure_ranges() {
        let ctx = || ErrorContext::Layer("Metal".into());
        assert!(Exposure::new(0, 0).validate(ctx()).is_err());
        assert!(Exposure::new(-5, 0).validate(ctx()).is_err());
        assert!(Exposure::new(21, dec!(-0.10)).validate(ctx()).is_ok());

        let mut e = Exposure::new(21, 0);
        e.numerical_aperture = Some(dec!(1.2));
        assert!(e.validate(ctx()).is_err());

        let mut e = Exposure::new(21, 0);
        e.sigma_outer = Some(dec!(0.3));
        e.sigma_inner = Some(dec!(0.5));
        assert!(e.validate(ctx()).is_err());
    }
}
