//!
//! # Wafer Geometry
//!

// Crates.io
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// Local imports
use crate::utils::ErrorHelper;
use crate::{Checker, ErrorContext, JobDecimal, JobResult, Xy};

/// # Wafer Geometry
///
/// Round wafer dimensions and the clearances keeping exposures away from its edge.
/// All values in millimeters.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(default)]
pub struct WaferGeometry {
    /// Wafer diameter
    pub(crate) diameter: JobDecimal,
    /// Clearance from the round edge
    pub(crate) round_edge_clearance: JobDecimal,
    /// Clearance from the flat (or notch)
    pub(crate) flat_edge_clearance: JobDecimal,
    /// Edge exclusion margin
    pub(crate) edge_exclusion: JobDecimal,
}
impl Default for WaferGeometry {
    /// A 100mm wafer, with 5mm clearances and 3mm edge exclusion
    fn default() -> Self {
        Self {
            diameter: JobDecimal::new(100, 0),
            round_edge_clearance: JobDecimal::new(5, 0),
            flat_edge_clearance: JobDecimal::new(5, 0),
            edge_exclusion: JobDecimal::new(3, 0),
        }
    }
}
impl WaferGeometry {
    pub fn diameter(&self) -> JobDecimal {
        self.diameter
    }
    pub fn round_edge_clearance(&self) -> JobDecimal {
        self.round_edge_clearance
    }
    pub fn flat_edge_clearance(&self) -> JobDecimal {
        self.flat_edge_clearance
    }
    pub fn edge_exclusion(&self) -> JobDecimal {
        self.edge_exclusion
    }
    /// Radius of the usable wafer area: half the diameter, less the edge exclusion
    pub fn usable_radius(&self) -> JobDecimal {
        self.diameter / JobDecimal::new(2, 0) - self.edge_exclusion
    }
    /// Boolean indication of whether an axis-aligned rectangle of `size`, centered at `center`,
    /// lies entirely within the usable wafer area. Touching its boundary counts as inside.
    /// Footprints too far out to compute with count as outside.
    pub fn contains_footprint(&self, center: Xy, size: Xy) -> bool {
        let radius = self.usable_radius();
        if radius < JobDecimal::ZERO {
            return false;
        }
        // The corner farthest from the wafer center decides
        let two = JobDecimal::new(2, 0);
        let corner = |c: JobDecimal, s: JobDecimal| c.abs().checked_add(s / two);
        let (dx, dy) = match (corner(center.x, size.x), corner(center.y, size.y)) {
            (Some(dx), Some(dy)) => (dx, dy),
            _ => return false,
        };
        if dx > radius || dy > radius {
            return false;
        }
        let square = |v: JobDecimal| v.checked_mul(v);
        let d2 = square(dx).zip(square(dy)).and_then(|(x2, y2)| x2.checked_add(y2));
        match (d2, square(radius)) {
            (Some(d2), Some(r2)) => d2 <= r2,
            // Radius squared beyond range: any representable distance is inside
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
    /// Check our internal invariants
    pub(crate) fn validate(&self) -> JobResult<()> {
        let checker = Checker(ErrorContext::Wafer);
        checker.assert(
            self.diameter > JobDecimal::ZERO,
            format!("Wafer diameter {} must be positive", self.diameter),
        )?;
        for (name, val) in [
            ("Round edge clearance", self.round_edge_clearance),
            ("Flat edge clearance", self.flat_edge_clearance),
            ("Edge exclusion", self.edge_exclusion),
        ] {
            checker.assert(
                val >= JobDecimal::ZERO,
                format!("{} {} must be non-negative", name, val),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_footprints() {
        let wafer = WaferGeometry {
            edge_exclusion: dec!(5),
            ..Default::default()
        };
        assert_eq!(wafer.usable_radius(), dec!(45));
        let size = Xy::new(2, 2);
        assert!(wafer.contains_footprint(Xy::default(), size));
        // Far corner (27, 36) exactly on the boundary
        assert!(wafer.contains_footprint(Xy::new(26, 35), size));
        assert!(!wafer.contains_footprint(Xy::new(dec!(26.001), 35), size));
        // Far edge on the boundary, with the corner beyond it
        assert!(!wafer.contains_footprint(Xy::new(44, 0), size));
        assert!(wafer.contains_footprint(Xy::new(44, 0), Xy::new(2, 0)));
        // Corners count, not just edges
        assert!(!wafer.contains_footprint(Xy::new(31, -31), size));
        assert!(wafer.contains_footprint(Xy::new(30, -30), size));
    }
    #[test]
    fn test_distant_footprints() {
        let wafer = WaferGeometry::default();
        let size = Xy::new(10, 10);
        let far = JobDecimal::from_i128_with_scale(10_i128.pow(15), 0);
        assert!(!wafer.contains_footprint(Xy::new(far, 0), size));
        assert!(!wafer.contains_footprint(Xy::new(0, -far), size));
        assert!(!wafer.contains_footprint(Xy::new(JobDecimal::MAX, JobDecimal::MIN), size));
        // Wafers whose squared radius is out of range
        let huge = WaferGeometry {
            diameter: JobDecimal::MAX,
            ..Default::default()
        };
        let near = JobDecimal::from_i128_with_scale(10_i128.pow(13), 0);
        assert!(huge.contains_footprint(Xy::new(near, near), size));
    }
    #[test]
    fn test_validate() {
        assert!(WaferGeometry::default().validate().is_ok());
        let wafer = WaferGeometry {
            flat_edge_clearance: dec!(-1),
            ..Default::default()
        };
        assert!(wafer.validate().is_err());
    }
}
