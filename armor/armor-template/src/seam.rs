//! Seam planes used to split oversized pieces.

use armor_types::{Aabb, Axis, Plane};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned seam, positioned relative to the whole piece's bounds.
///
/// The plane sits at `fraction` of the bounding box along `axis`, and may be
/// moved by up to `max_shift` (also a fraction of the box extent) in either
/// direction to clear mounts. `labels` name the sub-pieces on the low and
/// high sides.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SeamPlane {
    /// Cut axis.
    pub axis: Axis,
    /// Nominal position in `[0, 1]` of the bounds.
    pub fraction: f64,
    /// Largest allowed shift, fraction of the bounds.
    pub max_shift: f64,
    /// Labels of the low and high sides.
    pub labels: (String, String),
}

impl SeamPlane {
    /// Create a seam with a 10 % shift allowance.
    #[must_use]
    pub fn new(axis: Axis, fraction: f64, low: impl Into<String>, high: impl Into<String>) -> Self {
        Self {
            axis,
            fraction,
            max_shift: 0.1,
            labels: (low.into(), high.into()),
        }
    }

    /// Set the shift allowance.
    #[must_use]
    pub const fn with_max_shift(mut self, max_shift: f64) -> Self {
        self.max_shift = max_shift;
        self
    }

    /// Nominal plane for a piece's bounds, normal along `+axis`.
    #[must_use]
    pub fn plane(&self, bounds: &Aabb) -> Plane {
        let i = self.axis.index();
        let offset = bounds.min[i] + self.fraction * (bounds.max[i] - bounds.min[i]);
        Plane::axis_aligned(self.axis, offset)
    }

    /// Largest shift in millimeters for a piece's bounds.
    #[must_use]
    pub fn max_shift_mm(&self, bounds: &Aabb) -> f64 {
        self.max_shift * bounds.extent()[self.axis.index()]
    }

    /// The seam as seen on the mirror image of the piece.
    ///
    /// Lateral seams flip their position; the others are unchanged. Labels
    /// still name the low and high sides along the axis, so lateral labels
    /// swap.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        match self.axis {
            Axis::X => Self {
                axis: Axis::X,
                fraction: 1.0 - self.fraction,
                max_shift: self.max_shift,
                labels: (self.labels.1.clone(), self.labels.0.clone()),
            },
            Axis::Y | Axis::Z => self.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use armor_types::Point3;

    #[test]
    fn plane_follows_bounds() {
        let bounds = Aabb::new(Point3::new(-10.0, 0.0, 100.0), Point3::new(10.0, 50.0, 400.0));
        let seam = SeamPlane::new(Axis::Z, 0.25, "lower", "upper");
        let plane = seam.plane(&bounds);
        assert_relative_eq!(plane.origin.z, 175.0);
        assert_relative_eq!(seam.max_shift_mm(&bounds), 30.0);
    }

    #[test]
    fn lateral_seams_mirror() {
        let seam = SeamPlane::new(Axis::X, 0.3, "right", "left");
        let m = seam.mirrored();
        assert_relative_eq!(m.fraction, 0.7);
        assert_eq!(m.labels, ("left".to_string(), "right".to_string()));
        assert_relative_eq!(m.mirrored().fraction, 0.3, epsilon = 1e-12);

        let vertical = SeamPlane::new(Axis::Z, 0.5, "lower", "upper");
        assert_eq!(vertical.mirrored(), vertical);
    }
}
