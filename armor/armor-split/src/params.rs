//! Splitting parameters.

use armor_config::GenerationRequest;
use armor_kernel::Tolerance;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default arc length between interlock key sites, in millimeters.
pub const DEFAULT_KEY_SPACING: f64 = 60.0;

/// Default fit clearance around recesses, in millimeters.
pub const DEFAULT_KEY_CLEARANCE: f64 = 0.2;

/// Parameters for [`Splitter`](crate::Splitter).
///
/// Key dimensions are multiples of the wall thickness so they follow the
/// print scale.
///
/// # Example
///
/// ```
/// use armor_split::SplitParams;
///
/// let params = SplitParams::new([200.0, 200.0, 200.0], 4.0).with_keys(false);
/// assert!(!params.keys);
/// assert_eq!(params.key_half_width(), 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SplitParams {
    /// Print bed size in millimeters.
    pub bed: [f64; 3],
    /// Slack allowed when testing the bed fit.
    pub fit_tolerance: f64,
    /// Wall thickness of the shells being split.
    pub wall_thickness: f64,
    /// Whether cuts get interlock keys.
    pub keys: bool,
    /// Arc length between key sites.
    pub key_spacing: f64,
    /// Key length along the seam, as a multiple of the wall.
    pub key_length_ratio: f64,
    /// Key width across the wall strip, as a multiple of the wall.
    pub key_width_ratio: f64,
    /// Tab height along the seam normal, as a multiple of the wall.
    pub key_height_ratio: f64,
    /// Recess clearance.
    pub key_clearance: f64,
    /// Step between tried seam positions.
    pub shift_step: f64,
    /// Smallest distance between a seam and a mount seat.
    pub mount_clearance: f64,
    /// Kernel tolerance for the cuts.
    pub tolerance: Tolerance,
}

impl Default for SplitParams {
    fn default() -> Self {
        Self::new(GenerationRequest::DEFAULT_PRINT_BED, 4.0)
    }
}

impl SplitParams {
    /// Parameters for a print bed and wall thickness.
    #[must_use]
    pub fn new(bed: [f64; 3], wall_thickness: f64) -> Self {
        Self {
            bed,
            fit_tolerance: 1e-6,
            wall_thickness,
            keys: true,
            key_spacing: DEFAULT_KEY_SPACING,
            key_length_ratio: 2.5,
            key_width_ratio: 0.5,
            key_height_ratio: 1.5,
            key_clearance: DEFAULT_KEY_CLEARANCE,
            shift_step: 5.0,
            mount_clearance: 3.0,
            tolerance: Tolerance::default(),
        }
    }

    /// Parameters for a request: its bed, its scaled wall, and spacing and
    /// clearances scaled with the print.
    ///
    /// The bed and the recess fit clearance are printer properties and do
    /// not scale.
    #[must_use]
    pub fn for_request(request: &GenerationRequest) -> Self {
        let base = Self::new(request.print_bed(), request.scaled_wall_thickness());
        Self {
            key_spacing: request.scaled(base.key_spacing),
            shift_step: request.scaled(base.shift_step),
            mount_clearance: request.scaled(base.mount_clearance),
            ..base
        }
    }

    /// Enable or disable interlock keys.
    #[must_use]
    pub const fn with_keys(mut self, keys: bool) -> Self {
        self.keys = keys;
        self
    }

    /// Set the key spacing.
    #[must_use]
    pub const fn with_key_spacing(mut self, spacing: f64) -> Self {
        self.key_spacing = spacing;
        self
    }

    /// Set the seam shift step.
    #[must_use]
    pub const fn with_shift_step(mut self, step: f64) -> Self {
        self.shift_step = step;
        self
    }

    /// Set the seam-to-mount clearance.
    #[must_use]
    pub const fn with_mount_clearance(mut self, clearance: f64) -> Self {
        self.mount_clearance = clearance;
        self
    }

    /// Set the kernel tolerance.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Half the key length.
    #[must_use]
    pub fn key_half_length(&self) -> f64 {
        0.5 * self.key_length_ratio * self.wall_thickness
    }

    /// Half the key width.
    #[must_use]
    pub fn key_half_width(&self) -> f64 {
        0.5 * self.key_width_ratio * self.wall_thickness
    }

    /// Tab height.
    #[must_use]
    pub fn key_height(&self) -> f64 {
        self.key_height_ratio * self.wall_thickness
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use armor_config::SizeClass;

    #[test]
    fn half_scale_request() {
        let request = GenerationRequest::builder()
            .size(SizeClass::M)
            .scale(0.5)
            .print_bed([180.0, 180.0, 180.0])
            .build()
            .unwrap();
        let params = SplitParams::for_request(&request);
        assert_eq!(params.bed, [180.0, 180.0, 180.0]);
        assert_relative_eq!(params.wall_thickness, 2.0);
        assert_relative_eq!(params.key_spacing, 30.0);
        assert_relative_eq!(params.mount_clearance, 1.5);
        assert_relative_eq!(params.key_clearance, DEFAULT_KEY_CLEARANCE);
        assert_relative_eq!(params.key_half_length(), 2.5);
        assert_relative_eq!(params.key_height(), 3.0);
    }
}
