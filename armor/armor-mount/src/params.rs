//! Mount placement and carving parameters.

use armor_config::GenerationRequest;
use armor_kernel::Tolerance;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters for [`MountPlacer`](crate::MountPlacer).
///
/// Lengths are in output millimeters, so they already carry the print scale.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MountParams {
    /// Nominal wall thickness; seat depths are fractions of it.
    pub wall_thickness: f64,
    /// Smallest allowed distance from a pocket floor to the cavity.
    pub cavity_margin: f64,
    /// Seat size factor for the single retry.
    pub retry_scale: f64,
    /// Print scale applied to strap widths.
    pub scale: f64,
    /// Kernel tolerance for the seat cuts.
    pub tolerance: Tolerance,
}

impl Default for MountParams {
    fn default() -> Self {
        Self::new(4.0, 2.0)
    }
}

impl MountParams {
    /// Parameters for a wall thickness and minimum wall.
    ///
    /// The cavity margin is half the minimum wall.
    #[must_use]
    pub fn new(wall_thickness: f64, min_wall_thickness: f64) -> Self {
        Self {
            wall_thickness,
            cavity_margin: 0.5 * min_wall_thickness,
            retry_scale: 0.5,
            scale: 1.0,
            tolerance: Tolerance::default(),
        }
    }

    /// Parameters taking the scaled wall limits and scale of a request.
    #[must_use]
    pub fn for_request(request: &GenerationRequest) -> Self {
        Self {
            scale: request.scale(),
            ..Self::new(
                request.scaled_wall_thickness(),
                request.scaled_min_wall_thickness(),
            )
        }
    }

    /// Set the cavity margin.
    #[must_use]
    pub const fn with_cavity_margin(mut self, margin: f64) -> Self {
        self.cavity_margin = margin;
        self
    }

    /// Set the kernel tolerance.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the retry size factor.
    #[must_use]
    pub const fn with_retry_scale(mut self, factor: f64) -> Self {
        self.retry_scale = factor;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use armor_config::SizeClass;

    #[test]
    fn request_scaling() {
        let request = GenerationRequest::builder()
            .size(SizeClass::L)
            .scale(0.5)
            .build()
            .unwrap();
        let params = MountParams::for_request(&request);
        assert_relative_eq!(params.wall_thickness, 2.0);
        assert_relative_eq!(params.cavity_margin, 0.5);
        assert_relative_eq!(params.scale, 0.5);
        let loose = params.with_tolerance(Tolerance::new(1e-4));
        assert_relative_eq!(loose.tolerance.linear, 1e-4);
        assert_relative_eq!(loose.retry_scale, 0.5);
    }
}
