//! Shelling parameters.

use armor_config::GenerationRequest;
use armor_kernel::Tolerance;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default slope limit of the wall-thickness field.
pub const DEFAULT_LIPSCHITZ: f64 = 0.5;

/// Default share of the inscribed-ball radius used where it limits the wall.
pub const DEFAULT_LIMIT_FRACTION: f64 = 0.9;

/// Parameters for [`ShellingEngine`](crate::ShellingEngine).
///
/// # Example
///
/// ```
/// use armor_shell::ShellParams;
///
/// let params = ShellParams::new(4.0, 2.0).with_lipschitz(0.25);
/// assert_eq!(params.thickness, 4.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShellParams {
    /// Target wall thickness.
    pub thickness: f64,
    /// Thinnest wall allowed where curvature forces a reduction.
    pub min_thickness: f64,
    /// Largest change of thickness per unit of surface distance.
    pub lipschitz: f64,
    /// Share of the inscribed-ball radius used where it is below the target.
    ///
    /// Offsetting by the full radius collapses the cavity onto the medial
    /// axis, so the wall stops short of it.
    pub limit_fraction: f64,
    /// Kernel tolerance for the offset.
    pub tolerance: Tolerance,
}

impl Default for ShellParams {
    fn default() -> Self {
        Self::new(4.0, 2.0)
    }
}

impl ShellParams {
    /// Parameters for a target and minimum wall thickness.
    #[must_use]
    pub fn new(thickness: f64, min_thickness: f64) -> Self {
        Self {
            thickness,
            min_thickness,
            lipschitz: DEFAULT_LIPSCHITZ,
            limit_fraction: DEFAULT_LIMIT_FRACTION,
            tolerance: Tolerance::default(),
        }
    }

    /// Parameters taking the scaled wall limits of a request.
    #[must_use]
    pub fn for_request(request: &GenerationRequest) -> Self {
        Self::new(
            request.scaled_wall_thickness(),
            request.scaled_min_wall_thickness(),
        )
    }

    /// Set the slope limit.
    #[must_use]
    pub const fn with_lipschitz(mut self, lipschitz: f64) -> Self {
        self.lipschitz = lipschitz;
        self
    }

    /// Set the share of the ball radius used where it limits the wall.
    #[must_use]
    pub const fn with_limit_fraction(mut self, fraction: f64) -> Self {
        self.limit_fraction = fraction;
        self
    }

    /// Set the kernel tolerance.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }
}
