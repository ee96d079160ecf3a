//! Deformation parameters.

use armor_kernel::Tolerance;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default number of loft attempts before a piece fails.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Parameters for [`Deformer`](crate::Deformer).
///
/// # Example
///
/// ```
/// use armor_deform::DeformParams;
///
/// let params = DeformParams::default().with_max_attempts(2);
/// assert_eq!(params.max_attempts, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeformParams {
    /// Loft attempts, each with a looser [`Relaxation`](armor_template::Relaxation).
    pub max_attempts: u32,
    /// Kernel tolerance for the first try of each loft.
    pub tolerance: Tolerance,
}

impl Default for DeformParams {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            tolerance: Tolerance::default(),
        }
    }
}

impl DeformParams {
    /// Set the attempt limit. Values below one are raised to one.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the kernel tolerance.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let params = DeformParams::default();
        assert_eq!(params.max_attempts, 4);
        assert_eq!(params.tolerance, Tolerance::default());
    }

    #[test]
    fn at_least_one_attempt() {
        assert_eq!(DeformParams::default().with_max_attempts(0).max_attempts, 1);
    }
}
