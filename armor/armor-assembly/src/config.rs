//! Engine tuning.

use armor_config::GenerationRequest;
use armor_deform::DeformParams;
use armor_kernel::Tolerance;
use armor_mount::MountParams;
use armor_shell::{DEFAULT_LIMIT_FRACTION, DEFAULT_LIPSCHITZ, ShellParams};
use armor_split::{DEFAULT_KEY_SPACING, SplitParams};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Settings that stay fixed across requests.
///
/// Everything that depends on the wearer or the print (sizes, walls, bed,
/// scale) comes from the [`GenerationRequest`]; the per-stage parameters are
/// derived from both.
///
/// # Example
///
/// ```
/// use armor_assembly::EngineConfig;
///
/// let config = EngineConfig::default().with_interlock_keys(false).with_parallel(false);
/// assert!(!config.interlock_keys);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineConfig {
    /// Loft attempt budget.
    pub deform: DeformParams,
    /// Slope limit of the wall-thickness field.
    pub lipschitz: f64,
    /// Share of the inscribed-ball radius used where it limits the wall.
    pub limit_fraction: f64,
    /// Whether seam cuts get interlock keys.
    pub interlock_keys: bool,
    /// Full-size arc length between interlock keys.
    pub key_spacing: f64,
    /// Kernel tolerance for every stage.
    pub tolerance: Tolerance,
    /// Run pieces on the rayon pool rather than one after another.
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            deform: DeformParams::default(),
            lipschitz: DEFAULT_LIPSCHITZ,
            limit_fraction: DEFAULT_LIMIT_FRACTION,
            interlock_keys: true,
            key_spacing: DEFAULT_KEY_SPACING,
            tolerance: Tolerance::default(),
            parallel: true,
        }
    }
}

impl EngineConfig {
    /// Set the loft attempt budget.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.deform = self.deform.with_max_attempts(attempts);
        self
    }

    /// Enable or disable interlock keys.
    #[must_use]
    pub const fn with_interlock_keys(mut self, enabled: bool) -> Self {
        self.interlock_keys = enabled;
        self
    }

    /// Set the full-size key spacing.
    #[must_use]
    pub const fn with_key_spacing(mut self, spacing: f64) -> Self {
        self.key_spacing = spacing;
        self
    }

    /// Set the kernel tolerance.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Run pieces in parallel or sequentially.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Deformation parameters.
    #[must_use]
    pub fn deform_params(&self) -> DeformParams {
        self.deform.with_tolerance(self.tolerance)
    }

    /// Shelling parameters for a request.
    #[must_use]
    pub fn shell_params(&self, request: &GenerationRequest) -> ShellParams {
        ShellParams::for_request(request)
            .with_lipschitz(self.lipschitz)
            .with_limit_fraction(self.limit_fraction)
            .with_tolerance(self.tolerance)
    }

    /// Splitting parameters for a request.
    #[must_use]
    pub fn split_params(&self, request: &GenerationRequest) -> SplitParams {
        SplitParams::for_request(request)
            .with_keys(self.interlock_keys)
            .with_key_spacing(request.scaled(self.key_spacing))
            .with_tolerance(self.tolerance)
    }

    /// Mount parameters for a request.
    #[must_use]
    pub fn mount_params(&self, request: &GenerationRequest) -> MountParams {
        MountParams::for_request(request).with_tolerance(self.tolerance)
    }
}
