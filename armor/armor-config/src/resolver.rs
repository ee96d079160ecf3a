//! Turning size classes or custom inputs into a validated profile.

use crate::dimension::Dimension;
use crate::error::ConfigResult;
use crate::profile::{MeasurementProfile, SizeClass};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Where a request's measurements come from.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MeasurementInput {
    /// A standard size class.
    Standard(SizeClass),
    /// A complete custom profile, used as-is after validation.
    Custom(MeasurementProfile),
    /// A size class with some dimensions replaced.
    ///
    /// Dimensions derived from an overridden one (see
    /// [`Dimension::dependents`]) are rescaled by the same ratio unless they
    /// are overridden too.
    Overrides {
        /// Starting size class.
        base: SizeClass,
        /// Replacement values in millimeters.
        values: Vec<(Dimension, f64)>,
    },
}

impl Default for MeasurementInput {
    fn default() -> Self {
        Self::Standard(SizeClass::M)
    }
}

/// Resolves a [`MeasurementInput`] into a canonical, validated profile.
///
/// # Example
///
/// ```
/// use armor_config::{Dimension, MeasurementInput, MeasurementResolver, SizeClass};
///
/// let input = MeasurementInput::Overrides {
///     base: SizeClass::M,
///     values: vec![(Dimension::HeadCircumference, 627.0)],
/// };
/// let profile = MeasurementResolver::new().resolve(&input, 1.0, 20.0).unwrap();
///
/// // Head length follows head circumference (+10 %).
/// assert!((profile.get(Dimension::HeadLength) - 220.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MeasurementResolver;

impl MeasurementResolver {
    /// Create a resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Resolve and validate.
    ///
    /// `scale` and `clearance` replace whatever the input carries; a custom
    /// profile keeps its own dimension values.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`](crate::ValidationError) if any value is
    /// out of range, a proportion check fails, or `scale`/`clearance` are
    /// invalid.
    pub fn resolve(
        &self,
        input: &MeasurementInput,
        scale: f64,
        clearance: f64,
    ) -> ConfigResult<MeasurementProfile> {
        let profile = match input {
            MeasurementInput::Standard(size) => MeasurementProfile::standard(*size),
            MeasurementInput::Custom(profile) => profile.clone(),
            MeasurementInput::Overrides { base, values } => apply_overrides(*base, values),
        }
        .with_scale(scale)
        .with_clearance(clearance);

        profile.validate()?;
        debug!(
            scale,
            clearance,
            chest = profile.get(Dimension::ChestCircumference),
            height = profile.get(Dimension::Height),
            "resolved measurements"
        );
        Ok(profile)
    }
}

fn apply_overrides(base: SizeClass, values: &[(Dimension, f64)]) -> MeasurementProfile {
    let reference = MeasurementProfile::standard(base);
    let mut profile = reference.clone();
    let overridden = |d: Dimension| values.iter().any(|(o, _)| *o == d);

    for &(dimension, value) in values {
        profile.set(dimension, value);
        let ratio = value / reference.get(dimension);
        for &dependent in dimension.dependents() {
            if !overridden(dependent) {
                profile.set(dependent, reference.get(dependent) * ratio);
            }
        }
    }
    profile
}
