//! Measurement profiles and standard size classes.

use crate::dimension::{DIMENSION_COUNT, Dimension};
use crate::error::{ConfigResult, ValidationError};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Standard garment size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SizeClass {
    /// Extra small.
    Xs,
    /// Small.
    S,
    /// Medium, the reference size.
    #[default]
    M,
    /// Large.
    L,
    /// Extra large.
    Xl,
    /// Double extra large.
    Xxl,
}

impl SizeClass {
    /// All size classes, smallest first.
    pub const ALL: [Self; 6] = [Self::Xs, Self::S, Self::M, Self::L, Self::Xl, Self::Xxl];

    /// Uniform multiplier applied to the size M reference table.
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Xs => 0.90,
            Self::S => 0.95,
            Self::M => 1.00,
            Self::L => 1.05,
            Self::Xl => 1.10,
            Self::Xxl => 1.15,
        }
    }

    /// Label such as `XL`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Xs => "XS",
            Self::S => "S",
            Self::M => "M",
            Self::L => "L",
            Self::Xl => "XL",
            Self::Xxl => "XXL",
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SizeClass {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|size| size.label() == upper)
            .ok_or_else(|| ValidationError::new("size", format!("unknown size class '{s}'")))
    }
}

/// Fit clearance added to fitted dimensions by default, in millimeters.
pub const DEFAULT_CLEARANCE: f64 = 20.0;

/// Largest accepted fit clearance, in millimeters.
pub const MAX_CLEARANCE: f64 = 60.0;

/// A full set of body measurements plus fit clearance and print scale.
///
/// Values are stored at full (wearable) size; `scale` is applied later, to
/// geometry.
///
/// # Example
///
/// ```
/// use armor_config::{Dimension, MeasurementProfile, SizeClass};
///
/// let large = MeasurementProfile::standard(SizeClass::L);
/// assert!((large.get(Dimension::ChestCircumference) - 1050.0).abs() < 1e-9);
/// assert!(large.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeasurementProfile {
    values: [f64; DIMENSION_COUNT],
    /// Fit clearance in millimeters.
    pub clearance: f64,
    /// Uniform print scale in `(0, 1]`.
    pub scale: f64,
}

impl Default for MeasurementProfile {
    fn default() -> Self {
        Self::standard(SizeClass::M)
    }
}

impl MeasurementProfile {
    /// The reference table scaled for a size class.
    #[must_use]
    pub fn standard(size: SizeClass) -> Self {
        let m = size.multiplier();
        Self {
            values: Dimension::ALL.map(|d| d.reference() * m),
            clearance: DEFAULT_CLEARANCE,
            scale: 1.0,
        }
    }

    /// Value of one dimension.
    #[must_use]
    pub const fn get(&self, dimension: Dimension) -> f64 {
        self.values[dimension.index()]
    }

    /// Set one dimension.
    pub const fn set(&mut self, dimension: Dimension, value: f64) {
        self.values[dimension.index()] = value;
    }

    /// Copy with one dimension changed.
    #[must_use]
    pub const fn with(mut self, dimension: Dimension, value: f64) -> Self {
        self.set(dimension, value);
        self
    }

    /// Copy with a different clearance.
    #[must_use]
    pub const fn with_clearance(mut self, clearance: f64) -> Self {
        self.clearance = clearance;
        self
    }

    /// Copy with a different scale.
    #[must_use]
    pub const fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// A dimension plus the fit clearance, at full size.
    #[must_use]
    pub fn fitted(&self, dimension: Dimension) -> f64 {
        self.get(dimension) + self.clearance
    }

    /// Iterate `(dimension, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        Dimension::ALL.into_iter().map(|d| (d, self.get(d)))
    }

    /// Check ranges, proportions, scale and clearance.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> ConfigResult<()> {
        for (d, value) in self.iter() {
            let (min, max) = d.range();
            if !value.is_finite() || value <= 0.0 {
                return Err(ValidationError::new(d.name(), "must be a positive number"));
            }
            if value < min || value > max {
                return Err(ValidationError::out_of_range(d.name(), value, min, max));
            }
        }
        self.check_proportions()?;

        if !(self.scale > 0.0 && self.scale <= 1.0) {
            return Err(ValidationError::new(
                "scale",
                format!("{} is outside (0, 1]", self.scale),
            ));
        }
        if !(0.0..=MAX_CLEARANCE).contains(&self.clearance) {
            return Err(ValidationError::out_of_range(
                "clearance",
                self.clearance,
                0.0,
                MAX_CLEARANCE,
            ));
        }
        Ok(())
    }

    fn check_proportions(&self) -> ConfigResult<()> {
        use Dimension as D;

        let smaller = [
            (D::ShoulderWidth, D::ChestCircumference, true),
            (D::WristCircumference, D::ForearmCircumference, false),
            (D::ForearmCircumference, D::UpperArmCircumference, true),
            (D::AnkleCircumference, D::CalfCircumference, false),
            (D::KneeCircumference, D::ThighCircumference, false),
            (D::HandWidth, D::HandLength, false),
            (D::FootWidth, D::FootLength, false),
            (D::NeckCircumference, D::HeadCircumference, false),
            (D::HeadWidth, D::HeadLength, true),
        ];
        for (a, b, allow_equal) in smaller {
            let (va, vb) = (self.get(a), self.get(b));
            if va > vb || (!allow_equal && va >= vb) {
                let relation = if allow_equal { "at most" } else { "less than" };
                return Err(ValidationError::new(
                    a.name(),
                    format!("{va} must be {relation} {} ({vb})", b.name()),
                ));
            }
        }

        let height = self.get(D::Height);
        let spans = [
            (
                "arm_length",
                self.get(D::UpperArmLength) + self.get(D::ForearmLength) + self.get(D::HandLength),
                0.6,
            ),
            (
                "leg_length",
                self.get(D::ThighLength) + self.get(D::CalfLength),
                0.6,
            ),
            (
                "torso_length",
                self.get(D::TorsoLength) + self.get(D::HeadHeight),
                0.55,
            ),
        ];
        for (field, span, fraction) in spans {
            if span >= fraction * height {
                return Err(ValidationError::new(
                    field,
                    format!("{span} exceeds {fraction} of height ({height})"),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn every_standard_size_validates() {
        for size in SizeClass::ALL {
            let profile = MeasurementProfile::standard(size);
            assert!(profile.validate().is_ok(), "{size}: {:?}", profile.validate());
        }
    }

    #[test]
    fn size_multipliers() {
        let xl = MeasurementProfile::standard(SizeClass::Xl);
        assert_relative_eq!(xl.get(Dimension::Height), 1925.0, epsilon = 1e-9);
        assert_relative_eq!(
            MeasurementProfile::standard(SizeClass::Xs).get(Dimension::FootWidth),
            90.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn parse_size_class() {
        assert_eq!("xl".parse::<SizeClass>().unwrap(), SizeClass::Xl);
        assert_eq!(" XXL ".parse::<SizeClass>().unwrap(), SizeClass::Xxl);
        let err = "huge".parse::<SizeClass>().unwrap_err();
        assert_eq!(err.field, "size");
    }

    #[test]
    fn chest_below_minimum_rejected() {
        let profile = MeasurementProfile::default().with(Dimension::ChestCircumference, 600.0);
        let err = profile.validate().unwrap_err();
        assert_eq!(err.field, "chest_circumference");
    }

    #[test]
    fn proportion_violation_rejected() {
        let profile = MeasurementProfile::default()
            .with(Dimension::WristCircumference, 240.0)
            .with(Dimension::ForearmCircumference, 230.0);
        let err = profile.validate().unwrap_err();
        assert_eq!(err.field, "wrist_circumference");
    }

    #[test]
    fn scale_and_clearance_limits() {
        let base = MeasurementProfile::default();
        assert_eq!(base.clone().with_scale(0.0).validate().unwrap_err().field, "scale");
        assert_eq!(base.clone().with_scale(1.5).validate().unwrap_err().field, "scale");
        assert!(base.clone().with_scale(0.1).validate().is_ok());
        assert_eq!(
            base.clone().with_clearance(80.0).validate().unwrap_err().field,
            "clearance"
        );
        assert!(base.with_clearance(0.0).validate().is_ok());
    }

    #[test]
    fn fitted_adds_clearance() {
        let profile = MeasurementProfile::default();
        assert_relative_eq!(profile.fitted(Dimension::HeadWidth), 180.0);
    }
}
