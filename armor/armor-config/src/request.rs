//! The immutable generation request threaded through every stage.

use crate::dimension::Dimension;
use crate::error::{ConfigResult, ValidationError};
use crate::profile::{DEFAULT_CLEARANCE, MeasurementProfile, SizeClass};
use crate::resolver::{MeasurementInput, MeasurementResolver};
use armor_types::PieceKind;
use tracing::info;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tessellation density. Controls sample counts only, never topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetailLevel(u8);

impl DetailLevel {
    /// Coarsest level.
    pub const MIN: u8 = 1;
    /// Finest level.
    pub const MAX: u8 = 4;

    /// Create a detail level.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] outside `1..=4`.
    pub fn new(level: u8) -> ConfigResult<Self> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(Self(level))
        } else {
            Err(ValidationError::new(
                "detail",
                format!("{level} is outside {}..={}", Self::MIN, Self::MAX),
            ))
        }
    }

    /// The numeric level.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Points per section ring.
    #[must_use]
    pub const fn ring_samples(self) -> usize {
        match self.0 {
            1 => 48,
            2 => 72,
            3 => 96,
            _ => 128,
        }
    }

    /// Sections along the piece axis.
    #[must_use]
    pub const fn stations(self) -> usize {
        match self.0 {
            1 => 20,
            2 => 30,
            3 => 40,
            _ => 52,
        }
    }
}

impl Default for DetailLevel {
    fn default() -> Self {
        Self(2)
    }
}

/// A complete, validated description of one generation run.
///
/// Built once through [`GenerationRequest::builder`] and then only read.
/// Measurements are at full size; every millimeter length used for geometry
/// goes through [`GenerationRequest::scaled`].
///
/// # Example
///
/// ```
/// use armor_config::{GenerationRequest, SizeClass};
/// use armor_types::PieceKind;
///
/// let request = GenerationRequest::builder()
///     .size(SizeClass::L)
///     .pieces(vec![PieceKind::Helmet])
///     .detail(1)
///     .build()
///     .unwrap();
///
/// assert_eq!(request.pieces(), &[PieceKind::Helmet]);
/// assert!((request.wall_thickness() - 4.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GenerationRequest {
    input: MeasurementInput,
    measurements: MeasurementProfile,
    pieces: Vec<PieceKind>,
    detail: DetailLevel,
    wall_thickness: f64,
    min_wall_thickness: f64,
    print_bed: [f64; 3],
    color_scheme: String,
    include_mounts: bool,
    split_for_printing: bool,
}

impl GenerationRequest {
    /// Default wall thickness at full size, in millimeters.
    pub const DEFAULT_WALL_THICKNESS: f64 = 4.0;
    /// Default minimum wall thickness at full size, in millimeters.
    pub const DEFAULT_MIN_WALL_THICKNESS: f64 = 2.0;
    /// Default print bed, in millimeters.
    pub const DEFAULT_PRINT_BED: [f64; 3] = [256.0, 256.0, 256.0];
    /// Default color scheme identifier.
    pub const DEFAULT_COLOR_SCHEME: &'static str = "kholin_blue";

    /// Start building a request.
    #[must_use]
    pub fn builder() -> GenerationRequestBuilder {
        GenerationRequestBuilder::default()
    }

    /// How the measurements were specified.
    #[must_use]
    pub const fn input(&self) -> &MeasurementInput {
        &self.input
    }

    /// The resolved measurement profile.
    #[must_use]
    pub const fn measurements(&self) -> &MeasurementProfile {
        &self.measurements
    }

    /// Selected pieces, in output order.
    #[must_use]
    pub fn pieces(&self) -> &[PieceKind] {
        &self.pieces
    }

    /// Tessellation density.
    #[must_use]
    pub const fn detail(&self) -> DetailLevel {
        self.detail
    }

    /// Uniform print scale.
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.measurements.scale
    }

    /// Fit clearance at full size.
    #[must_use]
    pub const fn clearance(&self) -> f64 {
        self.measurements.clearance
    }

    /// Target wall thickness at full size.
    #[must_use]
    pub const fn wall_thickness(&self) -> f64 {
        self.wall_thickness
    }

    /// Minimum wall thickness at full size.
    #[must_use]
    pub const fn min_wall_thickness(&self) -> f64 {
        self.min_wall_thickness
    }

    /// Print bed size in millimeters. Not scaled.
    #[must_use]
    pub const fn print_bed(&self) -> [f64; 3] {
        self.print_bed
    }

    /// Color scheme identifier echoed into the manifest.
    #[must_use]
    pub fn color_scheme(&self) -> &str {
        &self.color_scheme
    }

    /// Whether strap mounts are placed.
    #[must_use]
    pub const fn include_mounts(&self) -> bool {
        self.include_mounts
    }

    /// Whether oversized pieces are split for the print bed.
    #[must_use]
    pub const fn split_for_printing(&self) -> bool {
        self.split_for_printing
    }

    /// A full-size length converted to output millimeters.
    #[must_use]
    pub fn scaled(&self, length: f64) -> f64 {
        length * self.measurements.scale
    }

    /// Wall thickness in output millimeters.
    #[must_use]
    pub fn scaled_wall_thickness(&self) -> f64 {
        self.scaled(self.wall_thickness)
    }

    /// Minimum wall thickness in output millimeters.
    #[must_use]
    pub fn scaled_min_wall_thickness(&self) -> f64 {
        self.scaled(self.min_wall_thickness)
    }

    /// Copy with a different piece selection.
    #[must_use]
    pub fn with_pieces(mut self, pieces: Vec<PieceKind>) -> Self {
        self.pieces = pieces;
        self
    }
}

/// Builder for [`GenerationRequest`].
#[derive(Debug, Clone)]
pub struct GenerationRequestBuilder {
    input: MeasurementInput,
    pieces: Vec<PieceKind>,
    detail: u8,
    wall_thickness: f64,
    min_wall_thickness: f64,
    print_bed: [f64; 3],
    scale: f64,
    clearance: f64,
    color_scheme: String,
    include_mounts: bool,
    split_for_printing: bool,
}

impl Default for GenerationRequestBuilder {
    fn default() -> Self {
        Self {
            input: MeasurementInput::default(),
            pieces: PieceKind::ALL.to_vec(),
            detail: DetailLevel::default().get(),
            wall_thickness: GenerationRequest::DEFAULT_WALL_THICKNESS,
            min_wall_thickness: GenerationRequest::DEFAULT_MIN_WALL_THICKNESS,
            print_bed: GenerationRequest::DEFAULT_PRINT_BED,
            scale: 1.0,
            clearance: DEFAULT_CLEARANCE,
            color_scheme: GenerationRequest::DEFAULT_COLOR_SCHEME.to_string(),
            include_mounts: true,
            split_for_printing: true,
        }
    }
}

impl GenerationRequestBuilder {
    /// Use a standard size class.
    #[must_use]
    pub fn size(mut self, size: SizeClass) -> Self {
        self.input = MeasurementInput::Standard(size);
        self
    }

    /// Use a complete custom profile. Its scale and clearance are kept
    /// unless overridden later in the chain.
    #[must_use]
    pub fn custom(mut self, profile: MeasurementProfile) -> Self {
        self.scale = profile.scale;
        self.clearance = profile.clearance;
        self.input = MeasurementInput::Custom(profile);
        self
    }

    /// Override one dimension on top of the current size class.
    #[must_use]
    pub fn measurement(mut self, dimension: Dimension, value: f64) -> Self {
        self.input = match self.input {
            MeasurementInput::Standard(base) => MeasurementInput::Overrides {
                base,
                values: vec![(dimension, value)],
            },
            MeasurementInput::Overrides { base, mut values } => {
                values.retain(|(d, _)| *d != dimension);
                values.push((dimension, value));
                MeasurementInput::Overrides { base, values }
            }
            MeasurementInput::Custom(profile) => {
                MeasurementInput::Custom(profile.with(dimension, value))
            }
        };
        self
    }

    /// Select pieces.
    #[must_use]
    pub fn pieces(mut self, pieces: Vec<PieceKind>) -> Self {
        self.pieces = pieces;
        self
    }

    /// Tessellation level, `1..=4`.
    #[must_use]
    pub const fn detail(mut self, level: u8) -> Self {
        self.detail = level;
        self
    }

    /// Wall thickness at full size.
    #[must_use]
    pub const fn wall_thickness(mut self, mm: f64) -> Self {
        self.wall_thickness = mm;
        self
    }

    /// Minimum wall thickness at full size.
    #[must_use]
    pub const fn min_wall_thickness(mut self, mm: f64) -> Self {
        self.min_wall_thickness = mm;
        self
    }

    /// Print bed size.
    #[must_use]
    pub const fn print_bed(mut self, bed: [f64; 3]) -> Self {
        self.print_bed = bed;
        self
    }

    /// Uniform print scale, `(0, 1]`.
    #[must_use]
    pub const fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Fit clearance, `[0, 60]` mm.
    #[must_use]
    pub const fn clearance(mut self, mm: f64) -> Self {
        self.clearance = mm;
        self
    }

    /// Color scheme identifier.
    #[must_use]
    pub fn color_scheme(mut self, id: impl Into<String>) -> Self {
        self.color_scheme = id.into();
        self
    }

    /// Enable or disable mount placement.
    #[must_use]
    pub const fn include_mounts(mut self, enabled: bool) -> Self {
        self.include_mounts = enabled;
        self
    }

    /// Enable or disable splitting for the print bed.
    #[must_use]
    pub const fn split_for_printing(mut self, enabled: bool) -> Self {
        self.split_for_printing = enabled;
        self
    }

    /// Resolve measurements and validate everything.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn build(self) -> ConfigResult<GenerationRequest> {
        let measurements =
            MeasurementResolver::new().resolve(&self.input, self.scale, self.clearance)?;
        let detail = DetailLevel::new(self.detail)?;

        if !(self.wall_thickness.is_finite() && self.wall_thickness > 0.0) {
            return Err(ValidationError::new("wall_thickness", "must be positive"));
        }
        if !(self.min_wall_thickness.is_finite() && self.min_wall_thickness > 0.0) {
            return Err(ValidationError::new("min_wall_thickness", "must be positive"));
        }
        if self.min_wall_thickness > self.wall_thickness {
            return Err(ValidationError::new(
                "min_wall_thickness",
                format!(
                    "{} exceeds wall thickness {}",
                    self.min_wall_thickness, self.wall_thickness
                ),
            ));
        }
        if self.print_bed.iter().any(|v| !(v.is_finite() && *v > 0.0)) {
            return Err(ValidationError::new("print_bed", "every extent must be positive"));
        }
        if self.pieces.is_empty() {
            return Err(ValidationError::new("pieces", "no pieces selected"));
        }
        if self.color_scheme.trim().is_empty() {
            return Err(ValidationError::new("color_scheme", "must not be empty"));
        }

        let mut pieces = self.pieces;
        let mut seen = Vec::with_capacity(pieces.len());
        pieces.retain(|p| {
            let fresh = !seen.contains(p);
            seen.push(*p);
            fresh
        });

        info!(
            pieces = pieces.len(),
            detail = detail.get(),
            scale = measurements.scale,
            wall = self.wall_thickness,
            "generation request built"
        );

        Ok(GenerationRequest {
            input: self.input,
            measurements,
            pieces,
            detail,
            wall_thickness: self.wall_thickness,
            min_wall_thickness: self.min_wall_thickness,
            print_bed: self.print_bed,
            color_scheme: self.color_scheme,
            include_mounts: self.include_mounts,
            split_for_printing: self.split_for_printing,
        })
    }
}
