//! Per-face surface region tags.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which part of an armor solid a face belongs to.
///
/// Regions survive every pipeline stage so later stages can tell the
/// wearer-facing cavity from the visible plate without re-deriving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SurfaceRegion {
    /// Visible outer plate surface.
    #[default]
    Outer,
    /// Cavity surface facing the wearer.
    Inner,
    /// Strip joining outer and inner surfaces at an opening.
    Rim,
    /// Closed end of a lofted solid.
    Cap,
    /// End of a lofted solid that the shelling stage removes.
    Opening,
    /// Planar face produced by a seam cut.
    Seam,
    /// Tab or recess wall added to a seam face.
    Interlock,
    /// Outer faces recessed by a strap mount.
    Mount,
}

impl SurfaceRegion {
    /// Whether the region is part of the exterior plate surface.
    ///
    /// Mount seats count as exterior because they are carved from it.
    #[must_use]
    pub const fn is_exterior(self) -> bool {
        matches!(self, Self::Outer | Self::Cap | Self::Mount)
    }

    /// Short lowercase name, used in logs and reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Outer => "outer",
            Self::Inner => "inner",
            Self::Rim => "rim",
            Self::Cap => "cap",
            Self::Opening => "opening",
            Self::Seam => "seam",
            Self::Interlock => "interlock",
            Self::Mount => "mount",
        }
    }
}

impl std::fmt::Display for SurfaceRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
