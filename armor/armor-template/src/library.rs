//! Piece specs and the standard template library.

use crate::anchor::{AnchorRule, MountStyle, StrapWidth};
use crate::error::{TemplateError, TemplateResult};
use crate::params::TemplateParams;
use crate::seam::SeamPlane;
use armor_config::Dimension;
use armor_types::{Axis, PieceFamily, PieceKind};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Everything needed to build one piece.
///
/// Left and right pieces share a family spec; [`TemplateLibrary::spec`]
/// returns the right-hand view with `mirrored` set and lateral seams
/// reflected.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArmorPieceSpec {
    /// The piece this spec describes.
    pub kind: PieceKind,
    /// Shape family and parameters.
    pub params: TemplateParams,
    /// Seams, applied in order while sub-pieces exceed the print bed.
    pub seams: Vec<SeamPlane>,
    /// Strap anchors.
    pub anchors: Vec<AnchorRule>,
    /// Produced by mirroring the left counterpart.
    pub mirrored: bool,
}

impl ArmorPieceSpec {
    /// A spec with no seams or anchors.
    #[must_use]
    pub fn new(kind: PieceKind, params: TemplateParams) -> Self {
        Self {
            kind,
            params,
            seams: Vec::new(),
            anchors: Vec::new(),
            mirrored: kind.is_mirrored(),
        }
    }

    /// Add a seam.
    #[must_use]
    pub fn with_seam(mut self, seam: SeamPlane) -> Self {
        self.seams.push(seam);
        self
    }

    /// Add an anchor rule.
    #[must_use]
    pub fn with_anchor(mut self, anchor: AnchorRule) -> Self {
        self.anchors.push(anchor);
        self
    }

    /// The spec as seen from another piece of the same family.
    #[must_use]
    pub fn for_kind(&self, kind: PieceKind) -> Self {
        let mirrored = kind.is_mirrored();
        let seams = if mirrored == self.mirrored {
            self.seams.clone()
        } else {
            self.seams.iter().map(SeamPlane::mirrored).collect()
        };
        Self {
            kind,
            params: self.params,
            seams,
            anchors: self.anchors.clone(),
            mirrored,
        }
    }
}

/// The set of piece specs used by a run.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLibrary {
    specs: Vec<ArmorPieceSpec>,
}

impl Default for TemplateLibrary {
    fn default() -> Self {
        Self::standard()
    }
}

impl TemplateLibrary {
    /// An empty library.
    #[must_use]
    pub const fn empty() -> Self {
        Self { specs: Vec::new() }
    }

    /// The built-in specs for all nine families.
    #[must_use]
    pub fn standard() -> Self {
        let mut library = Self::empty();
        for family in PieceFamily::ALL {
            library = library.with_spec(standard_spec(family));
        }
        library
    }

    /// Replace or add the spec for a family.
    ///
    /// Right-hand specs are stored as their left counterpart.
    #[must_use]
    pub fn with_spec(mut self, spec: ArmorPieceSpec) -> Self {
        let spec = spec.for_kind(spec.kind.source());
        self.specs.retain(|s| s.kind != spec.kind);
        self.specs.push(spec);
        self
    }

    /// The spec for a piece.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingSpec`] if the family is not present.
    pub fn spec(&self, kind: PieceKind) -> TemplateResult<ArmorPieceSpec> {
        self.specs
            .iter()
            .find(|s| s.kind == kind.source())
            .map(|s| s.for_kind(kind))
            .ok_or(TemplateError::MissingSpec(kind))
    }

    /// Number of family specs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the library has no specs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

fn left(family: PieceFamily) -> PieceKind {
    PieceKind::ALL
        .into_iter()
        .find(|k| k.family() == family && !k.is_mirrored())
        .unwrap_or(PieceKind::Helmet)
}

fn standard_spec(family: PieceFamily) -> ArmorPieceSpec {
    let spec = ArmorPieceSpec::new(left(family), TemplateParams::standard(family));
    let buckle = |label: &str, height: f64, angle: f64| {
        AnchorRule::new(label, MountStyle::Buckle, height, angle)
    };

    match family {
        PieceFamily::Helmet => spec
            .with_seam(SeamPlane::new(Axis::Z, 0.5, "lower", "crown"))
            .with_seam(SeamPlane::new(Axis::Y, 0.5, "back", "front"))
            .with_anchor(
                buckle("chin_strap", 0.1, 15.0)
                    .symmetric()
                    .with_width(StrapWidth::Fixed(20.0))
                    .along(),
            ),
        PieceFamily::Cuirass => {
            let side = StrapWidth::Proportional {
                dimension: Dimension::ChestCircumference,
                fraction: 0.025,
                min: 20.0,
                max: 30.0,
            };
            spec.with_seam(SeamPlane::new(Axis::Y, 0.5, "back", "front").with_max_shift(0.15))
                .with_seam(SeamPlane::new(Axis::X, 0.5, "right", "left"))
                .with_seam(SeamPlane::new(Axis::Z, 0.34, "waist", "chest"))
                .with_seam(SeamPlane::new(Axis::Z, 0.67, "lower", "upper"))
                .with_anchor(buckle("side_buckle_upper", 0.72, 0.0).symmetric().with_width(side))
                .with_anchor(buckle("side_buckle_lower", 0.3, 0.0).symmetric().with_width(side))
                .with_anchor(
                    AnchorRule::new("shoulder_interlock", MountStyle::Interlock, 0.93, 60.0)
                        .symmetric()
                        .with_width(StrapWidth::Fixed(30.0))
                        .along(),
                )
        }
        PieceFamily::Pauldron => spec
            .with_seam(SeamPlane::new(Axis::Y, 0.5, "back", "front"))
            .with_anchor(buckle("arm_buckle", 0.12, 270.0))
            .with_anchor(
                AnchorRule::new("shoulder_interlock", MountStyle::Interlock, 0.8, 180.0)
                    .with_width(StrapWidth::Fixed(30.0))
                    .along(),
            ),
        PieceFamily::Vambrace => spec
            .with_seam(SeamPlane::new(Axis::Z, 0.5, "wrist", "elbow"))
            .with_anchor(buckle("wrist_buckle", 0.25, 270.0))
            .with_anchor(buckle("elbow_buckle", 0.75, 270.0)),
        PieceFamily::Gauntlet => spec
            .with_seam(SeamPlane::new(Axis::Y, 0.5, "back", "front"))
            .with_anchor(
                AnchorRule::new("wrist_velcro", MountStyle::Velcro, 0.1, 270.0)
                    .with_width(StrapWidth::Fixed(30.0)),
            ),
        PieceFamily::Cuisse => spec
            .with_seam(SeamPlane::new(Axis::Z, 0.5, "lower", "upper"))
            .with_anchor(buckle("lower_buckle", 0.3, 270.0))
            .with_anchor(buckle("upper_buckle", 0.7, 270.0))
            .with_anchor(AnchorRule::new("belt_clip", MountStyle::Clip, 0.94, 90.0).along()),
        PieceFamily::Poleyn => spec
            .with_seam(SeamPlane::new(Axis::Y, 0.5, "back", "front"))
            .with_anchor(buckle("knee_buckle", 0.5, 270.0)),
        PieceFamily::Greave => spec
            .with_seam(SeamPlane::new(Axis::Z, 0.5, "ankle", "calf"))
            .with_anchor(buckle("lower_buckle", 0.25, 270.0))
            .with_anchor(buckle("upper_buckle", 0.75, 270.0)),
        PieceFamily::Sabaton => spec
            .with_seam(SeamPlane::new(Axis::Y, 0.5, "heel", "toe"))
            .with_anchor(buckle("ankle_buckle", 0.15, 0.0))
            .with_anchor(
                AnchorRule::new("instep_lace", MountStyle::Lace, 0.7, 90.0)
                    .with_width(StrapWidth::Fixed(15.0))
                    .along(),
            ),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn standard_covers_every_piece() {
        let library = TemplateLibrary::standard();
        assert_eq!(library.len(), 9);
        for kind in PieceKind::ALL {
            let spec = library.spec(kind).unwrap();
            assert_eq!(spec.kind, kind);
            assert_eq!(spec.params.family(), kind.family());
            assert_eq!(spec.mirrored, kind.is_mirrored());
            assert!(!spec.anchors.is_empty());
            assert!(!spec.seams.is_empty());
        }
    }

    #[test]
    fn helmet_has_one_symmetric_chin_rule() {
        let spec = TemplateLibrary::standard().spec(PieceKind::Helmet).unwrap();
        let ids: Vec<String> = spec.anchors.iter().flat_map(AnchorRule::ids).collect();
        assert_eq!(ids, vec!["chin_strap_l", "chin_strap_r"]);
    }

    #[test]
    fn right_pieces_share_the_left_spec() {
        let library = TemplateLibrary::standard();
        let left = library.spec(PieceKind::GreaveLeft).unwrap();
        let right = library.spec(PieceKind::GreaveRight).unwrap();
        assert_eq!(left.params, right.params);
        assert_eq!(left.anchors, right.anchors);
        assert!(right.mirrored && !left.mirrored);
    }

    #[test]
    fn mirrored_lateral_seams_flip() {
        let library = TemplateLibrary::standard().with_spec(
            ArmorPieceSpec::new(
                PieceKind::VambraceLeft,
                TemplateParams::standard(PieceFamily::Vambrace),
            )
            .with_seam(SeamPlane::new(Axis::X, 0.4, "inner", "outer")),
        );
        let right = library.spec(PieceKind::VambraceRight).unwrap();
        assert_relative_eq!(right.seams[0].fraction, 0.6);
        assert_eq!(right.seams[0].labels.0, "outer");
    }

    #[test]
    fn missing_family_reported() {
        let library = TemplateLibrary::empty();
        assert!(library.is_empty());
        assert_eq!(
            library.spec(PieceKind::Cuirass).unwrap_err(),
            TemplateError::MissingSpec(PieceKind::Cuirass)
        );
    }
}
