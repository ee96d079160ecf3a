//! Armor piece identifiers.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which side of the body a piece is worn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    /// Centered on the mid-sagittal plane.
    Center,
    /// Wearer's left (positive X).
    Left,
    /// Wearer's right (negative X), generated by mirroring the left piece.
    Right,
}

/// A template family. Left and right pieces of a pair share one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PieceFamily {
    /// Full helm.
    Helmet,
    /// Breastplate and backplate.
    Cuirass,
    /// Shoulder guard.
    Pauldron,
    /// Forearm guard.
    Vambrace,
    /// Armored mitten.
    Gauntlet,
    /// Thigh guard.
    Cuisse,
    /// Knee cop.
    Poleyn,
    /// Shin guard.
    Greave,
    /// Armored boot.
    Sabaton,
}

impl PieceFamily {
    /// Every family, in body order from head to foot.
    pub const ALL: [Self; 9] = [
        Self::Helmet,
        Self::Cuirass,
        Self::Pauldron,
        Self::Vambrace,
        Self::Gauntlet,
        Self::Cuisse,
        Self::Poleyn,
        Self::Greave,
        Self::Sabaton,
    ];

    /// Whether the family is worn as a left/right pair.
    #[must_use]
    pub const fn is_paired(self) -> bool {
        !matches!(self, Self::Helmet | Self::Cuirass)
    }

    /// Lowercase family name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Helmet => "helmet",
            Self::Cuirass => "cuirass",
            Self::Pauldron => "pauldron",
            Self::Vambrace => "vambrace",
            Self::Gauntlet => "gauntlet",
            Self::Cuisse => "cuisse",
            Self::Poleyn => "poleyn",
            Self::Greave => "greave",
            Self::Sabaton => "sabaton",
        }
    }
}

/// One of the 16 armor pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[allow(missing_docs)]
pub enum PieceKind {
    Helmet,
    Cuirass,
    PauldronLeft,
    PauldronRight,
    VambraceLeft,
    VambraceRight,
    GauntletLeft,
    GauntletRight,
    CuisseLeft,
    CuisseRight,
    PoleynLeft,
    PoleynRight,
    GreaveLeft,
    GreaveRight,
    SabatonLeft,
    SabatonRight,
}

impl PieceKind {
    /// All 16 pieces in output order.
    pub const ALL: [Self; 16] = [
        Self::Helmet,
        Self::Cuirass,
        Self::PauldronLeft,
        Self::PauldronRight,
        Self::VambraceLeft,
        Self::VambraceRight,
        Self::GauntletLeft,
        Self::GauntletRight,
        Self::CuisseLeft,
        Self::CuisseRight,
        Self::PoleynLeft,
        Self::PoleynRight,
        Self::GreaveLeft,
        Self::GreaveRight,
        Self::SabatonLeft,
        Self::SabatonRight,
    ];

    /// The template family of this piece.
    #[must_use]
    pub const fn family(self) -> PieceFamily {
        match self {
            Self::Helmet => PieceFamily::Helmet,
            Self::Cuirass => PieceFamily::Cuirass,
            Self::PauldronLeft | Self::PauldronRight => PieceFamily::Pauldron,
            Self::VambraceLeft | Self::VambraceRight => PieceFamily::Vambrace,
            Self::GauntletLeft | Self::GauntletRight => PieceFamily::Gauntlet,
            Self::CuisseLeft | Self::CuisseRight => PieceFamily::Cuisse,
            Self::PoleynLeft | Self::PoleynRight => PieceFamily::Poleyn,
            Self::GreaveLeft | Self::GreaveRight => PieceFamily::Greave,
            Self::SabatonLeft | Self::SabatonRight => PieceFamily::Sabaton,
        }
    }

    /// Which side of the body the piece sits on.
    #[must_use]
    pub const fn side(self) -> Side {
        match self {
            Self::Helmet | Self::Cuirass => Side::Center,
            Self::PauldronLeft
            | Self::VambraceLeft
            | Self::GauntletLeft
            | Self::CuisseLeft
            | Self::PoleynLeft
            | Self::GreaveLeft
            | Self::SabatonLeft => Side::Left,
            _ => Side::Right,
        }
    }

    /// Whether this piece is produced by mirroring its left counterpart.
    #[must_use]
    pub const fn is_mirrored(self) -> bool {
        matches!(self.side(), Side::Right)
    }

    /// The piece whose geometry this one is derived from.
    ///
    /// Right pieces map to their left counterpart; everything else maps to itself.
    #[must_use]
    pub const fn source(self) -> Self {
        match self {
            Self::PauldronRight => Self::PauldronLeft,
            Self::VambraceRight => Self::VambraceLeft,
            Self::GauntletRight => Self::GauntletLeft,
            Self::CuisseRight => Self::CuisseLeft,
            Self::PoleynRight => Self::PoleynLeft,
            Self::GreaveRight => Self::GreaveLeft,
            Self::SabatonRight => Self::SabatonLeft,
            other => other,
        }
    }

    /// The other piece of a left/right pair.
    #[must_use]
    pub const fn counterpart(self) -> Option<Self> {
        match self {
            Self::Helmet | Self::Cuirass => None,
            Self::PauldronLeft => Some(Self::PauldronRight),
            Self::PauldronRight => Some(Self::PauldronLeft),
            Self::VambraceLeft => Some(Self::VambraceRight),
            Self::VambraceRight => Some(Self::VambraceLeft),
            Self::GauntletLeft => Some(Self::GauntletRight),
            Self::GauntletRight => Some(Self::GauntletLeft),
            Self::CuisseLeft => Some(Self::CuisseRight),
            Self::CuisseRight => Some(Self::CuisseLeft),
            Self::PoleynLeft => Some(Self::PoleynRight),
            Self::PoleynRight => Some(Self::PoleynLeft),
            Self::GreaveLeft => Some(Self::GreaveRight),
            Self::GreaveRight => Some(Self::GreaveLeft),
            Self::SabatonLeft => Some(Self::SabatonRight),
            Self::SabatonRight => Some(Self::SabatonLeft),
        }
    }

    /// Output name, e.g. `"helmet"` or `"pauldron_left"`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Helmet => "helmet",
            Self::Cuirass => "cuirass",
            Self::PauldronLeft => "pauldron_left",
            Self::PauldronRight => "pauldron_right",
            Self::VambraceLeft => "vambrace_left",
            Self::VambraceRight => "vambrace_right",
            Self::GauntletLeft => "gauntlet_left",
            Self::GauntletRight => "gauntlet_right",
            Self::CuisseLeft => "cuisse_left",
            Self::CuisseRight => "cuisse_right",
            Self::PoleynLeft => "poleyn_left",
            Self::PoleynRight => "poleyn_right",
            Self::GreaveLeft => "greave_left",
            Self::GreaveRight => "greave_right",
            Self::SabatonLeft => "sabaton_left",
            Self::SabatonRight => "sabaton_right",
        }
    }

    /// Parse an output name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl std::fmt::Display for PieceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
