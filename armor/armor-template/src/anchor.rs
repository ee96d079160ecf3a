//! Strap anchor rules.

use armor_config::{Dimension, MeasurementProfile};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Strap attachment hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MountStyle {
    /// Buckle slot.
    Buckle,
    /// Hook-and-loop pad.
    Velcro,
    /// Snap fastener.
    Snap,
    /// Lace eyelet row.
    Lace,
    /// Belt clip.
    Clip,
    /// Plate-to-plate interlock.
    Interlock,
}

/// Proportions of a strap seat relative to the strap width and wall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeatShape {
    /// Seat length along the strap, as a multiple of strap width.
    pub length: f64,
    /// Extra width on each side of the strap, as a multiple of strap width.
    pub side_pad: f64,
    /// Recess depth as a fraction of wall thickness.
    pub depth: f64,
}

impl MountStyle {
    /// Every style.
    pub const ALL: [Self; 6] = [
        Self::Buckle,
        Self::Velcro,
        Self::Snap,
        Self::Lace,
        Self::Clip,
        Self::Interlock,
    ];

    /// Seat proportions for this style.
    #[must_use]
    pub const fn seat(self) -> SeatShape {
        match self {
            Self::Buckle => SeatShape {
                length: 1.6,
                side_pad: 0.15,
                depth: 0.35,
            },
            Self::Velcro => SeatShape {
                length: 2.0,
                side_pad: 0.1,
                depth: 0.2,
            },
            Self::Snap => SeatShape {
                length: 1.0,
                side_pad: 0.1,
                depth: 0.3,
            },
            Self::Lace => SeatShape {
                length: 2.5,
                side_pad: 0.2,
                depth: 0.25,
            },
            Self::Clip => SeatShape {
                length: 1.2,
                side_pad: 0.15,
                depth: 0.4,
            },
            Self::Interlock => SeatShape {
                length: 1.0,
                side_pad: 0.25,
                depth: 0.3,
            },
        }
    }

    /// Lowercase style name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Buckle => "buckle",
            Self::Velcro => "velcro",
            Self::Snap => "snap",
            Self::Lace => "lace",
            Self::Clip => "clip",
            Self::Interlock => "interlock",
        }
    }
}

impl fmt::Display for MountStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which way a strap runs across its seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StrapDir {
    /// Around the piece axis.
    Around,
    /// Along the piece axis.
    Along,
}

/// Strap width rule.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StrapWidth {
    /// Fixed width in millimeters at full size.
    Fixed(f64),
    /// A fraction of a body dimension, clamped to `[min, max]` millimeters.
    Proportional {
        /// Driving dimension.
        dimension: Dimension,
        /// Fraction of the dimension.
        fraction: f64,
        /// Smallest width.
        min: f64,
        /// Largest width.
        max: f64,
    },
}

impl StrapWidth {
    /// Width at full size for a profile.
    #[must_use]
    pub fn evaluate(&self, profile: &MeasurementProfile) -> f64 {
        match *self {
            Self::Fixed(width) => width,
            Self::Proportional {
                dimension,
                fraction,
                min,
                max,
            } => (profile.get(dimension) * fraction).clamp(min, max),
        }
    }
}

/// Where and how a strap mount attaches to a piece.
///
/// `height` is a fraction of the piece's axial length; `angle` is measured
/// in the section plane from the frame's first radial axis (+X) towards the
/// second. Symmetric rules produce a twin reflected through the piece's
/// plane of symmetry; the primary gets an `_l` suffix and the twin `_r`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnchorRule {
    /// Mount label, e.g. `chin_strap`.
    pub label: String,
    /// Hardware style.
    pub style: MountStyle,
    /// Axial position, fraction in `[0, 1]`.
    pub height: f64,
    /// Angle around the axis, radians.
    pub angle: f64,
    /// Emit a reflected twin.
    pub symmetric: bool,
    /// Strap width.
    pub width: StrapWidth,
    /// Strap direction.
    pub direction: StrapDir,
}

impl AnchorRule {
    /// A non-symmetric rule with a 25 mm strap running around the axis.
    #[must_use]
    pub fn new(label: impl Into<String>, style: MountStyle, height: f64, angle_deg: f64) -> Self {
        Self {
            label: label.into(),
            style,
            height,
            angle: angle_deg.to_radians(),
            symmetric: false,
            width: StrapWidth::Fixed(25.0),
            direction: StrapDir::Around,
        }
    }

    /// Mark the rule symmetric.
    #[must_use]
    pub fn symmetric(mut self) -> Self {
        self.symmetric = true;
        self
    }

    /// Set the strap width rule.
    #[must_use]
    pub fn with_width(mut self, width: StrapWidth) -> Self {
        self.width = width;
        self
    }

    /// Run the strap along the axis.
    #[must_use]
    pub fn along(mut self) -> Self {
        self.direction = StrapDir::Along;
        self
    }

    /// Mount ids this rule produces, primary first.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        if self.symmetric {
            vec![format!("{}_l", self.label), format!("{}_r", self.label)]
        } else {
            vec![self.label.clone()]
        }
    }
}
