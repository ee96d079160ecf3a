//! Split bookkeeping.

use armor_mount::rename_owner;
use armor_types::{Axis, Plane};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One seam cut that was actually made.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AppliedSeam {
    /// Sub-piece that was cut.
    pub target: String,
    /// Cut axis.
    pub axis: Axis,
    /// Final plane position along the axis.
    pub offset: f64,
    /// Distance the plane was moved from its nominal position.
    pub shift: f64,
    /// Labels of the low and high sides.
    pub labels: (String, String),
    /// Interlock keys on the cut.
    pub keys: usize,
}

impl AppliedSeam {
    /// The cut plane, normal along `+axis`.
    #[must_use]
    pub fn plane(&self) -> Plane {
        Plane::axis_aligned(self.axis, self.offset)
    }

    /// The same cut on the mirror image of the piece.
    ///
    /// A seam across the mirror plane's normal keeps its place; one along
    /// it moves to the reflected offset and its sides swap.
    #[must_use]
    pub fn mirrored(&self, mirror: &Plane, from: &str, to: &str) -> Self {
        let unit = self.axis.unit().into_inner();
        let flips = mirror.reflect_vector(&unit).dot(&unit) < 0.0;
        let origin = mirror.reflect_point(&self.plane().origin);
        let (labels, shift) = if flips {
            ((self.labels.1.clone(), self.labels.0.clone()), -self.shift)
        } else {
            (self.labels.clone(), self.shift)
        };
        Self {
            target: rename_owner(&self.target, from, to),
            axis: self.axis,
            offset: self.axis.coord(&origin),
            shift,
            labels,
            keys: self.keys,
        }
    }
}

/// What splitting did to one piece.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SplitReport {
    /// Piece name.
    pub piece: String,
    /// Shell volume before splitting.
    pub volume_before: f64,
    /// Sub-piece names and volumes, in output order.
    pub parts: Vec<(String, f64)>,
    /// Total volume of interlock tabs.
    pub tab_volume: f64,
    /// Total volume removed by interlock recesses.
    pub recess_volume: f64,
    /// Cuts in the order they were made.
    pub seams: Vec<AppliedSeam>,
    /// Sub-pieces still larger than the bed after every seam.
    pub oversized: Vec<String>,
}

impl SplitReport {
    /// An empty report for a piece.
    #[must_use]
    pub fn new(piece: impl Into<String>, volume_before: f64) -> Self {
        Self {
            piece: piece.into(),
            volume_before,
            parts: Vec::new(),
            tab_volume: 0.0,
            recess_volume: 0.0,
            seams: Vec::new(),
            oversized: Vec::new(),
        }
    }

    /// Whether any cut was made.
    #[must_use]
    pub fn is_split(&self) -> bool {
        !self.seams.is_empty()
    }

    /// Volume of the sub-pieces with the interlock features taken back out.
    #[must_use]
    pub fn reassembled_volume(&self) -> f64 {
        self.parts.iter().map(|(_, v)| v).sum::<f64>() - self.tab_volume + self.recess_volume
    }

    /// Relative difference between the reassembled and original volumes.
    #[must_use]
    pub fn volume_error(&self) -> f64 {
        if self.volume_before.abs() > 0.0 {
            ((self.reassembled_volume() - self.volume_before) / self.volume_before).abs()
        } else {
            self.reassembled_volume().abs()
        }
    }

    /// The report for the mirror image of the piece, renamed from the
    /// report's piece to `to`.
    #[must_use]
    pub fn mirrored(&self, mirror: &Plane, to: &str) -> Self {
        let from = self.piece.as_str();
        Self {
            piece: to.to_string(),
            volume_before: self.volume_before,
            parts: self
                .parts
                .iter()
                .map(|(name, v)| (rename_owner(name, from, to), *v))
                .collect(),
            tab_volume: self.tab_volume,
            recess_volume: self.recess_volume,
            seams: self
                .seams
                .iter()
                .map(|s| s.mirrored(mirror, from, to))
                .collect(),
            oversized: self
                .oversized
                .iter()
                .map(|name| rename_owner(name, from, to))
                .collect(),
        }
    }
}
