//! Per-piece geometry failures.

use thiserror::Error;

/// Result type for per-piece geometry stages.
pub type GeometryResult<T> = Result<T, GeometryError>;

/// The structural invariant a piece failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum GeometryErrorKind {
    /// Lofting never produced a valid solid within the attempt budget.
    #[error("non-manifold after {attempts} attempts")]
    NonManifold {
        /// Number of loft attempts made.
        attempts: u32,
    },

    /// The shell could not keep the minimum wall thickness somewhere.
    #[error("wall thickness violation")]
    WallThickness,

    /// Every allowed seam position bisects a mount.
    #[error("seam/mount conflict")]
    SeamMountConflict,

    /// A mount feature reached the inner cavity even after shrinking.
    #[error("mount intersects cavity")]
    MountIntersectsCavity,

    /// The geometry kernel failed twice on the same operation.
    #[error("kernel failure: {0}")]
    Kernel(String),

    /// A stage produced a solid that failed re-validation.
    #[error("invalid solid after {0}")]
    InvalidSolid(String),
}

/// A piece failed a structural invariant after bounded retries.
///
/// The failure is isolated to that piece; siblings continue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{piece}: {kind}")]
pub struct GeometryError {
    /// Name of the failing piece.
    pub piece: String,
    /// What went wrong.
    pub kind: GeometryErrorKind,
}

impl GeometryError {
    /// Create a new error for a piece.
    #[must_use]
    pub fn new(piece: impl Into<String>, kind: GeometryErrorKind) -> Self {
        Self {
            piece: piece.into(),
            kind,
        }
    }

    /// Loft attempts exhausted.
    #[must_use]
    pub fn non_manifold(piece: impl Into<String>, attempts: u32) -> Self {
        Self::new(piece, GeometryErrorKind::NonManifold { attempts })
    }

    /// Minimum wall thickness unreachable.
    #[must_use]
    pub fn wall_thickness(piece: impl Into<String>) -> Self {
        Self::new(piece, GeometryErrorKind::WallThickness)
    }

    /// No seam placement avoids the mounts.
    #[must_use]
    pub fn seam_mount_conflict(piece: impl Into<String>) -> Self {
        Self::new(piece, GeometryErrorKind::SeamMountConflict)
    }

    /// Mount containment failed after the retry.
    #[must_use]
    pub fn mount_cavity(piece: impl Into<String>) -> Self {
        Self::new(piece, GeometryErrorKind::MountIntersectsCavity)
    }

    /// Kernel failure that survived the relaxed retry.
    #[must_use]
    pub fn kernel(piece: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(piece, GeometryErrorKind::Kernel(message.into()))
    }

    /// Post-operation validation failure.
    #[must_use]
    pub fn invalid_solid(piece: impl Into<String>, stage: impl Into<String>) -> Self {
        Self::new(piece, GeometryErrorKind::InvalidSolid(stage.into()))
    }

    /// Human-readable reason, without the piece name.
    #[must_use]
    pub fn reason(&self) -> String {
        self.kind.to_string()
    }

    /// The same error attributed to another piece.
    ///
    /// Used when a right piece inherits its left counterpart's failure.
    #[must_use]
    pub fn for_piece(self, piece: impl Into<String>) -> Self {
        Self::new(piece, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_match_manifest_wording() {
        assert_eq!(
            GeometryError::non_manifold("helmet", 4).reason(),
            "non-manifold after 4 attempts"
        );
        assert_eq!(
            GeometryError::wall_thickness("cuirass").reason(),
            "wall thickness violation"
        );
        assert_eq!(
            GeometryError::seam_mount_conflict("cuirass").reason(),
            "seam/mount conflict"
        );
        assert_eq!(
            GeometryError::mount_cavity("helmet").reason(),
            "mount intersects cavity"
        );
    }

    #[test]
    fn display_includes_piece() {
        let err = GeometryError::wall_thickness("cuirass");
        assert_eq!(err.to_string(), "cuirass: wall thickness violation");
    }

    #[test]
    fn for_piece_keeps_kind() {
        let err = GeometryError::mount_cavity("greave_left").for_piece("greave_right");
        assert_eq!(err.piece, "greave_right");
        assert_eq!(err.kind, GeometryErrorKind::MountIntersectsCavity);
    }
}
