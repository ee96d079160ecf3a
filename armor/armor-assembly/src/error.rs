//! Run-level and per-piece errors.

use armor_config::ValidationError;
use armor_deform::DeformError;
use armor_template::TemplateError;
use armor_types::GeometryError;
use thiserror::Error;

/// Result type for a generation run.
pub type EngineResult<T> = Result<T, EngineError>;

/// A run that produced no result set at all.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The request was rejected before any geometry work.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The run was cancelled; completed pieces were discarded.
    #[error("generation cancelled")]
    Cancelled,
}

/// Why a single piece failed. Siblings are unaffected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PieceError {
    /// The piece's template is missing or unusable.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// A structural invariant failed after bounded retries.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

impl PieceError {
    /// Short reason, as written to the manifest.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Template(err) => err.to_string(),
            Self::Geometry(err) => err.reason(),
        }
    }

    /// The same failure reported for another piece.
    #[must_use]
    pub fn for_piece(self, piece: &str) -> Self {
        match self {
            Self::Template(err) => Self::Template(err),
            Self::Geometry(err) => Self::Geometry(err.for_piece(piece)),
        }
    }
}

impl From<DeformError> for PieceError {
    fn from(err: DeformError) -> Self {
        match err {
            DeformError::Template(err) => Self::Template(err),
            DeformError::Geometry(err) => Self::Geometry(err),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn mirrored_failures_keep_their_reason() {
        let err = PieceError::from(DeformError::from(GeometryError::wall_thickness(
            "greave_left",
        )));
        let right = err.for_piece("greave_right");
        assert_eq!(right.reason(), "wall thickness violation");
        assert_eq!(right.to_string(), "greave_right: wall thickness violation");
    }

    #[test]
    fn validation_is_transparent() {
        let err = EngineError::from(ValidationError::new("chest_circumference", "too small"));
        assert_eq!(err.to_string(), "invalid chest_circumference: too small");
    }
}
