//! Deformation errors.

use armor_template::TemplateError;
use armor_types::GeometryError;
use thiserror::Error;

/// Result type for deformation.
pub type DeformResult<T> = Result<T, DeformError>;

/// Why a piece could not be deformed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeformError {
    /// The template itself is unusable.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The lofted solid never validated, or the kernel failed.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

impl DeformError {
    /// Short reason, as reported in the manifest.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Template(err) => err.to_string(),
            Self::Geometry(err) => err.reason(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use armor_types::PieceKind;

    #[test]
    fn reasons() {
        let err = DeformError::from(GeometryError::non_manifold("helmet", 4));
        assert_eq!(err.reason(), "non-manifold after 4 attempts");

        let err = DeformError::from(TemplateError::MissingSpec(PieceKind::Helmet));
        assert_eq!(err.reason(), "no template for helmet");
    }
}
