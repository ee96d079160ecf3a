//! Template errors.

use armor_types::{PieceFamily, PieceKind};
use thiserror::Error;

/// Result type for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors from looking up or evaluating a template.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TemplateError {
    /// The library has no spec for a piece.
    #[error("no template for {0}")]
    MissingSpec(PieceKind),

    /// A template parameter is outside its allowed range.
    #[error("{} template: parameter {name} = {value} is out of range", family.name())]
    InvalidParameter {
        /// Template family.
        family: PieceFamily,
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// The measurements collapse a section ring.
    #[error("{} template: ring {ring} is degenerate", family.name())]
    Degenerate {
        /// Template family.
        family: PieceFamily,
        /// Index of the first bad ring.
        ring: usize,
    },
}
