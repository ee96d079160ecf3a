//! Error types for kernel operations.

use thiserror::Error;

/// Result type for kernel operations.
pub type KernelResult<T> = Result<T, KernelError>;

/// Low-level failures reported by a geometry kernel.
///
/// Callers retry once with a relaxed [`Tolerance`](crate::Tolerance) before
/// escalating to a per-piece geometry error.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum KernelError {
    /// A loft needs at least two sections.
    #[error("loft needs at least {required} sections, got {actual}")]
    TooFewSections {
        /// Minimum number of sections.
        required: usize,
        /// Number supplied.
        actual: usize,
    },

    /// Sections must all have the same point count.
    #[error("section {index} has {actual} points, expected {expected}")]
    SectionMismatch {
        /// Index of the offending section.
        index: usize,
        /// Point count of the first section.
        expected: usize,
        /// Point count of the offending section.
        actual: usize,
    },

    /// The offset field does not match the surface.
    #[error("offset field has {actual} distances for {expected} vertices")]
    OffsetLength {
        /// Vertex count of the surface.
        expected: usize,
        /// Number of distances supplied.
        actual: usize,
    },

    /// Input geometry is degenerate (zero-length edges, coincident points, ...).
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    /// A plane cut produced an unclosed cross-section.
    #[error("cross-section is not closed: {0}")]
    OpenSection(String),

    /// A boolean operation would produce nothing.
    #[error("boolean result is empty")]
    EmptyResult,

    /// Cap triangulation failed.
    #[error("triangulation failed: {0}")]
    Triangulation(String),

    /// The kernel does not implement this operation for these operands.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

impl KernelError {
    /// Create a degenerate-geometry error.
    #[must_use]
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Self::Degenerate(msg.into())
    }

    /// Create an unsupported-operation error.
    #[must_use]
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }
}
