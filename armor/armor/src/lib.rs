//! Parametric wearable-armor geometry.
//!
//! This umbrella crate re-exports the armor-* crates behind one API. A run
//! takes a body-measurement profile and a piece selection and returns one
//! closed, printable solid per piece (or per print-bed sub-piece), with strap
//! mounts carved in and left/right pairs mirrored exactly.
//!
//! # Quick Start
//!
//! ```no_run
//! use armor::prelude::*;
//!
//! let request = GenerationRequest::builder()
//!     .size(SizeClass::L)
//!     .pieces(vec![PieceKind::Helmet, PieceKind::PauldronLeft, PieceKind::PauldronRight])
//!     .print_bed([220.0, 220.0, 250.0])
//!     .build()
//!     .unwrap();
//!
//! let set = ArmorEngine::new().generate(&request).unwrap();
//! for (name, mesh) in set.solids() {
//!     println!("{name}: {:.0} mm³", mesh.volume());
//! }
//! print!("{}", set.manifest());
//! ```
//!
//! # Module Organization
//!
//! ## Foundation
//! - [`types`] - `SolidMesh`, `Aabb`, `Plane`, `PieceKind`, `GeometryError`
//! - [`kernel`] - Loft, offset, booleans, manifold validation, mirroring
//! - [`config`] - Measurements, size classes, the validated `GenerationRequest`
//!
//! ## Pipeline Stages
//! - [`template`] - Parametric templates for the sixteen piece kinds
//! - [`deform`] - Fitting a template to the measurements
//! - [`shell`] - Hollowing to wall thickness
//! - [`mount`] - Strap mount placement and carving
//! - [`split`] - Print-bed splitting with interlock keys
//!
//! ## Orchestration
//! - [`assembly`] - Parallel per-piece pipelines, mirroring and the manifest
//!
//! # Feature Flags
//!
//! - `serde` - Serialize requests, meshes, reports and the manifest

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

// =============================================================================
// Re-exports
// =============================================================================

/// Core data structures: `SolidMesh`, `Aabb`, `Plane`, `PieceKind`.
pub use armor_types as types;

/// Geometry kernel: loft, offset, booleans, validation.
pub use armor_kernel as kernel;

/// Measurement profiles and generation requests.
pub use armor_config as config;

/// Template library and loft plans.
pub use armor_template as template;

/// Template deformation with retry relaxation.
pub use armor_deform as deform;

/// Shell generation at wall thickness.
pub use armor_shell as shell;

/// Mount point placement and carving.
pub use armor_mount as mount;

/// Print-bed splitting.
pub use armor_split as split;

/// Per-piece pipelines and result assembly.
pub use armor_assembly as assembly;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for generating armor.
///
/// # Usage
///
/// ```
/// use armor::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use armor_types::{Aabb, GeometryError, PieceKind, Plane, Point3, SolidMesh, Vector3};

    // Kernel
    pub use armor_kernel::{GeometryKernel, MeshKernel, Tolerance};

    // Requests
    pub use armor_config::{
        Dimension, GenerationRequest, MeasurementProfile, SizeClass, ValidationError,
    };

    // Templates
    pub use armor_template::TemplateLibrary;

    // Engine (main use case)
    pub use armor_assembly::{
        ArmorEngine, AssembledSet, CancelToken, EngineConfig, EngineError, Manifest, PieceStatus,
    };
}

// =============================================================================
// Tests
// =============================================================================
