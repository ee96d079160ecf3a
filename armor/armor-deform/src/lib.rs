//! Base-solid generation for Armor Forge.
//!
//! The [`Deformer`] evaluates a piece template at the request's measurements,
//! lofts the rings into a closed solid through a
//! [`GeometryKernel`](armor_kernel::GeometryKernel) and validates it. A solid
//! that fails validation is lofted again with reduced plate overlap and
//! feature gain, up to [`DeformParams::max_attempts`] times.
//!
//! # Example
//!
//! ```
//! use armor_config::{GenerationRequest, SizeClass};
//! use armor_deform::Deformer;
//! use armor_kernel::{GeometryKernel, MeshKernel};
//! use armor_template::TemplateLibrary;
//! use armor_types::PieceKind;
//!
//! let request = GenerationRequest::builder().size(SizeClass::S).detail(1).build().unwrap();
//! let spec = TemplateLibrary::standard().spec(PieceKind::GreaveLeft).unwrap();
//!
//! let kernel = MeshKernel::new();
//! let piece = Deformer::new(&kernel).deform(&spec, &request).unwrap();
//! assert!(kernel.validate_manifold(&piece.mesh));
//! assert_eq!(piece.attempts, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod deformer;
mod error;
mod params;

pub use deformer::{DeformedPiece, Deformer};
pub use error::{DeformError, DeformResult};
pub use params::{DEFAULT_MAX_ATTEMPTS, DeformParams};
