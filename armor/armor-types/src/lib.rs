//! Core types for Armor Forge.
//!
//! This crate provides the foundational types shared by every pipeline stage:
//!
//! - [`SolidMesh`] - A closed triangle surface with per-face [`SurfaceRegion`] tags
//! - [`Aabb`] - Axis-aligned bounding box
//! - [`Plane`] and [`Axis`] - Planes used for mirroring and seams
//! - [`PieceKind`] - The 16 armor piece identifiers
//! - [`GeometryError`] - Per-piece structural failure
//!
//! # Units
//!
//! All coordinates are `f64` millimeters.
//!
//! # Coordinate System
//!
//! Uses a **right-handed body coordinate system**:
//! - X: lateral, positive towards the wearer's left
//! - Y: depth, positive towards the wearer's front
//! - Z: height, positive up
//!
//! The mid-sagittal plane is `x = 0`. Face winding is **counter-clockwise (CCW)
//! when viewed from outside**; normals point outward by the right-hand rule.
//!
//! # Example
//!
//! ```
//! use armor_types::{Point3, SolidMesh, SurfaceRegion};
//!
//! let mut mesh = SolidMesh::new();
//! mesh.vertices.push(Point3::new(0.0, 0.0, 0.0));
//! mesh.vertices.push(Point3::new(1.0, 0.0, 0.0));
//! mesh.vertices.push(Point3::new(0.0, 1.0, 0.0));
//! mesh.push_face([0, 1, 2], SurfaceRegion::Outer);
//!
//! assert_eq!(mesh.face_count(), 1);
//! assert!(!mesh.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod bounds;
mod error;
mod mesh;
mod piece;
mod plane;
mod region;

pub use bounds::Aabb;
pub use error::{GeometryError, GeometryErrorKind, GeometryResult};
pub use mesh::{SolidMesh, unit_cube};
pub use piece::{PieceFamily, PieceKind, Side};
pub use plane::{Axis, Plane};
pub use region::SurfaceRegion;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Unit, Vector3};
