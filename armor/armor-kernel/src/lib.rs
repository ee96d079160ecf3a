//! Geometry kernel for Armor Forge.
//!
//! The pipeline talks to solid geometry only through the [`GeometryKernel`]
//! trait: lofting, offsetting, booleans, manifold validation and mirroring.
//! [`MeshKernel`] is the reference implementation working directly on
//! [`SolidMesh`](armor_types::SolidMesh) triangle surfaces.
//!
//! # Supporting Queries
//!
//! The stages also need a few read-only queries the trait does not cover:
//!
//! - [`SurfaceQuery`] - Nearest-point and containment queries over a BVH
//! - [`ManifoldReport`] - Detailed validity counts
//! - [`cross_section`] - Loops of a planar cut, for placing interlock keys
//! - [`emboss`] and [`pierce`] - Pockets, bosses and holes along a [`Stencil`]
//! - [`offset_directions`] - Angle-corrected vertex normals used by shelling
//!
//! # Example
//!
//! ```
//! use armor_kernel::{BooleanOp, GeometryKernel, HalfSpace, MeshKernel, Operand, Tolerance};
//! use armor_types::{Axis, Plane, unit_cube};
//!
//! let kernel = MeshKernel::new();
//! let cube = unit_cube();
//! let half = HalfSpace::new(Plane::axis_aligned(Axis::Z, 0.25));
//!
//! let lower = kernel
//!     .boolean(BooleanOp::Intersect, &cube, Operand::HalfSpace(&half), Tolerance::default())
//!     .unwrap();
//! assert!(kernel.validate_manifold(&lower));
//! assert!((lower.signed_volume() - 0.25).abs() < 1e-9);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod adjacency;
mod bvh;
mod cut;
mod error;
mod imprint;
mod intersect;
mod kernel;
mod loft;
mod mirror;
mod offset;
mod query;
mod section;
mod validate;

pub use adjacency::{EdgeAdjacency, undirected};
pub use bvh::Bvh;
pub use cut::{KeepSide, cross_section, cut_half_space, triangulate_rings};
pub use error::{KernelError, KernelResult};
pub use imprint::{Embossed, Stencil, emboss, pierce, slice_surface};
pub use intersect::{
    closest_point_on_triangle, corner_angle, ray_triangle_intersect, segment_crosses_triangle,
    triangles_intersect,
};
pub use kernel::{
    BooleanOp, EndCap, GeometryKernel, HalfSpace, InterlockKey, MeshKernel, Operand, Section,
    Tolerance,
};
pub use loft::loft_sections;
pub use mirror::mirror_mesh;
pub use offset::{offset_directions, offset_surface, vertex_normals};
pub use query::{SurfaceHit, SurfaceQuery};
pub use section::{
    CapFrame, CrossSection, SectionLoop, SectionRegion, point_in_polygon, point_segment_distance,
    polygon_signed_area, ray_segment_hit, segments_intersect,
};
pub use validate::{ManifoldReport, count_self_intersections};
