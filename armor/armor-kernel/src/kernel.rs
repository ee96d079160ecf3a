//! The geometry kernel interface and its reference triangle-mesh implementation.

use crate::cut::{KeepSide, cut_half_space};
use crate::error::{KernelError, KernelResult};
use crate::loft::loft_sections;
use crate::mirror::mirror_mesh;
use crate::offset::offset_surface;
use crate::validate::ManifoldReport;
use armor_types::{Plane, Point3, SolidMesh, Vector3};
use tracing::{debug, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Linear tolerance used by kernel operations, in millimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tolerance {
    /// Distances at or below this are treated as zero.
    pub linear: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self { linear: 1e-6 }
    }
}

impl Tolerance {
    /// Create a tolerance.
    #[must_use]
    pub const fn new(linear: f64) -> Self {
        Self { linear }
    }

    /// A ten times looser tolerance, used for the single retry after a
    /// kernel failure.
    #[must_use]
    pub fn relaxed(self) -> Self {
        Self {
            linear: self.linear * 10.0,
        }
    }

    /// Run a kernel operation, retrying once at the relaxed tolerance.
    ///
    /// # Errors
    ///
    /// Returns the error of the relaxed attempt if both attempts fail.
    pub fn retry_relaxed<T>(
        self,
        mut op: impl FnMut(Self) -> KernelResult<T>,
    ) -> KernelResult<T> {
        match op(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                let relaxed = self.relaxed();
                warn!(error = %err, tolerance = relaxed.linear, "kernel call failed, retrying relaxed");
                op(relaxed)
            }
        }
    }
}

/// One closed ring of a loft.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Section {
    /// Ring points, in a consistent order across sections.
    pub points: Vec<Point3<f64>>,
}

impl Section {
    /// Create a section from ring points.
    #[must_use]
    pub const fn new(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }

    /// Number of ring points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the ring is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// How a loft is closed at its first or last section.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EndCap {
    /// A body opening. Closed with a fan tagged `Opening`, which the shelling
    /// stage removes.
    Open,
    /// A flat fan to the ring centroid, tagged `Cap`.
    Flat,
    /// A fan to an apex point, tagged `Cap`.
    Apex(Point3<f64>),
}

/// Boolean operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BooleanOp {
    /// Material in either operand.
    Union,
    /// Material in the first operand but not the second.
    Subtract,
    /// Material in both operands.
    Intersect,
}

/// A rectangular interlock key sitting on a cut plane.
///
/// The key is a `2 * half_length` by `2 * half_width` footprint extruded
/// `height` along the plane normal. The negative side of a cut gets the
/// protruding tab; the positive side gets a matching recess, grown by
/// `clearance` on every side and in depth.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InterlockKey {
    /// Footprint center, on the cut plane.
    pub center: Point3<f64>,
    /// In-plane unit direction of the long side.
    pub tangent: Vector3<f64>,
    /// Half extent along `tangent`.
    pub half_length: f64,
    /// Half extent across `tangent`.
    pub half_width: f64,
    /// Tab height along the plane normal.
    pub height: f64,
    /// Fit clearance added to the recess.
    pub clearance: f64,
}

impl InterlockKey {
    /// Volume of the protruding tab.
    #[must_use]
    pub fn tab_volume(&self) -> f64 {
        4.0 * self.half_length * self.half_width * self.height
    }

    /// Volume removed by the recess.
    #[must_use]
    pub fn recess_volume(&self) -> f64 {
        let c = self.clearance;
        4.0 * (self.half_length + c) * (self.half_width + c) * (self.height + c)
    }

    /// Footprint corners on `plane`, grown by `grow`, counter-clockwise seen
    /// from the plane's positive side.
    #[must_use]
    pub fn footprint(&self, plane: &Plane, grow: f64) -> [Point3<f64>; 4] {
        let n = plane.normal.into_inner();
        let t = (self.tangent - n * self.tangent.dot(&n)).normalize();
        let w = n.cross(&t);
        let c = plane.project(&self.center);
        let a = self.half_length + grow;
        let b = self.half_width + grow;
        [
            c - t * a - w * b,
            c + t * a - w * b,
            c + t * a + w * b,
            c - t * a + w * b,
        ]
    }
}

/// A half-space bounded by a plane, optionally carrying interlock keys.
///
/// As a boolean operand it is the region on the plane's positive side, so
/// intersecting keeps the negative side and subtracting keeps the positive.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HalfSpace {
    /// Bounding plane. The normal points away from the side `Intersect` keeps.
    pub plane: Plane,
    /// Keys added along the cut.
    pub keys: Vec<InterlockKey>,
}

impl HalfSpace {
    /// A plain half-space with no keys.
    #[must_use]
    pub const fn new(plane: Plane) -> Self {
        Self {
            plane,
            keys: Vec::new(),
        }
    }

    /// Add interlock keys.
    #[must_use]
    pub fn with_keys(mut self, keys: Vec<InterlockKey>) -> Self {
        self.keys = keys;
        self
    }
}

/// Second operand of a boolean.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    /// Another solid.
    Solid(&'a SolidMesh),
    /// A (keyed) half-space.
    HalfSpace(&'a HalfSpace),
}

/// Solid-modeling operations the pipeline needs.
///
/// Implementations must be usable from several threads at once. All returned
/// solids are closed and consistently wound with outward normals.
pub trait GeometryKernel: Send + Sync {
    /// Loft a sequence of section rings into a closed solid.
    ///
    /// # Errors
    ///
    /// Returns an error when the sections cannot form a solid.
    fn loft(
        &self,
        sections: &[Section],
        start: &EndCap,
        end: &EndCap,
        tol: Tolerance,
    ) -> KernelResult<SolidMesh>;

    /// Offset a surface inward by a per-vertex distance field.
    ///
    /// # Errors
    ///
    /// Returns an error if the field does not match the surface.
    fn offset(
        &self,
        surface: &SolidMesh,
        distances: &[f64],
        tol: Tolerance,
    ) -> KernelResult<SolidMesh>;

    /// Boolean of a solid with another solid or a half-space.
    ///
    /// # Errors
    ///
    /// Returns an error if the result is empty or cannot be computed.
    fn boolean(
        &self,
        op: BooleanOp,
        a: &SolidMesh,
        b: Operand<'_>,
        tol: Tolerance,
    ) -> KernelResult<SolidMesh>;

    /// Whether a solid is closed, 2-manifold, consistently wound, positively
    /// oriented and free of self-intersection.
    fn validate_manifold(&self, mesh: &SolidMesh) -> bool;

    /// Mirror image of a solid through a plane, with winding restored.
    fn mirror(&self, mesh: &SolidMesh, plane: &Plane) -> SolidMesh;

    /// Full validity report for a solid.
    fn report(&self, mesh: &SolidMesh) -> ManifoldReport {
        ManifoldReport::analyze(mesh, Tolerance::default())
    }
}

/// Reference kernel operating directly on triangle meshes.
///
/// Booleans are supported against half-spaces (with interlock keys) and, for
/// unions, against solids with disjoint bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshKernel;

impl MeshKernel {
    /// Create the kernel.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl GeometryKernel for MeshKernel {
    fn loft(
        &self,
        sections: &[Section],
        start: &EndCap,
        end: &EndCap,
        tol: Tolerance,
    ) -> KernelResult<SolidMesh> {
        loft_sections(sections, start, end, tol)
    }

    fn offset(
        &self,
        surface: &SolidMesh,
        distances: &[f64],
        tol: Tolerance,
    ) -> KernelResult<SolidMesh> {
        offset_surface(surface, distances, tol)
    }

    fn boolean(
        &self,
        op: BooleanOp,
        a: &SolidMesh,
        b: Operand<'_>,
        tol: Tolerance,
    ) -> KernelResult<SolidMesh> {
        match (op, b) {
            (BooleanOp::Intersect, Operand::HalfSpace(half)) => {
                cut_half_space(a, half, KeepSide::Negative, tol)
            }
            (BooleanOp::Subtract, Operand::HalfSpace(half)) => {
                cut_half_space(a, half, KeepSide::Positive, tol)
            }
            (BooleanOp::Union, Operand::HalfSpace(_)) => Err(KernelError::unsupported(
                "union with an unbounded half-space",
            )),
            (op, Operand::Solid(b)) => {
                let disjoint = !a.bounds().intersects(&b.bounds(), tol.linear);
                if !disjoint {
                    return Err(KernelError::unsupported(
                        "booleans between overlapping solids",
                    ));
                }
                debug!(?op, "boolean of disjoint solids");
                match op {
                    BooleanOp::Union => {
                        let mut out = a.clone();
                        out.merge(b);
                        Ok(out)
                    }
                    BooleanOp::Subtract => Ok(a.clone()),
                    BooleanOp::Intersect => Err(KernelError::EmptyResult),
                }
            }
        }
    }

    fn validate_manifold(&self, mesh: &SolidMesh) -> bool {
        ManifoldReport::analyze(mesh, Tolerance::default()).is_valid()
    }

    fn mirror(&self, mesh: &SolidMesh, plane: &Plane) -> SolidMesh {
        mirror_mesh(mesh, plane)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use armor_types::{Axis, unit_cube};

    #[test]
    fn relaxed_tolerance_is_looser() {
        let tol = Tolerance::default();
        assert!(tol.relaxed().linear > tol.linear);
        assert_relative_eq!(tol.relaxed().linear, 1e-5);
    }

    #[test]
    fn retry_relaxed_tries_once_more() {
        let strict = Tolerance::default();
        let mut seen = Vec::new();
        let out = strict.retry_relaxed(|tol| {
            seen.push(tol.linear);
            if tol.linear > strict.linear {
                Ok(tol.linear)
            } else {
                Err(KernelError::degenerate("too strict"))
            }
        });
        assert_relative_eq!(out.unwrap(), strict.relaxed().linear);
        assert_relative_eq!(strict.relaxed().linear, 1e-5, max_relative = 1e-12);
        assert_eq!(seen.len(), 2);

        let failed: KernelResult<()> =
            Tolerance::default().retry_relaxed(|_| Err(KernelError::EmptyResult));
        assert_eq!(failed.unwrap_err(), KernelError::EmptyResult);
    }

    #[test]
    fn key_volumes() {
        let key = InterlockKey {
            center: Point3::origin(),
            tangent: Vector3::x(),
            half_length: 5.0,
            half_width: 2.0,
            height: 3.0,
            clearance: 0.5,
        };
        assert_relative_eq!(key.tab_volume(), 120.0);
        assert_relative_eq!(key.recess_volume(), 4.0 * 5.5 * 2.5 * 3.5);
    }

    #[test]
    fn footprint_is_ccw_about_normal() {
        let key = InterlockKey {
            center: Point3::new(1.0, 2.0, 7.0),
            tangent: Vector3::x(),
            half_length: 2.0,
            half_width: 1.0,
            height: 1.0,
            clearance: 0.0,
        };
        let plane = Plane::axis_aligned(Axis::Z, 5.0);
        let corners = key.footprint(&plane, 0.0);
        // Projected onto the plane.
        assert!(corners.iter().all(|c| (c.z - 5.0).abs() < 1e-12));
        let e0 = corners[1] - corners[0];
        let e1 = corners[2] - corners[1];
        assert!(e0.cross(&e1).z > 0.0);
    }

    #[test]
    fn union_of_disjoint_solids() {
        let a = unit_cube();
        let mut b = unit_cube();
        b.translate(Vector3::new(3.0, 0.0, 0.0));
        let kernel = MeshKernel::new();
        let merged = kernel
            .boolean(BooleanOp::Union, &a, Operand::Solid(&b), Tolerance::default())
            .unwrap();
        assert_relative_eq!(merged.signed_volume(), 2.0, epsilon = 1e-12);
        assert!(kernel.validate_manifold(&merged));
    }

    #[test]
    fn overlapping_solids_unsupported() {
        let a = unit_cube();
        let mut b = unit_cube();
        b.translate(Vector3::new(0.5, 0.0, 0.0));
        let result =
            MeshKernel.boolean(BooleanOp::Union, &a, Operand::Solid(&b), Tolerance::default());
        assert!(matches!(result, Err(KernelError::Unsupported(_))));
    }

    #[test]
    fn half_space_halves_cube() {
        let cube = unit_cube();
        let half = HalfSpace::new(Plane::axis_aligned(Axis::Z, 0.5));
        let kernel = MeshKernel;
        let below = kernel
            .boolean(BooleanOp::Intersect, &cube, Operand::HalfSpace(&half), Tolerance::default())
            .unwrap();
        let above = kernel
            .boolean(BooleanOp::Subtract, &cube, Operand::HalfSpace(&half), Tolerance::default())
            .unwrap();
        assert_relative_eq!(below.signed_volume(), 0.5, epsilon = 1e-9);
        assert_relative_eq!(above.signed_volume(), 0.5, epsilon = 1e-9);
        assert!(below.bounds().max.z < 0.5 + 1e-6);
        assert!(above.bounds().min.z > 0.5 - 1e-6);
        assert!(kernel.validate_manifold(&below));
        assert!(kernel.validate_manifold(&above));
    }
}
