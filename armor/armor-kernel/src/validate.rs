//! Solid validity: manifoldness, orientation and self-intersection.

#![allow(clippy::cast_possible_truncation)]

use crate::adjacency::EdgeAdjacency;
use crate::bvh::Bvh;
use crate::intersect::{segment_crosses_triangle, triangles_intersect};
use crate::kernel::Tolerance;
use armor_types::{Aabb, SolidMesh};
use rayon::prelude::*;
use std::fmt;

/// Barycentric slack when deciding whether two faces merely touch.
const CONTACT_EPSILON: f64 = 1e-9;

/// Result of checking a solid.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ManifoldReport {
    /// Edges with a single incident face.
    pub boundary_edges: usize,
    /// Edges with more than two incident faces.
    pub non_manifold_edges: usize,
    /// Directed edges used by more than one face.
    pub inconsistent_edges: usize,
    /// Faces with repeated vertices or no area.
    pub degenerate_faces: usize,
    /// Pairs of faces crossing each other.
    pub self_intersections: usize,
    /// Enclosed volume; positive for outward normals.
    pub signed_volume: f64,
}

impl ManifoldReport {
    /// Check a solid.
    #[must_use]
    pub fn analyze(mesh: &SolidMesh, tol: Tolerance) -> Self {
        let adjacency = EdgeAdjacency::build(mesh);
        let degenerate_faces = (0..mesh.face_count())
            .filter(|&f| {
                let [a, b, c] = mesh.faces[f];
                a == b || b == c || a == c || mesh.face_unit_normal(f).is_none()
            })
            .count();

        Self {
            boundary_edges: adjacency.boundary_edge_count(),
            non_manifold_edges: adjacency.non_manifold_edge_count(),
            inconsistent_edges: adjacency.inconsistent_edge_count(),
            degenerate_faces,
            self_intersections: count_self_intersections(mesh, tol),
            signed_volume: mesh.signed_volume(),
        }
    }

    /// Closed, 2-manifold and consistently wound.
    #[must_use]
    pub const fn is_closed_manifold(&self) -> bool {
        self.boundary_edges == 0 && self.non_manifold_edges == 0 && self.inconsistent_edges == 0
    }

    /// A valid solid: closed manifold, no degenerate faces, no
    /// self-intersections and positive volume.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_closed_manifold()
            && self.degenerate_faces == 0
            && self.self_intersections == 0
            && self.signed_volume > 0.0
    }
}

impl fmt::Display for ManifoldReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "boundary={} non_manifold={} inconsistent={} degenerate={} self_intersections={} volume={:.3}",
            self.boundary_edges,
            self.non_manifold_edges,
            self.inconsistent_edges,
            self.degenerate_faces,
            self.self_intersections,
            self.signed_volume
        )
    }
}

/// Count pairs of faces that cross each other.
///
/// Faces sharing an edge never count. Faces sharing one vertex count only if
/// an edge opposite the shared vertex crosses the other face.
#[must_use]
pub fn count_self_intersections(mesh: &SolidMesh, tol: Tolerance) -> usize {
    if mesh.face_count() < 2 {
        return 0;
    }
    let bvh = Bvh::build(mesh, 8);

    (0..mesh.face_count())
        .into_par_iter()
        .map(|i| {
            let tri_i = mesh.triangle(i);
            let bbox = Aabb::from_points(&tri_i);
            bvh.query(&bbox, tol.linear)
                .into_iter()
                .filter(|&j| (j as usize) > i)
                .filter(|&j| faces_cross(mesh, i, j as usize))
                .count()
        })
        .sum()
}

fn faces_cross(mesh: &SolidMesh, i: usize, j: usize) -> bool {
    let fi = mesh.faces[i];
    let fj = mesh.faces[j];
    let shared: Vec<u32> = fi.iter().copied().filter(|v| fj.contains(v)).collect();
    let tri_i = mesh.triangle(i);
    let tri_j = mesh.triangle(j);

    match shared.len() {
        0 => triangles_intersect(&tri_i, &tri_j, CONTACT_EPSILON),
        1 => {
            let s = shared[0];
            let opposite = |face: [u32; 3]| {
                let k = face.iter().position(|&v| v == s).unwrap_or(0);
                (
                    mesh.vertices[face[(k + 1) % 3] as usize],
                    mesh.vertices[face[(k + 2) % 3] as usize],
                )
            };
            let (a0, a1) = opposite(fi);
            let (b0, b1) = opposite(fj);
            segment_crosses_triangle(&a0, &a1, &tri_j[0], &tri_j[1], &tri_j[2], CONTACT_EPSILON)
                || segment_crosses_triangle(
                    &b0,
                    &b1,
                    &tri_i[0],
                    &tri_i[1],
                    &tri_i[2],
                    CONTACT_EPSILON,
                )
        }
        _ => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use armor_types::{Point3, SurfaceRegion, Vector3, unit_cube};

    #[test]
    fn cube_is_valid() {
        let report = ManifoldReport::analyze(&unit_cube(), Tolerance::default());
        assert!(report.is_valid(), "{report}");
    }

    #[test]
    fn inverted_cube_is_not_valid() {
        let mut cube = unit_cube();
        cube.flip_winding();
        let report = ManifoldReport::analyze(&cube, Tolerance::default());
        assert!(report.is_closed_manifold());
        assert!(!report.is_valid());
    }

    #[test]
    fn open_mesh_reports_boundary() {
        let (open, _) = unit_cube().filter_faces(|f, _| f > 1);
        let report = ManifoldReport::analyze(&open, Tolerance::default());
        assert_eq!(report.boundary_edges, 4);
        assert!(!report.is_valid());
    }

    #[test]
    fn overlapping_cubes_self_intersect() {
        let mut mesh = unit_cube();
        let mut other = unit_cube();
        other.translate(Vector3::new(0.3, 0.4, 0.45));
        mesh.merge(&other);
        let report = ManifoldReport::analyze(&mesh, Tolerance::default());
        assert!(report.is_closed_manifold());
        assert!(report.self_intersections > 0);
        assert!(!report.is_valid());
    }

    #[test]
    fn degenerate_face_detected() {
        let mut mesh = unit_cube();
        let p = mesh.push_vertex(Point3::new(0.5, 0.5, 0.5));
        mesh.push_face([p, p, 0], SurfaceRegion::Outer);
        let report = ManifoldReport::analyze(&mesh, Tolerance::default());
        assert_eq!(report.degenerate_faces, 1);
    }
}
