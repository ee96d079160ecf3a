//! Proximity and containment queries against (parts of) a mesh.

#![allow(clippy::cast_possible_truncation)]

use crate::bvh::Bvh;
use crate::intersect::{closest_point_on_triangle, ray_triangle_intersect};
use armor_types::{Aabb, Point3, SolidMesh, SurfaceRegion, Vector3};

/// Closest surface point found by a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Distance from the query point.
    pub distance: f64,
    /// Closest point on the surface.
    pub point: Point3<f64>,
    /// Face containing the closest point.
    pub face: usize,
}

/// A BVH-backed index over the faces of a mesh, optionally restricted to
/// some regions.
#[derive(Debug)]
pub struct SurfaceQuery<'m> {
    mesh: &'m SolidMesh,
    bvh: Bvh,
}

impl<'m> SurfaceQuery<'m> {
    /// Index every face.
    #[must_use]
    pub fn new(mesh: &'m SolidMesh) -> Self {
        Self {
            mesh,
            bvh: Bvh::build(mesh, 8),
        }
    }

    /// Index only faces whose region satisfies `filter`.
    #[must_use]
    pub fn for_regions(mesh: &'m SolidMesh, filter: impl Fn(SurfaceRegion) -> bool) -> Self {
        let faces: Vec<u32> = (0..mesh.face_count())
            .filter(|&f| filter(mesh.regions[f]))
            .map(|f| f as u32)
            .collect();
        Self {
            mesh,
            bvh: Bvh::build_for_faces(mesh, &faces, 8),
        }
    }

    /// The indexed mesh.
    #[must_use]
    pub const fn mesh(&self) -> &'m SolidMesh {
        self.mesh
    }

    /// Closest indexed surface point within `max_distance`, if any.
    #[must_use]
    pub fn nearest_within(&self, point: &Point3<f64>, max_distance: f64) -> Option<SurfaceHit> {
        let probe = Aabb::new(*point, *point).padded(max_distance);
        let mut best: Option<SurfaceHit> = None;
        for face in self.bvh.query(&probe, 0.0) {
            let [a, b, c] = self.mesh.triangle(face as usize);
            let q = closest_point_on_triangle(point, &a, &b, &c);
            let distance = (q - point).norm();
            if distance <= max_distance && best.is_none_or(|hit| distance < hit.distance) {
                best = Some(SurfaceHit {
                    distance,
                    point: q,
                    face: face as usize,
                });
            }
        }
        best
    }

    /// Closest indexed surface point, searching outward with a growing radius.
    #[must_use]
    pub fn nearest(&self, point: &Point3<f64>) -> Option<SurfaceHit> {
        let bounds = self.mesh.bounds();
        let reach = bounds.diagonal() + (point - bounds.center()).norm();
        let mut radius = (bounds.diagonal() * 0.02).max(1e-6);
        loop {
            if let Some(hit) = self.nearest_within(point, radius) {
                return Some(hit);
            }
            if radius > reach {
                return None;
            }
            radius *= 2.0;
        }
    }

    /// Ray parameters of every indexed face hit by `origin + t * direction`, sorted.
    #[must_use]
    pub fn ray_hits(&self, origin: &Point3<f64>, direction: &Vector3<f64>) -> Vec<(f64, usize)> {
        let mut hits: Vec<(f64, usize)> = self
            .bvh
            .query_ray(origin, direction)
            .into_iter()
            .filter_map(|face| {
                let [a, b, c] = self.mesh.triangle(face as usize);
                ray_triangle_intersect(origin, direction, &a, &b, &c, 1e-12)
                    .map(|t| (t, face as usize))
            })
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        hits
    }

    /// Whether a point lies inside the indexed surface.
    ///
    /// Casts three skewed rays and takes the majority parity vote, which
    /// tolerates a ray grazing an edge. Only meaningful when the indexed
    /// faces form a closed surface.
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        let directions = [
            Vector3::new(1.0, 0.371, 0.193),
            Vector3::new(-0.287, 1.0, 0.411),
            Vector3::new(0.157, -0.323, 1.0),
        ];
        let inside = directions
            .iter()
            .filter(|dir| self.ray_hits(point, dir).len() % 2 == 1)
            .count();
        inside >= 2
    }
}
