//! Bounding Volume Hierarchy for accelerated proximity and ray queries.
//!
//! Turns the O(n²) face-pair scans of self-intersection checks and the O(n)
//! nearest-surface queries of the shelling stage into O(log n + k) lookups.

#![allow(clippy::cast_possible_truncation)]

use armor_types::{Aabb, Point3, SolidMesh, Vector3};
use rayon::prelude::*;
use smallvec::SmallVec;

/// BVH node containing either leaf triangles or child nodes.
#[derive(Debug)]
enum BvhNode {
    Leaf {
        bbox: Aabb,
        triangles: SmallVec<[u32; 8]>,
    },
    Internal {
        bbox: Aabb,
        left: Box<Self>,
        right: Box<Self>,
    },
}

impl BvhNode {
    const fn bbox(&self) -> &Aabb {
        match self {
            Self::Leaf { bbox, .. } | Self::Internal { bbox, .. } => bbox,
        }
    }
}

/// Bounding Volume Hierarchy over a subset of a mesh's faces.
#[derive(Debug)]
pub struct Bvh {
    root: Option<BvhNode>,
    triangle_count: usize,
}

impl Bvh {
    /// Build a BVH over every face of a mesh.
    #[must_use]
    pub fn build(mesh: &SolidMesh, max_leaf_size: usize) -> Self {
        let faces: Vec<u32> = (0..mesh.face_count() as u32).collect();
        Self::build_for_faces(mesh, &faces, max_leaf_size)
    }

    /// Build a BVH over the listed faces only.
    #[must_use]
    pub fn build_for_faces(mesh: &SolidMesh, faces: &[u32], max_leaf_size: usize) -> Self {
        if faces.is_empty() {
            return Self {
                root: None,
                triangle_count: 0,
            };
        }

        let triangles: Vec<(u32, Aabb, Point3<f64>)> = faces
            .par_iter()
            .map(|&f| {
                let bbox = Aabb::from_points(&mesh.triangle(f as usize));
                (f, bbox, bbox.center())
            })
            .collect();

        let indices: Vec<usize> = (0..triangles.len()).collect();
        let root = Self::build_recursive(&triangles, indices, max_leaf_size.max(1));

        Self {
            root: Some(root),
            triangle_count: faces.len(),
        }
    }

    fn build_recursive(
        triangles: &[(u32, Aabb, Point3<f64>)],
        indices: Vec<usize>,
        max_leaf_size: usize,
    ) -> BvhNode {
        let mut bbox = Aabb::empty();
        for &i in &indices {
            bbox.expand(&triangles[i].1);
        }

        if indices.len() <= max_leaf_size {
            return BvhNode::Leaf {
                bbox,
                triangles: indices.iter().map(|&i| triangles[i].0).collect(),
            };
        }

        // Split along the longest axis at the median centroid
        let extent = bbox.extent();
        let axis = if extent[0] >= extent[1] && extent[0] >= extent[2] {
            0
        } else if extent[1] >= extent[2] {
            1
        } else {
            2
        };
        let mut sorted = indices;
        sorted.sort_by(|&a, &b| triangles[a].2[axis].total_cmp(&triangles[b].2[axis]));

        let right_indices = sorted.split_off(sorted.len() / 2);
        let left = Self::build_recursive(triangles, sorted, max_leaf_size);
        let right = Self::build_recursive(triangles, right_indices, max_leaf_size);

        BvhNode::Internal {
            bbox,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Number of triangles indexed.
    #[must_use]
    pub const fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    /// Faces whose bounding boxes overlap `bbox` (grown by `tolerance`).
    #[must_use]
    pub fn query(&self, bbox: &Aabb, tolerance: f64) -> Vec<u32> {
        let mut out = Vec::new();
        if let Some(root) = &self.root {
            Self::query_recursive(root, bbox, tolerance, &mut out);
        }
        out
    }

    fn query_recursive(node: &BvhNode, bbox: &Aabb, tolerance: f64, out: &mut Vec<u32>) {
        if !node.bbox().intersects(bbox, tolerance) {
            return;
        }
        match node {
            BvhNode::Leaf { triangles, .. } => out.extend_from_slice(triangles),
            BvhNode::Internal { left, right, .. } => {
                Self::query_recursive(left, bbox, tolerance, out);
                Self::query_recursive(right, bbox, tolerance, out);
            }
        }
    }

    /// Faces whose bounding boxes are hit by the ray `origin + t * direction`, `t >= 0`.
    #[must_use]
    pub fn query_ray(&self, origin: &Point3<f64>, direction: &Vector3<f64>) -> Vec<u32> {
        let mut out = Vec::new();
        if let Some(root) = &self.root {
            let inv = direction.map(|d| if d == 0.0 { f64::INFINITY } else { 1.0 / d });
            Self::ray_recursive(root, origin, &inv, &mut out);
        }
        out
    }

    fn ray_recursive(node: &BvhNode, origin: &Point3<f64>, inv: &Vector3<f64>, out: &mut Vec<u32>) {
        if !ray_hits_box(node.bbox(), origin, inv) {
            return;
        }
        match node {
            BvhNode::Leaf { triangles, .. } => out.extend_from_slice(triangles),
            BvhNode::Internal { left, right, .. } => {
                Self::ray_recursive(left, origin, inv, out);
                Self::ray_recursive(right, origin, inv, out);
            }
        }
    }
}

/// Slab test for a ray against a box.
fn ray_hits_box(bbox: &Aabb, origin: &Point3<f64>, inv: &Vector3<f64>) -> bool {
    let mut t_min = 0.0_f64;
    let mut t_max = f64::INFINITY;
    for axis in 0..3 {
        let t1 = (bbox.min[axis] - origin[axis]) * inv[axis];
        let t2 = (bbox.max[axis] - origin[axis]) * inv[axis];
        // NaN arises when the origin lies on a slab plane of a zero-direction axis
        let (lo, hi) = if t1.is_nan() || t2.is_nan() {
            if origin[axis] >= bbox.min[axis] && origin[axis] <= bbox.max[axis] {
                (f64::NEG_INFINITY, f64::INFINITY)
            } else {
                return false;
            }
        } else {
            (t1.min(t2), t1.max(t2))
        };
        t_min = t_min.max(lo);
        t_max = t_max.min(hi);
        if t_min > t_max {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use armor_types::unit_cube;

    #[test]
    fn empty_mesh_builds_empty_bvh() {
        let bvh = Bvh::build(&SolidMesh::new(), 4);
        assert_eq!(bvh.triangle_count(), 0);
        assert!(bvh.query(&Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0)), 0.0).is_empty());
    }

    #[test]
    fn box_query_finds_nearby_faces() {
        let cube = unit_cube();
        // A small box straddling the top face, away from every side.
        let near_top = Aabb::new(Point3::new(0.4, 0.4, 0.95), Point3::new(0.6, 0.6, 1.05));
        let top: Vec<u32> = (0..12)
            .filter(|&f| cube.triangle(f as usize).iter().all(|p| (p.z - 1.0).abs() < 1e-12))
            .collect();
        assert_eq!(top.len(), 2);

        // One face per leaf: exactly the faces whose boxes overlap.
        let fine = Bvh::build(&cube, 1);
        assert_eq!(fine.triangle_count(), 12);
        let mut hits = fine.query(&near_top, 0.0);
        hits.sort_unstable();
        assert_eq!(hits, top);

        // Larger leaves may return extra candidates but never miss one.
        let coarse = Bvh::build(&cube, 4);
        let hits = coarse.query(&near_top, 0.0);
        assert!(top.iter().all(|f| hits.contains(f)));
    }

    #[test]
    fn ray_query_finds_faces_along_ray() {
        let cube = unit_cube();
        let bvh = Bvh::build(&cube, 1);
        let hits = bvh.query_ray(&Point3::new(0.5, 0.5, -1.0), &Vector3::new(0.0, 0.0, 1.0));
        // Bottom and top faces lie along the ray.
        assert!(hits.iter().any(|&f| f < 2));
        assert!(hits.iter().any(|&f| f == 2 || f == 3));
    }

    #[test]
    fn subset_bvh_only_indexes_listed_faces() {
        let cube = unit_cube();
        let bvh = Bvh::build_for_faces(&cube, &[2, 3], 8);
        assert_eq!(bvh.triangle_count(), 2);
        let all = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(2.0, 2.0, 2.0));
        let mut hits = bvh.query(&all, 0.0);
        hits.sort_unstable();
        assert_eq!(hits, vec![2, 3]);
    }
}
