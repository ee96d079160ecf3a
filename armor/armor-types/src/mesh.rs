//! Indexed triangle solid with per-face regions.

use crate::{Aabb, SurfaceRegion};
use nalgebra::{Point3, Unit, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A boundary-represented solid: an indexed triangle surface.
///
/// Every face carries a [`SurfaceRegion`] tag; `regions` is always the same
/// length as `faces`. A `SolidMesh` handed between pipeline stages is closed,
/// 2-manifold, consistently wound and free of self-intersection. Intermediate
/// surfaces inside a stage (an outer surface with its openings removed, for
/// example) may temporarily be open.
///
/// # Winding Order
///
/// Faces use **counter-clockwise (CCW) winding** when viewed from outside.
///
/// # Example
///
/// ```
/// use armor_types::unit_cube;
///
/// let cube = unit_cube();
/// assert_eq!(cube.face_count(), 12);
/// assert!((cube.signed_volume() - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolidMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3<f64>>,
    /// Triangle faces as indices into `vertices`.
    pub faces: Vec<[u32; 3]>,
    /// Region tag per face.
    pub regions: Vec<SurfaceRegion>,
}

impl SolidMesh {
    /// Create an empty mesh.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            regions: Vec::new(),
        }
    }

    /// Create an empty mesh with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
            regions: Vec::with_capacity(face_count),
        }
    }

    /// Create a mesh whose faces all share one region.
    #[must_use]
    pub fn from_parts(
        vertices: Vec<Point3<f64>>,
        faces: Vec<[u32; 3]>,
        region: SurfaceRegion,
    ) -> Self {
        let regions = vec![region; faces.len()];
        Self {
            vertices,
            faces,
            regions,
        }
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces.
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Whether the mesh has no faces.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Append a vertex and return its index.
    #[allow(clippy::cast_possible_truncation)]
    pub fn push_vertex(&mut self, p: Point3<f64>) -> u32 {
        self.vertices.push(p);
        (self.vertices.len() - 1) as u32
    }

    /// Append a face with its region.
    pub fn push_face(&mut self, face: [u32; 3], region: SurfaceRegion) {
        self.faces.push(face);
        self.regions.push(region);
    }

    /// Corner positions of a face.
    #[must_use]
    pub fn triangle(&self, face: usize) -> [Point3<f64>; 3] {
        let [a, b, c] = self.faces[face];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }

    /// Area-weighted face normal (twice the area in length).
    #[must_use]
    pub fn face_normal(&self, face: usize) -> Vector3<f64> {
        let [a, b, c] = self.triangle(face);
        (b - a).cross(&(c - a))
    }

    /// Unit face normal, or `None` for a degenerate face.
    #[must_use]
    pub fn face_unit_normal(&self, face: usize) -> Option<Unit<Vector3<f64>>> {
        Unit::try_new(self.face_normal(face), 1e-20)
    }

    /// Signed volume by the divergence theorem.
    ///
    /// Positive for a closed mesh with outward-facing normals.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        let mut volume = 0.0;

        for &[i0, i1, i2] in &self.faces {
            let v0 = &self.vertices[i0 as usize];
            let v1 = &self.vertices[i1 as usize];
            let v2 = &self.vertices[i2 as usize];

            // Signed volume of the tetrahedron with the origin = v0 · (v1 × v2) / 6
            let cross = Vector3::new(
                v1.y.mul_add(v2.z, -(v1.z * v2.y)),
                v1.z.mul_add(v2.x, -(v1.x * v2.z)),
                v1.x.mul_add(v2.y, -(v1.y * v2.x)),
            );
            volume += v0.z.mul_add(cross.z, v0.x.mul_add(cross.x, v0.y * cross.y));
        }

        volume / 6.0
    }

    /// Absolute volume.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    /// Total surface area.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        (0..self.faces.len())
            .map(|f| self.face_normal(f).norm() * 0.5)
            .sum()
    }

    /// Bounding box of the referenced geometry.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(&self.vertices)
    }

    /// Translate every vertex.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for v in &mut self.vertices {
            *v += offset;
        }
    }

    /// Scale every vertex about the origin.
    pub fn scale(&mut self, factor: f64) {
        for v in &mut self.vertices {
            v.coords *= factor;
        }
    }

    /// Reverse the winding of every face.
    pub fn flip_winding(&mut self) {
        for face in &mut self.faces {
            face.swap(1, 2);
        }
    }

    /// Append another mesh, offsetting its indices.
    #[allow(clippy::cast_possible_truncation)]
    pub fn merge(&mut self, other: &Self) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]),
        );
        self.regions.extend_from_slice(&other.regions);
    }

    /// Number of faces tagged with `region`.
    #[must_use]
    pub fn count_region(&self, region: SurfaceRegion) -> usize {
        self.regions.iter().filter(|r| **r == region).count()
    }

    /// Indices of faces tagged with `region`.
    pub fn faces_in(&self, region: SurfaceRegion) -> impl Iterator<Item = usize> + '_ {
        self.regions
            .iter()
            .enumerate()
            .filter(move |(_, r)| **r == region)
            .map(|(i, _)| i)
    }

    /// Copy of the mesh keeping only faces accepted by `keep`.
    ///
    /// Unreferenced vertices are dropped; the relative order of the remaining
    /// vertices is preserved. Also returns the old-to-new vertex map.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn filter_faces(
        &self,
        mut keep: impl FnMut(usize, SurfaceRegion) -> bool,
    ) -> (Self, Vec<Option<u32>>) {
        let kept: Vec<usize> = (0..self.faces.len())
            .filter(|&f| keep(f, self.regions[f]))
            .collect();

        let mut used = vec![false; self.vertices.len()];
        for &f in &kept {
            for &v in &self.faces[f] {
                used[v as usize] = true;
            }
        }

        let mut remap = vec![None; self.vertices.len()];
        let mut out = Self::with_capacity(self.vertices.len(), kept.len());
        for (i, p) in self.vertices.iter().enumerate() {
            if used[i] {
                remap[i] = Some(out.vertices.len() as u32);
                out.vertices.push(*p);
            }
        }
        for &f in &kept {
            let [a, b, c] = self.faces[f];
            if let (Some(a), Some(b), Some(c)) =
                (remap[a as usize], remap[b as usize], remap[c as usize])
            {
                out.push_face([a, b, c], self.regions[f]);
            }
        }
        (out, remap)
    }

    /// Copy of the mesh without the faces of the given regions.
    #[must_use]
    pub fn without_regions(&self, drop: &[SurfaceRegion]) -> Self {
        self.filter_faces(|_, region| !drop.contains(&region)).0
    }

    /// Retag every face of one region.
    pub fn relabel(&mut self, from: SurfaceRegion, to: SurfaceRegion) {
        for r in &mut self.regions {
            if *r == from {
                *r = to;
            }
        }
    }
}

/// Create an axis-aligned unit cube from the origin to `(1, 1, 1)`.
///
/// Useful as a known-good closed solid in tests.
#[must_use]
pub fn unit_cube() -> SolidMesh {
    let vertices = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(1.0, 0.0, 1.0),
        Point3::new(1.0, 1.0, 1.0),
        Point3::new(0.0, 1.0, 1.0),
    ];
    let faces = vec![
        // Bottom (z = 0), normal -Z
        [0, 2, 1],
        [0, 3, 2],
        // Top (z = 1), normal +Z
        [4, 5, 6],
        [4, 6, 7],
        // Front (y = 0), normal -Y
        [0, 1, 5],
        [0, 5, 4],
        // Back (y = 1), normal +Y
        [3, 7, 6],
        [3, 6, 2],
        // Left (x = 0), normal -X
        [0, 4, 7],
        [0, 7, 3],
        // Right (x = 1), normal +X
        [1, 2, 6],
        [1, 6, 5],
    ];
    SolidMesh::from_parts(vertices, faces, SurfaceRegion::Outer)
}
