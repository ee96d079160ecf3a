//! Imprinting a planar outline into a solid: pockets, bosses and through-holes.
//!
//! A [`Stencil`] is a closed outline on a [`CapFrame`], projected along the
//! frame normal. The solid is first sliced by the plane through every outline
//! edge, so each face lies wholly inside or wholly outside the projection.
//! A patch is then grown from the inside face nearest the frame origin and
//! either moved along the normal ([`emboss`]) or removed together with the
//! facing patch on the far side of the wall ([`pierce`]).

#![allow(clippy::cast_possible_truncation)]

use crate::cut::chain_loops;
use crate::error::{KernelError, KernelResult};
use crate::kernel::Tolerance;
use crate::section::{CapFrame, point_in_polygon, point_segment_distance, polygon_signed_area};
use armor_types::{Plane, Point3, SolidMesh, SurfaceRegion, Unit};
use hashbrown::HashMap;
use nalgebra::{Point2, Vector2};
use std::collections::VecDeque;
use std::f64::consts::TAU;
use tracing::debug;

/// Vertices this many tolerances from a slice plane are moved onto it.
const SNAP_FACTOR: f64 = 100.0;

/// Patch boundaries must stay within this many tolerances of the outline.
const OUTLINE_FACTOR: f64 = 1e3;

/// A closed outline on a plane, counter-clockwise in its frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Stencil {
    /// Plane and projection direction of the outline.
    pub frame: CapFrame,
    /// Outline corners in frame coordinates.
    pub outline: Vec<Point2<f64>>,
}

impl Stencil {
    /// Create a stencil, reversing a clockwise outline.
    #[must_use]
    pub fn new(frame: CapFrame, mut outline: Vec<Point2<f64>>) -> Self {
        if polygon_signed_area(&outline) < 0.0 {
            outline.reverse();
        }
        Self { frame, outline }
    }

    /// Rectangle spanning `u` and `v` in frame coordinates.
    #[must_use]
    pub fn rectangle(frame: CapFrame, u: [f64; 2], v: [f64; 2]) -> Self {
        Self::new(
            frame,
            vec![
                Point2::new(u[0], v[0]),
                Point2::new(u[1], v[0]),
                Point2::new(u[1], v[1]),
                Point2::new(u[0], v[1]),
            ],
        )
    }

    /// Regular polygon with `sides` corners on a circle of `radius`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn regular(frame: CapFrame, centre: Point2<f64>, radius: f64, sides: usize) -> Self {
        let sides = sides.max(3);
        let outline = (0..sides)
            .map(|i| {
                let t = TAU * (i as f64 + 0.5) / sides as f64;
                centre + Vector2::new(t.cos(), t.sin()) * radius
            })
            .collect();
        Self::new(frame, outline)
    }

    /// Enclosed area.
    #[must_use]
    pub fn area(&self) -> f64 {
        polygon_signed_area(&self.outline)
    }

    fn check(&self) -> KernelResult<()> {
        if self.outline.len() < 3 || self.area() <= 0.0 {
            return Err(KernelError::degenerate("stencil outline encloses no area"));
        }
        Ok(())
    }

    /// One slice plane per distinct outline line, facing out of the outline.
    fn edge_planes(&self) -> Vec<Plane> {
        let n = self.outline.len();
        let mut lines: Vec<(Vector2<f64>, f64)> = Vec::with_capacity(n);
        let mut planes = Vec::with_capacity(n);
        for i in 0..n {
            let p = self.outline[i];
            let d = self.outline[(i + 1) % n] - p;
            let len = d.norm();
            if len < 1e-12 {
                continue;
            }
            let outward = Vector2::new(d.y, -d.x) / len;
            let offset = outward.dot(&p.coords);
            let slack = 1e-9 * (1.0 + offset.abs());
            let repeated = lines.iter().any(|(m, c)| {
                ((m - outward).norm() < 1e-9 && (c - offset).abs() < slack)
                    || ((m + outward).norm() < 1e-9 && (c + offset).abs() < slack)
            });
            if repeated {
                continue;
            }
            lines.push((outward, offset));
            let normal = Unit::new_normalize(self.frame.direction_3d(&outward));
            planes.push(Plane::new(self.frame.to_3d(&p), normal));
        }
        planes
    }

    fn distance_to_outline(&self, q: &Point2<f64>) -> f64 {
        let n = self.outline.len();
        (0..n)
            .map(|i| point_segment_distance(q, &self.outline[i], &self.outline[(i + 1) % n]))
            .fold(f64::INFINITY, f64::min)
    }
}

/// Split every face crossing a plane, keeping both sides.
///
/// Vertices within `snap` of the plane are moved onto it and never split, so
/// no sliver faces appear next to existing vertices. Split points are shared
/// between the two faces of an edge.
#[must_use]
pub fn slice_surface(mesh: &SolidMesh, plane: &Plane, snap: f64) -> SolidMesh {
    let distances: Vec<f64> = mesh
        .vertices
        .iter()
        .map(|p| plane.signed_distance(p))
        .collect();
    let side: Vec<i8> = distances
        .iter()
        .map(|&d| {
            if d > snap {
                1
            } else if d < -snap {
                -1
            } else {
                0
            }
        })
        .collect();

    let mut out = SolidMesh {
        vertices: mesh
            .vertices
            .iter()
            .zip(&side)
            .map(|(p, &s)| if s == 0 { plane.project(p) } else { *p })
            .collect(),
        faces: Vec::with_capacity(mesh.face_count()),
        regions: Vec::with_capacity(mesh.face_count()),
    };

    let mut edge_points: HashMap<(u32, u32), u32> = HashMap::new();
    let mut edge_point = |out: &mut SolidMesh, a: u32, b: u32| -> u32 {
        let key = if a < b { (a, b) } else { (b, a) };
        *edge_points.entry(key).or_insert_with(|| {
            let (i, j) = (key.0 as usize, key.1 as usize);
            let t = distances[i] / (distances[i] - distances[j]);
            out.push_vertex(mesh.vertices[i] + (mesh.vertices[j] - mesh.vertices[i]) * t)
        })
    };

    for (f, face) in mesh.faces.iter().enumerate() {
        let region = mesh.regions[f];
        let s = face.map(|v| side[v as usize]);
        if !(s.contains(&1) && s.contains(&-1)) {
            out.push_face(*face, region);
            continue;
        }
        if let Some(z) = s.iter().position(|&x| x == 0) {
            let (a, b, c) = (face[z], face[(z + 1) % 3], face[(z + 2) % 3]);
            let p = edge_point(&mut out, b, c);
            out.push_face([a, b, p], region);
            out.push_face([a, p, c], region);
        } else {
            let lone = if s[0] == s[1] {
                2
            } else if s[0] == s[2] {
                1
            } else {
                0
            };
            let a = face[lone];
            let b = face[(lone + 1) % 3];
            let c = face[(lone + 2) % 3];
            let p_ab = edge_point(&mut out, a, b);
            let p_ca = edge_point(&mut out, c, a);
            out.push_face([a, p_ab, p_ca], region);
            out.push_face([p_ab, b, c], region);
            out.push_face([p_ab, c, p_ca], region);
        }
    }
    out
}

fn sliced(mesh: &SolidMesh, stencil: &Stencil, tol: Tolerance) -> SolidMesh {
    let snap = tol.linear * SNAP_FACTOR;
    stencil
        .edge_planes()
        .iter()
        .fold(mesh.clone(), |m, plane| slice_surface(&m, plane, snap))
}

/// Connected faces under a stencil and their boundary loop.
struct Patch {
    faces: Vec<usize>,
    /// Boundary in face winding order.
    boundary: Vec<u32>,
}

fn centroid(mesh: &SolidMesh, f: usize) -> Point3<f64> {
    let [a, b, c] = mesh.triangle(f);
    Point3::from((a.coords + b.coords + c.coords) / 3.0)
}

/// Grow the patch of accepted faces under a sliced stencil.
///
/// `facing` is `1.0` for faces looking along the frame normal and `-1.0`
/// for faces looking against it. The patch fails if it reaches an inside
/// face of another region or facing, or if it is not a disk.
fn grow_patch(
    mesh: &SolidMesh,
    stencil: &Stencil,
    regions: &[SurfaceRegion],
    facing: f64,
    tol: Tolerance,
) -> KernelResult<Patch> {
    let frame = &stencil.frame;
    let inside: Vec<bool> = (0..mesh.face_count())
        .map(|f| point_in_polygon(&frame.to_2d(&centroid(mesh, f)), &stencil.outline))
        .collect();
    let accepts = |f: usize| {
        regions.contains(&mesh.regions[f]) && mesh.face_normal(f).dot(&frame.normal) * facing > 0.0
    };

    let seed = (0..mesh.face_count())
        .filter(|&f| inside[f] && accepts(f))
        .map(|f| (f, (centroid(mesh, f) - frame.origin).norm_squared()))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(f, _)| f)
        .ok_or_else(|| KernelError::degenerate("no surface under the stencil"))?;

    let mut owner: HashMap<(u32, u32), usize> = HashMap::with_capacity(mesh.face_count() * 3);
    for (f, face) in mesh.faces.iter().enumerate() {
        for k in 0..3 {
            owner.insert((face[k], face[(k + 1) % 3]), f);
        }
    }

    let mut in_patch = vec![false; mesh.face_count()];
    in_patch[seed] = true;
    let mut queue = VecDeque::from([seed]);
    let mut faces = Vec::new();
    let mut edges = Vec::new();
    while let Some(f) = queue.pop_front() {
        faces.push(f);
        let face = mesh.faces[f];
        for k in 0..3 {
            let (a, b) = (face[k], face[(k + 1) % 3]);
            let g = *owner
                .get(&(b, a))
                .ok_or_else(|| KernelError::degenerate(format!("edge {a}-{b} has no twin")))?;
            if !inside[g] {
                edges.push((a, b));
            } else if !accepts(g) {
                return Err(KernelError::degenerate(format!(
                    "stencil runs onto a {} face",
                    mesh.regions[g]
                )));
            } else if !in_patch[g] {
                in_patch[g] = true;
                queue.push_back(g);
            }
        }
    }

    let loops = chain_loops(&edges)?;
    let [boundary]: [Vec<u32>; 1] = loops.try_into().map_err(|loops: Vec<Vec<u32>>| {
        KernelError::degenerate(format!("stencil patch has {} boundaries", loops.len()))
    })?;
    let slack = tol.linear * OUTLINE_FACTOR;
    if let Some(v) = boundary.iter().find(|&&v| {
        stencil.distance_to_outline(&frame.to_2d(&mesh.vertices[v as usize])) > slack
    }) {
        return Err(KernelError::degenerate(format!(
            "patch boundary vertex {v} is off the outline"
        )));
    }
    Ok(Patch { faces, boundary })
}

/// A solid with one patch moved along a stencil normal.
#[derive(Debug, Clone)]
pub struct Embossed {
    /// The new solid.
    pub mesh: SolidMesh,
    /// Vertices that moved, including the new copies of the patch boundary.
    pub moved: Vec<u32>,
}

/// Move the surface under a stencil by `offset` along the frame normal.
///
/// A negative offset sinks a pocket, a positive one raises a boss. The patch
/// must face along the normal and belong to one of the `on` regions. The
/// moved faces and the new side walls are tagged `region`.
///
/// # Errors
///
/// Returns [`KernelError::Degenerate`] if the stencil is empty, the offset
/// is zero, or the patch runs off the allowed surface.
pub fn emboss(
    mesh: &SolidMesh,
    stencil: &Stencil,
    offset: f64,
    on: &[SurfaceRegion],
    region: SurfaceRegion,
    tol: Tolerance,
) -> KernelResult<Embossed> {
    stencil.check()?;
    if offset.abs() <= tol.linear {
        return Err(KernelError::degenerate("emboss offset is zero"));
    }
    let mut out = sliced(mesh, stencil, tol);
    let patch = grow_patch(&out, stencil, on, 1.0, tol)?;
    let lift = stencil.frame.normal * offset;

    let mut copies: HashMap<u32, u32> = HashMap::with_capacity(patch.boundary.len());
    let mut ring = Vec::with_capacity(patch.boundary.len());
    for &v in &patch.boundary {
        let p = out.vertices[v as usize] + lift;
        let c = out.push_vertex(p);
        copies.insert(v, c);
        ring.push(c);
    }

    let mut interior = vec![false; out.vertex_count()];
    for &f in &patch.faces {
        for &v in &out.faces[f] {
            if !copies.contains_key(&v) {
                interior[v as usize] = true;
            }
        }
    }
    let mut moved = ring.clone();
    for (v, _) in interior.iter().enumerate().filter(|(_, flag)| **flag) {
        out.vertices[v] += lift;
        moved.push(v as u32);
    }

    for &f in &patch.faces {
        out.faces[f] = out.faces[f].map(|v| copies.get(&v).copied().unwrap_or(v));
        out.regions[f] = region;
    }
    let n = patch.boundary.len();
    for i in 0..n {
        let j = (i + 1) % n;
        let (a, b) = (patch.boundary[i], patch.boundary[j]);
        out.push_face([a, b, ring[j]], region);
        out.push_face([a, ring[j], ring[i]], region);
    }

    debug!(
        offset,
        patch = patch.faces.len(),
        boundary = n,
        "embossed stencil"
    );
    Ok(Embossed { mesh: out, moved })
}

/// Cut a hole through a wall along a stencil.
///
/// The entry patch faces along the frame normal and belongs to one of the
/// `from` regions; the exit patch faces against it and belongs to one of
/// the `to` regions. Both are removed and joined by walls tagged `region`.
///
/// # Errors
///
/// Returns [`KernelError::Degenerate`] if either patch runs off its surface
/// or the two boundaries cannot be matched corner to corner.
pub fn pierce(
    mesh: &SolidMesh,
    stencil: &Stencil,
    from: &[SurfaceRegion],
    to: &[SurfaceRegion],
    region: SurfaceRegion,
    tol: Tolerance,
) -> KernelResult<SolidMesh> {
    stencil.check()?;
    let sliced = sliced(mesh, stencil, tol);
    let entry = grow_patch(&sliced, stencil, from, 1.0, tol)?;
    let exit = grow_patch(&sliced, stencil, to, -1.0, tol)?;

    let mut removed = vec![false; sliced.face_count()];
    for &f in entry.faces.iter().chain(&exit.faces) {
        if removed[f] {
            return Err(KernelError::degenerate("stencil entry and exit overlap"));
        }
        removed[f] = true;
    }

    // Both rings counter-clockwise seen along the normal.
    let mut exit_ring = exit.boundary;
    exit_ring.reverse();
    let top = side_chains(&sliced, stencil, &entry.boundary, tol)?;
    let bottom = side_chains(&sliced, stencil, &exit_ring, tol)?;

    let mut out = SolidMesh::with_capacity(sliced.vertex_count(), sliced.face_count());
    out.vertices.clone_from(&sliced.vertices);
    for (f, face) in sliced.faces.iter().enumerate() {
        if !removed[f] {
            out.push_face(*face, sliced.regions[f]);
        }
    }
    for (k, (upper, lower)) in top.iter().zip(&bottom).enumerate() {
        stitch(&mut out, stencil, k, upper, lower, region);
    }

    debug!(
        entry = entry.faces.len(),
        exit = exit.faces.len(),
        corners = stencil.outline.len(),
        "pierced stencil"
    );
    Ok(out.filter_faces(|_, _| true).0)
}

/// Split a counter-clockwise boundary ring into one chain per outline side,
/// each running from its start corner to its end corner inclusive.
fn side_chains(
    mesh: &SolidMesh,
    stencil: &Stencil,
    ring: &[u32],
    tol: Tolerance,
) -> KernelResult<Vec<Vec<u32>>> {
    let frame = &stencil.frame;
    let points: Vec<Point2<f64>> = ring
        .iter()
        .map(|&v| frame.to_2d(&mesh.vertices[v as usize]))
        .collect();
    let slack = tol.linear * OUTLINE_FACTOR;

    let mut corners = Vec::with_capacity(stencil.outline.len());
    for corner in &stencil.outline {
        let (i, d) = points
            .iter()
            .enumerate()
            .map(|(i, q)| (i, (q - corner).norm()))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .ok_or_else(|| KernelError::degenerate("empty patch boundary"))?;
        if d > slack {
            return Err(KernelError::degenerate(format!(
                "no boundary vertex within {slack} of a stencil corner"
            )));
        }
        corners.push(i);
    }

    let n = ring.len();
    let start = corners[0];
    let along: Vec<usize> = corners.iter().map(|&i| (i + n - start) % n).collect();
    if along.windows(2).any(|w| w[1] <= w[0]) {
        return Err(KernelError::degenerate(
            "stencil corners out of order along the boundary",
        ));
    }
    let m = along.len();
    Ok((0..m)
        .map(|k| {
            let end = if k + 1 < m { along[k + 1] } else { n };
            (along[k]..=end).map(|j| ring[(start + j) % n]).collect()
        })
        .collect())
}

/// Wall between the entry and exit chains of one outline side, advancing
/// whichever chain has the nearer next point along the side.
fn stitch(
    out: &mut SolidMesh,
    stencil: &Stencil,
    k: usize,
    top: &[u32],
    bottom: &[u32],
    region: SurfaceRegion,
) {
    let frame = &stencil.frame;
    let n = stencil.outline.len();
    let p = stencil.outline[k];
    let e = stencil.outline[(k + 1) % n] - p;
    let len2 = e.norm_squared();
    let param = |chain: &[u32]| -> Vec<f64> {
        chain
            .iter()
            .map(|&v| (frame.to_2d(&out.vertices[v as usize]) - p).dot(&e) / len2)
            .collect()
    };
    let (t_top, t_bottom) = (param(top), param(bottom));

    let (mut j, mut l) = (0, 0);
    while j + 1 < top.len() || l + 1 < bottom.len() {
        let advance_top =
            l + 1 == bottom.len() || (j + 1 < top.len() && t_top[j + 1] <= t_bottom[l + 1]);
        if advance_top {
            out.push_face([top[j], top[j + 1], bottom[l]], region);
            j += 1;
        } else {
            out.push_face([top[j], bottom[l + 1], bottom[l]], region);
            l += 1;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::validate::ManifoldReport;
    use approx::assert_relative_eq;
    use armor_types::{Axis, Vector3, unit_cube};

    /// A 40 x 40 x 4 plate: top `Outer`, bottom `Inner`, sides `Rim`.
    fn plate() -> SolidMesh {
        let mut mesh = unit_cube();
        for p in &mut mesh.vertices {
            *p = Point3::new(40.0 * (p.x - 0.5), 40.0 * (p.y - 0.5), 4.0 * p.z);
        }
        for f in 0..mesh.face_count() {
            let n = mesh.face_normal(f).normalize();
            mesh.regions[f] = if n.z > 0.5 {
                SurfaceRegion::Outer
            } else if n.z < -0.5 {
                SurfaceRegion::Inner
            } else {
                SurfaceRegion::Rim
            };
        }
        mesh
    }

    fn top() -> CapFrame {
        CapFrame {
            origin: Point3::new(0.0, 0.0, 4.0),
            u: Vector3::x(),
            v: Vector3::y(),
            normal: Vector3::z(),
        }
    }

    fn is_valid(mesh: &SolidMesh) -> bool {
        ManifoldReport::analyze(mesh, Tolerance::default()).is_valid()
    }

    #[test]
    fn clockwise_outline_is_reversed() {
        let cw = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
        ];
        let stencil = Stencil::new(top(), cw);
        assert_relative_eq!(stencil.area(), 1.0);
        assert_relative_eq!(
            Stencil::regular(top(), Point2::origin(), 1.0, 4).area(),
            2.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn slice_keeps_the_solid_closed() {
        let mesh = plate();
        let plane = Plane::axis_aligned(Axis::X, 3.0);
        let out = slice_surface(&mesh, &plane, 1e-4);
        assert!(is_valid(&out));
        assert!(out.face_count() > mesh.face_count());
        assert_relative_eq!(out.volume(), mesh.volume(), max_relative = 1e-12);
    }

    #[test]
    fn plane_through_vertices_splits_nothing() {
        let mesh = plate();
        let out = slice_surface(&mesh, &Plane::axis_aligned(Axis::X, 20.0), 1e-4);
        assert_eq!(out.face_count(), mesh.face_count());
        assert!(is_valid(&out));
    }

    #[test]
    fn pocket_sinks_the_patch() {
        let stencil = Stencil::rectangle(top(), [-5.0, 5.0], [-3.0, 3.0]);
        let out = emboss(
            &plate(),
            &stencil,
            -1.0,
            &[SurfaceRegion::Outer],
            SurfaceRegion::Mount,
            Tolerance::default(),
        )
        .unwrap();

        assert!(is_valid(&out.mesh), "{}", ManifoldReport::analyze(&out.mesh, Tolerance::default()));
        assert_relative_eq!(out.mesh.volume(), 6400.0 - 60.0, max_relative = 1e-9);
        assert!(!out.moved.is_empty());
        for &v in &out.moved {
            assert_relative_eq!(out.mesh.vertices[v as usize].z, 3.0, epsilon = 1e-9);
        }
        assert!(out.mesh.count_region(SurfaceRegion::Mount) > 8);
    }

    #[test]
    fn boss_raises_the_patch() {
        let stencil = Stencil::rectangle(top(), [2.0, 8.0], [-4.0, 6.0]);
        let out = emboss(
            &plate(),
            &stencil,
            2.0,
            &[SurfaceRegion::Outer],
            SurfaceRegion::Mount,
            Tolerance::default(),
        )
        .unwrap();
        assert!(is_valid(&out.mesh));
        assert_relative_eq!(out.mesh.volume(), 6400.0 + 120.0, max_relative = 1e-9);
        assert_relative_eq!(out.mesh.bounds().max.z, 6.0, epsilon = 1e-12);
    }

    #[test]
    fn octagon_hole_goes_through() {
        let stencil = Stencil::regular(top(), Point2::new(1.0, -2.0), 3.0, 8);
        let out = pierce(
            &plate(),
            &stencil,
            &[SurfaceRegion::Outer],
            &[SurfaceRegion::Inner],
            SurfaceRegion::Mount,
            Tolerance::default(),
        )
        .unwrap();

        assert!(is_valid(&out));
        assert_relative_eq!(out.volume(), 6400.0 - 4.0 * stencil.area(), max_relative = 1e-9);
        assert!(out.count_region(SurfaceRegion::Mount) >= 16);
        // One handle: V - E + F = 0 with E = 3F / 2.
        assert_eq!(2 * out.vertex_count(), out.face_count());
    }

    #[test]
    fn t_slot_goes_through() {
        let t = vec![
            Point2::new(-4.0, -1.2),
            Point2::new(1.5, -1.2),
            Point2::new(1.5, -3.5),
            Point2::new(4.0, -3.5),
            Point2::new(4.0, 3.5),
            Point2::new(1.5, 3.5),
            Point2::new(1.5, 1.2),
            Point2::new(-4.0, 1.2),
        ];
        let stencil = Stencil::new(top(), t);
        assert_relative_eq!(stencil.area(), 30.7, epsilon = 1e-12);
        let out = pierce(
            &plate(),
            &stencil,
            &[SurfaceRegion::Outer],
            &[SurfaceRegion::Inner],
            SurfaceRegion::Mount,
            Tolerance::default(),
        )
        .unwrap();
        assert!(is_valid(&out));
        assert_relative_eq!(out.volume(), 6400.0 - 4.0 * 30.7, max_relative = 1e-9);
    }

    #[test]
    fn hole_through_a_pocket_floor() {
        let tol = Tolerance::default();
        let pocket = Stencil::rectangle(top(), [-6.0, 6.0], [-6.0, 6.0]);
        let sunk = emboss(
            &plate(),
            &pocket,
            -1.5,
            &[SurfaceRegion::Outer],
            SurfaceRegion::Mount,
            tol,
        )
        .unwrap();
        let slot = Stencil::rectangle(top(), [-1.0, 1.0], [-4.0, 4.0]);
        let out = pierce(
            &sunk.mesh,
            &slot,
            &[SurfaceRegion::Outer, SurfaceRegion::Mount],
            &[SurfaceRegion::Inner],
            SurfaceRegion::Mount,
            tol,
        )
        .unwrap();
        assert!(is_valid(&out));
        assert_relative_eq!(
            out.volume(),
            6400.0 - 144.0 * 1.5 - 16.0 * 2.5,
            max_relative = 1e-9
        );
    }

    #[test]
    fn stencil_over_the_rim_is_rejected() {
        let stencil = Stencil::rectangle(top(), [15.0, 25.0], [-3.0, 3.0]);
        let err = emboss(
            &plate(),
            &stencil,
            -1.0,
            &[SurfaceRegion::Outer],
            SurfaceRegion::Mount,
            Tolerance::default(),
        )
        .unwrap_err();
        assert!(matches!(err, KernelError::Degenerate(_)), "{err}");
    }

    #[test]
    fn stencil_off_the_solid_finds_nothing() {
        let stencil = Stencil::rectangle(top(), [30.0, 35.0], [-3.0, 3.0]);
        let err = pierce(
            &plate(),
            &stencil,
            &[SurfaceRegion::Outer],
            &[SurfaceRegion::Inner],
            SurfaceRegion::Mount,
            Tolerance::default(),
        )
        .unwrap_err();
        assert_eq!(err, KernelError::degenerate("no surface under the stencil"));
    }
}
