//! Cutting a solid with a plane, capping the cut and adding interlock keys.
//!
//! Crossing triangles are split at the plane; cut points are keyed by the
//! edge they lie on, so cutting the same solid from both sides yields
//! identical seam vertices. The cut loops are capped with an ear-clipping
//! triangulation, with key footprints as extra holes; points on straight
//! runs of a loop are fanned back in so the cap shares every cut edge.

#![allow(clippy::cast_possible_truncation)]

use crate::error::{KernelError, KernelResult};
use crate::kernel::{HalfSpace, InterlockKey, Tolerance};
use crate::section::{CapFrame, CrossSection, SectionLoop, SectionRegion, polygon_signed_area};
use armor_types::{Plane, Point3, SolidMesh, SurfaceRegion};
use hashbrown::{HashMap, HashSet};
use nalgebra::Point2;
use rayon::prelude::*;
use tracing::debug;

/// Attempts at moving the plane off mesh vertices.
const NUDGE_ATTEMPTS: u32 = 8;

/// Relative slack allowed between the triangulated cap area and the region area.
const CAP_AREA_SLACK: f64 = 1e-6;

/// Cross product, relative to the squared span, below which a ring point
/// counts as lying on a straight run.
const COLLINEAR_SLACK: f64 = 1e-9;

/// Which side of a cut plane to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepSide {
    /// Signed distance below zero. Gets the interlock tabs.
    Negative,
    /// Signed distance above zero. Gets the interlock recesses.
    Positive,
}

impl KeepSide {
    fn keeps(self, distance: f64) -> bool {
        match self {
            Self::Negative => distance < 0.0,
            Self::Positive => distance > 0.0,
        }
    }
}

/// Kept faces of a cut plus the directed edges bounding the cap.
struct SplitFaces {
    mesh: SolidMesh,
    cap_edges: Vec<(u32, u32)>,
}

/// Signed distances to the plane, moving the plane slightly if a vertex
/// lies on it.
fn classify(mesh: &SolidMesh, plane: &Plane, tol: Tolerance) -> KernelResult<(Plane, Vec<f64>)> {
    let eps = tol.linear;
    let mut shift = 0.0;
    for _ in 0..NUDGE_ATTEMPTS {
        let candidate = plane.shifted(shift);
        let distances: Vec<f64> = mesh
            .vertices
            .par_iter()
            .map(|p| candidate.signed_distance(p))
            .collect();
        if distances.iter().all(|d| d.abs() >= eps) {
            if shift > 0.0 {
                debug!(shift, "nudged cut plane off mesh vertices");
            }
            return Ok((candidate, distances));
        }
        shift += 4.0 * eps;
    }
    Err(KernelError::degenerate("cut plane coincides with mesh vertices"))
}

/// Keep the faces on one side, splitting the ones that cross.
fn split_faces(mesh: &SolidMesh, distances: &[f64], keep: KeepSide) -> KernelResult<SplitFaces> {
    let vertex_count = mesh.vertex_count();
    if let Some(f) = mesh
        .faces
        .iter()
        .position(|face| face.iter().any(|&v| v as usize >= vertex_count))
    {
        return Err(KernelError::degenerate(format!(
            "face {f} references a missing vertex"
        )));
    }

    let mut out = SolidMesh::with_capacity(vertex_count, mesh.face_count());
    let mut remap: Vec<Option<u32>> = vec![None; vertex_count];
    for (i, p) in mesh.vertices.iter().enumerate() {
        if keep.keeps(distances[i]) {
            remap[i] = Some(out.push_vertex(*p));
        }
    }
    let kept = |v: u32| {
        remap[v as usize]
            .ok_or_else(|| KernelError::degenerate(format!("vertex {v} was not kept by the cut")))
    };

    let mut edge_points: HashMap<(u32, u32), u32> = HashMap::new();
    let mut edge_point = |out: &mut SolidMesh, a: u32, b: u32| -> u32 {
        let key = if a < b { (a, b) } else { (b, a) };
        *edge_points.entry(key).or_insert_with(|| {
            let (i, j) = (key.0 as usize, key.1 as usize);
            let t = distances[i] / (distances[i] - distances[j]);
            let p = mesh.vertices[i] + (mesh.vertices[j] - mesh.vertices[i]) * t;
            out.push_vertex(p)
        })
    };

    let mut cap_edges = Vec::new();
    for (f, face) in mesh.faces.iter().enumerate() {
        let region = mesh.regions[f];
        let inside = face.map(|v| keep.keeps(distances[v as usize]));
        let count = inside.iter().filter(|&&k| k).count();
        match count {
            0 => {}
            3 => out.push_face([kept(face[0])?, kept(face[1])?, kept(face[2])?], region),
            _ => {
                // Rotate so the odd one out comes first.
                let lone = inside
                    .iter()
                    .position(|&k| k == (count == 1))
                    .unwrap_or(0);
                let a = face[lone];
                let b = face[(lone + 1) % 3];
                let c = face[(lone + 2) % 3];
                let p_ab = edge_point(&mut out, a, b);
                let p_ca = edge_point(&mut out, c, a);
                if count == 1 {
                    out.push_face([kept(a)?, p_ab, p_ca], region);
                    cap_edges.push((p_ca, p_ab));
                } else {
                    let (b, c) = (kept(b)?, kept(c)?);
                    out.push_face([p_ab, b, c], region);
                    out.push_face([p_ab, c, p_ca], region);
                    cap_edges.push((p_ab, p_ca));
                }
            }
        }
    }

    Ok(SplitFaces {
        mesh: out,
        cap_edges,
    })
}

/// Chain directed cap edges into closed loops.
pub(crate) fn chain_loops(edges: &[(u32, u32)]) -> KernelResult<Vec<Vec<u32>>> {
    let mut next: HashMap<u32, u32> = HashMap::with_capacity(edges.len());
    for &(a, b) in edges {
        if next.insert(a, b).is_some() {
            return Err(KernelError::OpenSection(format!(
                "cut vertex {a} starts two edges"
            )));
        }
    }

    let mut visited: HashSet<u32> = HashSet::with_capacity(edges.len());
    let mut loops = Vec::new();
    for &(start, _) in edges {
        if visited.contains(&start) {
            continue;
        }
        let mut chain = vec![start];
        visited.insert(start);
        let mut current = start;
        loop {
            let Some(&n) = next.get(&current) else {
                return Err(KernelError::OpenSection(format!(
                    "cut loop ends at vertex {current}"
                )));
            };
            if n == start {
                break;
            }
            if !visited.insert(n) {
                return Err(KernelError::OpenSection(format!(
                    "cut loop revisits vertex {n}"
                )));
            }
            chain.push(n);
            current = n;
        }
        if chain.len() < 3 {
            return Err(KernelError::OpenSection(format!(
                "cut loop of {} vertices",
                chain.len()
            )));
        }
        loops.push(chain);
    }
    Ok(loops)
}

fn section_loops(mesh: &SolidMesh, loops: Vec<Vec<u32>>, frame: &CapFrame) -> Vec<SectionLoop> {
    loops
        .into_iter()
        .map(|vertices| SectionLoop {
            points: vertices
                .iter()
                .map(|&v| frame.to_2d(&mesh.vertices[v as usize]))
                .collect(),
            vertices,
        })
        .collect()
}

/// Cross-section of a solid by a plane, seen from the plane's positive side.
///
/// Outer loops are counter-clockwise and holes clockwise in the returned
/// frame. A plane missing the solid gives an empty section.
///
/// # Errors
///
/// Returns [`KernelError::OpenSection`] if the solid is not closed along the
/// cut.
pub fn cross_section(mesh: &SolidMesh, plane: &Plane, tol: Tolerance) -> KernelResult<CrossSection> {
    let (plane, distances) = classify(mesh, plane, tol)?;
    let frame = CapFrame::new(&plane);
    let split = split_faces(mesh, &distances, KeepSide::Negative)?;
    let loops = chain_loops(&split.cap_edges)?;
    Ok(CrossSection {
        frame,
        loops: section_loops(&split.mesh, loops, &frame),
    })
}

/// Keep one side of a solid and close it along the plane.
///
/// The cap is tagged [`SurfaceRegion::Seam`]. Each key adds a tab to the
/// negative side or a recess to the positive side, tagged
/// [`SurfaceRegion::Interlock`]. A solid entirely on the kept side is
/// returned unchanged.
///
/// # Errors
///
/// Returns [`KernelError::EmptyResult`] if nothing is kept,
/// [`KernelError::OpenSection`] if the cut does not close, and
/// [`KernelError::Degenerate`] if a key does not fit inside the section.
pub fn cut_half_space(
    mesh: &SolidMesh,
    half: &HalfSpace,
    keep: KeepSide,
    tol: Tolerance,
) -> KernelResult<SolidMesh> {
    let (plane, distances) = classify(mesh, &half.plane, tol)?;
    let kept = distances.iter().filter(|&&d| keep.keeps(d)).count();
    if kept == 0 {
        return Err(KernelError::EmptyResult);
    }
    if kept == distances.len() {
        return Ok(mesh.clone());
    }

    let SplitFaces {
        mesh: mut out,
        cap_edges,
    } = split_faces(mesh, &distances, keep)?;
    let loops = chain_loops(&cap_edges)?;

    let frame = match keep {
        KeepSide::Negative => CapFrame::new(&plane),
        KeepSide::Positive => CapFrame::new(&plane).flipped(),
    };
    let section = CrossSection {
        frame,
        loops: section_loops(&out, loops, &frame),
    };
    let regions = section.regions();
    let assigned: usize = regions.iter().map(|r| 1 + r.holes.len()).sum();
    if assigned != section.loops.len() {
        return Err(KernelError::OpenSection(
            "cut loop outside every region".to_string(),
        ));
    }

    let mut footprints: Vec<(usize, [u32; 4])> = Vec::with_capacity(half.keys.len());
    for key in &half.keys {
        let grow = match keep {
            KeepSide::Negative => 0.0,
            KeepSide::Positive => key.clearance,
        };
        let corners = key.footprint(&plane, grow);
        let outline: Vec<Point2<f64>> = corners.iter().map(|c| frame.to_2d(c)).collect();
        let region = section
            .region_containing(&regions, &outline[0])
            .filter(|_| section.fits(&outline, 0.0))
            .ok_or_else(|| KernelError::degenerate("interlock key does not fit the cross-section"))?;
        let base = corners.map(|c| out.push_vertex(c));
        add_key(&mut out, base, &plane, key, keep);
        // Cap boundary runs opposite to the key walls.
        let ring = match keep {
            KeepSide::Negative => [base[3], base[2], base[1], base[0]],
            KeepSide::Positive => base,
        };
        footprints.push((region, ring));
    }

    for (r, region) in regions.iter().enumerate() {
        let holes: Vec<[u32; 4]> = footprints
            .iter()
            .filter(|(owner, _)| *owner == r)
            .map(|(_, base)| *base)
            .collect();
        cap_region(&mut out, &section, region, &holes)?;
    }

    debug!(
        ?keep,
        loops = section.loops.len(),
        keys = half.keys.len(),
        faces = out.face_count(),
        "cut solid"
    );
    Ok(out)
}

/// Add the walls and end face of a tab (negative side) or recess (positive
/// side) over a footprint already on the cut plane.
fn add_key(out: &mut SolidMesh, base: [u32; 4], plane: &Plane, key: &InterlockKey, keep: KeepSide) {
    let n = plane.normal.into_inner();
    let corners = base.map(|v| out.vertices[v as usize]);
    match keep {
        KeepSide::Negative => {
            let lift = n * key.height;
            let top = corners.map(|p| out.push_vertex(p + lift));
            for i in 0..4 {
                let j = (i + 1) % 4;
                out.push_face([base[i], base[j], top[j]], SurfaceRegion::Interlock);
                out.push_face([base[i], top[j], top[i]], SurfaceRegion::Interlock);
            }
            out.push_face([top[0], top[1], top[2]], SurfaceRegion::Interlock);
            out.push_face([top[0], top[2], top[3]], SurfaceRegion::Interlock);
        }
        KeepSide::Positive => {
            let sink = n * (key.height + key.clearance);
            let floor = corners.map(|p| out.push_vertex(p + sink));
            for i in 0..4 {
                let j = (i + 1) % 4;
                out.push_face([base[i], floor[j], base[j]], SurfaceRegion::Interlock);
                out.push_face([base[i], floor[i], floor[j]], SurfaceRegion::Interlock);
            }
            out.push_face([floor[0], floor[2], floor[1]], SurfaceRegion::Interlock);
            out.push_face([floor[0], floor[3], floor[2]], SurfaceRegion::Interlock);
        }
    }
}

/// Triangulate one cap region (outer loop, holes and key footprints).
///
/// Every ring is listed in the cap's direction. Each ring edge must end up
/// on exactly one cap triangle, running the same way, so the cap pairs up
/// with the cut faces around it.
fn cap_region(
    out: &mut SolidMesh,
    section: &CrossSection,
    region: &SectionRegion,
    footprints: &[[u32; 4]],
) -> KernelResult<()> {
    let frame = &section.frame;
    let mut ids: Vec<u32> = Vec::new();
    let mut points: Vec<Point2<f64>> = Vec::new();
    let mut rings: Vec<Vec<usize>> = Vec::new();
    let mut add_ring = |vertices: &[u32], outline: &[Point2<f64>]| {
        rings.push((ids.len()..ids.len() + vertices.len()).collect());
        ids.extend_from_slice(vertices);
        points.extend_from_slice(outline);
    };

    let outer = &section.loops[region.outer];
    add_ring(&outer.vertices, &outer.points);
    let mut expected = outer.signed_area();
    for &h in &region.holes {
        let hole = &section.loops[h];
        add_ring(&hole.vertices, &hole.points);
        expected -= hole.signed_area().abs();
    }
    for footprint in footprints {
        let outline: Vec<Point2<f64>> = footprint
            .iter()
            .map(|&v| frame.to_2d(&out.vertices[v as usize]))
            .collect();
        expected -= polygon_signed_area(&outline).abs();
        add_ring(footprint, &outline);
    }

    let mut triangles = triangulate_rings(&points, &rings)?;
    let area: f64 = triangles.iter().map(|&t| triangle_area(&points, t)).sum();
    if (area - expected).abs() > CAP_AREA_SLACK * expected.abs().max(1.0) {
        return Err(KernelError::Triangulation(format!(
            "cap area {area:.6} differs from region area {expected:.6}"
        )));
    }

    for t in triangles.drain(..) {
        out.push_face([ids[t[0]], ids[t[1]], ids[t[2]]], SurfaceRegion::Seam);
    }
    Ok(())
}

/// Triangulate a planar polygon with holes, keeping every ring point.
///
/// `rings[0]` is the outer boundary (counter-clockwise) and the rest are
/// holes (clockwise), as indices into `points`. Triangles come back
/// counter-clockwise. Points on straight runs are left out of the ear
/// clipping and fanned back in afterwards.
///
/// # Errors
///
/// Returns [`KernelError::Triangulation`] if ear clipping fails or a ring
/// edge is not covered exactly once.
pub fn triangulate_rings(
    points: &[Point2<f64>],
    rings: &[Vec<usize>],
) -> KernelResult<Vec<[usize; 3]>> {
    let mut local: Vec<usize> = Vec::new();
    let mut hole_starts: Vec<usize> = Vec::new();
    for (k, ring) in rings.iter().enumerate() {
        if k > 0 {
            hole_starts.push(local.len());
        }
        local.extend(corner_points(ring, points));
    }
    let coords: Vec<f64> = local.iter().flat_map(|&i| [points[i].x, points[i].y]).collect();
    let indices = earcutr::earcut(&coords, &hole_starts, 2)
        .map_err(|e| KernelError::Triangulation(format!("{e:?}")))?;

    let mut triangles: Vec<[usize; 3]> = indices
        .chunks_exact(3)
        .map(|t| [local[t[0]], local[t[1]], local[t[2]]])
        .collect();
    let total: f64 = triangles.iter().map(|&t| triangle_area(points, t)).sum();
    if total < 0.0 {
        for t in &mut triangles {
            t.swap(1, 2);
        }
    }

    restore_ring_points(&mut triangles, rings)?;
    check_ring_edges(&triangles, rings)?;
    Ok(triangles)
}

/// Ring points that are not on a straight run between their neighbours.
///
/// Starts from the sharpest corner so the first point is always kept.
fn corner_points(ring: &[usize], points: &[Point2<f64>]) -> Vec<usize> {
    let n = ring.len();
    if n < 4 {
        return ring.to_vec();
    }
    let turn = |k: usize| {
        let q = points[ring[(k + n - 1) % n]];
        let p = points[ring[k]];
        let r = points[ring[(k + 1) % n]];
        (p - q).perp(&(r - q)).abs()
    };
    let start = (0..n)
        .max_by(|&a, &b| turn(a).total_cmp(&turn(b)))
        .unwrap_or(0);

    let mut kept = vec![ring[start]];
    let mut last = ring[start];
    for step in 1..n {
        let p = ring[(start + step) % n];
        let r = ring[(start + step + 1) % n];
        if !on_straight_run(&points[last], &points[p], &points[r]) {
            kept.push(p);
            last = p;
        }
    }
    kept
}

/// Whether `p` lies on the open segment from `q` to `r`.
fn on_straight_run(q: &Point2<f64>, p: &Point2<f64>, r: &Point2<f64>) -> bool {
    let d = r - q;
    let len2 = d.norm_squared();
    if len2 <= f64::MIN_POSITIVE {
        return false;
    }
    let t = (p - q).dot(&d) / len2;
    (p - q).perp(&d).abs() <= COLLINEAR_SLACK * len2 && t > 0.0 && t < 1.0
}

/// Fan ring points the triangulation skipped back into the triangle on
/// the boundary edge that spans them.
fn restore_ring_points(triangles: &mut Vec<[usize; 3]>, rings: &[Vec<usize>]) -> KernelResult<()> {
    let mut used: HashSet<usize> = triangles.iter().flatten().copied().collect();
    let mut owner: HashMap<(usize, usize), usize> = HashMap::with_capacity(3 * triangles.len());
    for (t, tri) in triangles.iter().enumerate() {
        for e in 0..3 {
            owner.insert((tri[e], tri[(e + 1) % 3]), t);
        }
    }

    for ring in rings {
        let n = ring.len();
        let first = (0..n)
            .find(|&k| used.contains(&ring[k]))
            .ok_or_else(|| KernelError::Triangulation("cap ring left out entirely".to_string()))?;
        let mut k = first;
        loop {
            let mut m = (k + 1) % n;
            let mut gap = Vec::new();
            while !used.contains(&ring[m]) {
                gap.push(ring[m]);
                m = (m + 1) % n;
            }
            if !gap.is_empty() {
                let (a, b) = (ring[k], ring[m]);
                let t = owner.get(&(a, b)).copied().ok_or_else(|| {
                    KernelError::Triangulation(format!("no cap triangle on boundary edge {a}-{b}"))
                })?;
                let tri = triangles[t];
                for e in 0..3 {
                    owner.remove(&(tri[e], tri[(e + 1) % 3]));
                }
                let Some(e) = (0..3).find(|&e| tri[e] == a) else {
                    return Err(KernelError::Triangulation(format!(
                        "cap triangle {t} lost corner {a}"
                    )));
                };
                let apex = tri[(e + 2) % 3];

                let chain: Vec<usize> = std::iter::once(a)
                    .chain(gap.iter().copied())
                    .chain(std::iter::once(b))
                    .collect();
                for (i, pair) in chain.windows(2).enumerate() {
                    let fan = [pair[0], pair[1], apex];
                    let slot = if i == 0 {
                        triangles[t] = fan;
                        t
                    } else {
                        triangles.push(fan);
                        triangles.len() - 1
                    };
                    for e in 0..3 {
                        owner.insert((fan[e], fan[(e + 1) % 3]), slot);
                    }
                }
                used.extend(gap);
            }
            k = m;
            if k == first {
                break;
            }
        }
    }
    Ok(())
}

/// Every ring edge must appear once in ring direction, and every other
/// edge must be shared by two triangles running opposite ways.
fn check_ring_edges(triangles: &[[usize; 3]], rings: &[Vec<usize>]) -> KernelResult<()> {
    let mut edges: HashMap<(usize, usize), u32> = HashMap::with_capacity(3 * triangles.len());
    for tri in triangles {
        for e in 0..3 {
            *edges.entry((tri[e], tri[(e + 1) % 3])).or_default() += 1;
        }
    }

    let mut boundary: HashSet<(usize, usize)> = HashSet::new();
    for ring in rings {
        for k in 0..ring.len() {
            let edge = (ring[k], ring[(k + 1) % ring.len()]);
            if edges.get(&edge) != Some(&1) || edges.contains_key(&(edge.1, edge.0)) {
                return Err(KernelError::Triangulation(format!(
                    "boundary edge {}-{} is not covered once",
                    edge.0, edge.1
                )));
            }
            boundary.insert(edge);
        }
    }

    for (&(a, b), &count) in &edges {
        if count != 1 || (!boundary.contains(&(a, b)) && edges.get(&(b, a)) != Some(&1)) {
            return Err(KernelError::Triangulation(format!(
                "interior edge {a}-{b} is not shared by two triangles"
            )));
        }
    }
    Ok(())
}

fn triangle_area(points: &[Point2<f64>], t: [usize; 3]) -> f64 {
    let [a, b, c] = t.map(|i| points[i]);
    0.5 * (b - a).perp(&(c - a))
}
