//! Lofting closed section rings into a solid.
//!
//! Consecutive rings are stitched with quad strips (two triangles each),
//! and both ends are closed with triangle fans.

#![allow(clippy::cast_possible_truncation)]

use crate::error::{KernelError, KernelResult};
use crate::kernel::{EndCap, Section, Tolerance};
use armor_types::{Point3, SolidMesh, SurfaceRegion};
use tracing::debug;

/// Loft sections into a closed solid.
///
/// All sections must have the same number of points (at least 3) and be
/// sampled with a consistent start point and direction. The resulting solid
/// is oriented so its signed volume is positive.
///
/// # Errors
///
/// Returns [`KernelError::TooFewSections`], [`KernelError::SectionMismatch`] or
/// [`KernelError::Degenerate`] when the sections cannot form a solid.
pub fn loft_sections(
    sections: &[Section],
    start: &EndCap,
    end: &EndCap,
    tol: Tolerance,
) -> KernelResult<SolidMesh> {
    if sections.len() < 2 {
        return Err(KernelError::TooFewSections {
            required: 2,
            actual: sections.len(),
        });
    }
    let n = sections[0].points.len();
    if n < 3 {
        return Err(KernelError::degenerate("sections need at least 3 points"));
    }
    for (index, section) in sections.iter().enumerate() {
        if section.points.len() != n {
            return Err(KernelError::SectionMismatch {
                index,
                expected: n,
                actual: section.points.len(),
            });
        }
        check_ring(index, &section.points, tol)?;
    }

    let m = sections.len();
    let mut mesh = SolidMesh::with_capacity(m * n + 2, 2 * n * m);
    for section in sections {
        mesh.vertices.extend_from_slice(&section.points);
    }

    let ring = |j: usize, k: usize| (j * n + k % n) as u32;
    for j in 0..m - 1 {
        for k in 0..n {
            let a = ring(j, k);
            let b = ring(j, k + 1);
            let c = ring(j + 1, k + 1);
            let d = ring(j + 1, k);
            mesh.push_face([a, b, c], SurfaceRegion::Outer);
            mesh.push_face([a, c, d], SurfaceRegion::Outer);
        }
    }

    // The start ring is traversed k -> k+1 by the side strips, so its cap
    // uses k+1 -> k; the end ring is the opposite.
    let start_center = cap_center(start, &sections[0].points);
    let s = mesh.push_vertex(start_center);
    for k in 0..n {
        mesh.push_face([s, ring(0, k + 1), ring(0, k)], cap_region(start));
    }
    let end_center = cap_center(end, &sections[m - 1].points);
    let e = mesh.push_vertex(end_center);
    for k in 0..n {
        mesh.push_face([e, ring(m - 1, k), ring(m - 1, k + 1)], cap_region(end));
    }

    let volume = mesh.signed_volume();
    if volume.abs() <= tol.linear.powi(3) {
        return Err(KernelError::degenerate("loft encloses no volume"));
    }
    if volume < 0.0 {
        mesh.flip_winding();
    }

    debug!(
        sections = m,
        ring_points = n,
        faces = mesh.face_count(),
        "lofted solid"
    );
    Ok(mesh)
}

/// Reject rings with coincident consecutive points.
fn check_ring(index: usize, points: &[Point3<f64>], tol: Tolerance) -> KernelResult<()> {
    for (k, p) in points.iter().enumerate() {
        let q = &points[(k + 1) % points.len()];
        if (q - p).norm() <= tol.linear {
            return Err(KernelError::degenerate(format!(
                "section {index} has coincident points at {k}"
            )));
        }
    }
    Ok(())
}

fn cap_center(cap: &EndCap, ring: &[Point3<f64>]) -> Point3<f64> {
    match cap {
        EndCap::Apex(p) => *p,
        EndCap::Open | EndCap::Flat => centroid(ring),
    }
}

const fn cap_region(cap: &EndCap) -> SurfaceRegion {
    match cap {
        EndCap::Open => SurfaceRegion::Opening,
        EndCap::Flat | EndCap::Apex(_) => SurfaceRegion::Cap,
    }
}

/// Average of a set of points.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn centroid(points: &[Point3<f64>]) -> Point3<f64> {
    if points.is_empty() {
        return Point3::origin();
    }
    let sum = points
        .iter()
        .fold(nalgebra::Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len() as f64)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::adjacency::EdgeAdjacency;
    use approx::assert_relative_eq;
    use std::f64::consts::TAU;

    fn circle(radius: f64, z: f64, n: usize) -> Section {
        Section::new(
            (0..n)
                .map(|k| {
                    let t = TAU * k as f64 / n as f64;
                    Point3::new(radius * t.sin(), radius * t.cos(), z)
                })
                .collect(),
        )
    }

    #[test]
    fn cylinder_is_closed_and_positive() {
        let sections: Vec<_> = (0..5).map(|j| circle(10.0, f64::from(j) * 5.0, 32)).collect();
        let mesh =
            loft_sections(&sections, &EndCap::Flat, &EndCap::Flat, Tolerance::default()).unwrap();

        assert!(EdgeAdjacency::build(&mesh).is_closed_manifold());
        // Inscribed 32-gon prism of height 20.
        let area = 0.5 * 32.0 * 100.0 * (TAU / 32.0).sin();
        assert_relative_eq!(mesh.signed_volume(), area * 20.0, max_relative = 1e-9);
        assert_eq!(mesh.count_region(SurfaceRegion::Cap), 64);
    }

    #[test]
    fn open_end_is_tagged() {
        let sections = vec![circle(10.0, 0.0, 12), circle(8.0, 10.0, 12)];
        let mesh = loft_sections(
            &sections,
            &EndCap::Open,
            &EndCap::Apex(Point3::new(0.0, 0.0, 15.0)),
            Tolerance::default(),
        )
        .unwrap();
        assert_eq!(mesh.count_region(SurfaceRegion::Opening), 12);
        assert_eq!(mesh.count_region(SurfaceRegion::Cap), 12);
        assert!(mesh.signed_volume() > 0.0);
    }

    #[test]
    fn reversed_rings_still_orient_outward() {
        let sections: Vec<_> = (0..3)
            .map(|j| {
                let mut s = circle(5.0, f64::from(j), 16);
                s.points.reverse();
                s
            })
            .collect();
        let mesh =
            loft_sections(&sections, &EndCap::Flat, &EndCap::Flat, Tolerance::default()).unwrap();
        assert!(mesh.signed_volume() > 0.0);
        assert!(EdgeAdjacency::build(&mesh).is_closed_manifold());
    }

    #[test]
    fn mismatched_sections_rejected() {
        let sections = vec![circle(10.0, 0.0, 12), circle(10.0, 5.0, 13)];
        let err = loft_sections(&sections, &EndCap::Flat, &EndCap::Flat, Tolerance::default());
        assert!(matches!(err, Err(KernelError::SectionMismatch { index: 1, .. })));
    }

    #[test]
    fn single_section_rejected() {
        let err = loft_sections(
            &[circle(1.0, 0.0, 8)],
            &EndCap::Flat,
            &EndCap::Flat,
            Tolerance::default(),
        );
        assert!(matches!(err, Err(KernelError::TooFewSections { .. })));
    }

    #[test]
    fn coincident_points_rejected() {
        let mut s = circle(10.0, 0.0, 8);
        s.points[3] = s.points[2];
        let sections = vec![s, circle(10.0, 5.0, 8)];
        let err = loft_sections(&sections, &EndCap::Flat, &EndCap::Flat, Tolerance::default());
        assert!(matches!(err, Err(KernelError::Degenerate(_))));
    }
}
