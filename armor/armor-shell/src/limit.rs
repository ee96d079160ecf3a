//! Inscribed-ball limiting and smoothing of the offset distance field.

use armor_kernel::{Bvh, EdgeAdjacency};
use armor_types::{Aabb, Point3, SolidMesh, Vector3};
use rayon::prelude::*;

/// Largest inward ball radius at each vertex, capped at `thickness`.
///
/// A ball of radius `r` tangent to the surface at `p` (centre `p - r n`)
/// passes through another vertex `x` when
/// `r = |p - x|^2 / (2 n.(p - x))`. The smallest such radius over all
/// vertices in front of `p` is the discrete inscribed-ball limit. Only
/// vertices within `2 * thickness` can bring it below the cap.
#[must_use]
pub fn ball_limits(surface: &SolidMesh, normals: &[Vector3<f64>], thickness: f64) -> Vec<f64> {
    let bvh = Bvh::build(surface, 8);
    let reach = 2.0 * thickness;

    surface
        .vertices
        .par_iter()
        .enumerate()
        .map(|(i, p)| {
            let n = normals[i];
            if n.norm_squared() == 0.0 {
                return thickness;
            }
            let probe = Aabb::new(*p, *p).padded(reach);
            let mut limit = thickness;
            for face in bvh.query(&probe, 0.0) {
                for &v in &surface.faces[face as usize] {
                    if v as usize == i {
                        continue;
                    }
                    limit = limit.min(ball_radius(p, &n, &surface.vertices[v as usize]));
                }
            }
            limit
        })
        .collect()
}

/// Radius of the inward ball tangent at `p` that passes through `x`.
///
/// Infinite when `x` does not lie in front of the tangent plane.
#[must_use]
pub fn ball_radius(p: &Point3<f64>, normal: &Vector3<f64>, x: &Point3<f64>) -> f64 {
    let d = p - x;
    let height = normal.dot(&d);
    let dist2 = d.norm_squared();
    if height <= 1e-9 * dist2.sqrt() || dist2 == 0.0 {
        return f64::INFINITY;
    }
    dist2 / (2.0 * height)
}

/// Lower values so neighbouring distances differ by at most `lipschitz`
/// times their edge length. Values never increase.
///
/// Returns the number of sweeps used.
pub fn lipschitz_smooth(surface: &SolidMesh, distances: &mut [f64], lipschitz: f64) -> usize {
    let neighbors = EdgeAdjacency::build(surface).vertex_neighbors(surface.vertex_count());
    let max_sweeps = surface.vertex_count().max(1);

    for sweep in 1..=max_sweeps {
        let mut changed = false;
        for (i, ring) in neighbors.iter().enumerate() {
            let p = surface.vertices[i];
            for &j in ring {
                let bound = distances[j as usize]
                    + lipschitz * (surface.vertices[j as usize] - p).norm();
                if bound < distances[i] - 1e-12 {
                    distances[i] = bound;
                    changed = true;
                }
            }
        }
        if !changed {
            return sweep;
        }
    }
    max_sweeps
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use armor_kernel::{EndCap, Section, Tolerance, loft_sections, vertex_normals};
    use armor_types::SurfaceRegion;
    use std::f64::consts::TAU;

    #[allow(clippy::cast_precision_loss)]
    fn tube(radius: f64, samples: usize) -> SolidMesh {
        let sections: Vec<Section> = (0..6)
            .map(|j| {
                let z = f64::from(j) * 10.0;
                Section::new(
                    (0..samples)
                        .map(|i| {
                            let a = TAU * i as f64 / samples as f64;
                            Point3::new(radius * a.cos(), radius * a.sin(), z)
                        })
                        .collect(),
                )
            })
            .collect();
        loft_sections(&sections, &EndCap::Open, &EndCap::Open, Tolerance::default()).unwrap()
    }

    #[test]
    fn ball_through_point_on_circle() {
        let p = Point3::new(5.0, 0.0, 0.0);
        let x = Point3::new(0.0, 5.0, 0.0);
        assert_relative_eq!(ball_radius(&p, &Vector3::x(), &x), 5.0);
        assert!(ball_radius(&p, &Vector3::x(), &Point3::new(6.0, 1.0, 0.0)).is_infinite());
    }

    #[test]
    fn tight_tube_limits_every_vertex() {
        let surface = tube(3.0, 48).without_regions(&[SurfaceRegion::Opening]);
        let normals = vertex_normals(&surface);
        let limits = ball_limits(&surface, &normals, 8.0);
        for &r in &limits {
            assert!(r < 3.1 && r > 2.9, "limit {r}");
        }
    }

    #[test]
    fn wide_tube_keeps_thickness() {
        let surface = tube(40.0, 48).without_regions(&[SurfaceRegion::Opening]);
        let normals = vertex_normals(&surface);
        let limits = ball_limits(&surface, &normals, 4.0);
        assert!(limits.iter().all(|&r| (r - 4.0).abs() < 1e-12));
    }

    #[test]
    fn smoothing_only_lowers() {
        let surface = tube(40.0, 24).without_regions(&[SurfaceRegion::Opening]);
        let mut d = vec![4.0; surface.vertex_count()];
        d[0] = 1.0;
        let sweeps = lipschitz_smooth(&surface, &mut d, 0.1);
        assert!(sweeps >= 1);
        assert_relative_eq!(d[0], 1.0);
        assert!(d.iter().all(|&x| (1.0..=4.0).contains(&x)));

        let neighbors = EdgeAdjacency::build(&surface).vertex_neighbors(surface.vertex_count());
        for (i, ring) in neighbors.iter().enumerate() {
            for &j in ring {
                let edge = (surface.vertices[i] - surface.vertices[j as usize]).norm();
                assert!(d[i] <= d[j as usize] + 0.1 * edge + 1e-9);
            }
        }
        assert!(d.iter().filter(|&&x| x < 4.0).count() > 1);
    }
}
