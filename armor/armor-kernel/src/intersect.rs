//! Ray, segment and triangle primitives.

// Allow this pattern - it's correct for barycentric coordinate determinant calculation
#![allow(clippy::suspicious_operation_groupings)]
#![allow(clippy::many_single_char_names)]

use nalgebra::{Point3, Vector3};

/// Ray-triangle intersection using the Möller-Trumbore algorithm.
///
/// Returns the ray parameter `t > epsilon` of the hit, so the intersection
/// point is `origin + t * direction`.
#[must_use]
pub fn ray_triangle_intersect(
    origin: &Point3<f64>,
    direction: &Vector3<f64>,
    v0: &Point3<f64>,
    v1: &Point3<f64>,
    v2: &Point3<f64>,
    epsilon: f64,
) -> Option<f64> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = direction.cross(&edge2);
    let a = edge1.dot(&h);

    // Ray is parallel to triangle
    if a.abs() < epsilon {
        return None;
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = f * direction.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(&q);
    (t > epsilon).then_some(t)
}

/// Whether the open segment `e0..e1` crosses the interior of a triangle.
///
/// Touching contacts (hits on the triangle boundary or at the segment
/// endpoints, within `epsilon` in barycentric terms) do not count. This is
/// the right notion for self-intersection checks, where neighbouring faces
/// legitimately touch.
#[must_use]
pub fn segment_crosses_triangle(
    e0: &Point3<f64>,
    e1: &Point3<f64>,
    v0: &Point3<f64>,
    v1: &Point3<f64>,
    v2: &Point3<f64>,
    epsilon: f64,
) -> bool {
    let direction = e1 - e0;
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = direction.cross(&edge2);
    let a = edge1.dot(&h);

    let scale = direction.norm() * edge1.norm() * edge2.norm();
    if scale == 0.0 || a.abs() <= 1e-12 * scale {
        return false;
    }

    let f = 1.0 / a;
    let s = e0 - v0;
    let u = f * s.dot(&h);
    if u <= epsilon || u >= 1.0 - epsilon {
        return false;
    }

    let q = s.cross(&edge1);
    let v = f * direction.dot(&q);
    if v <= epsilon || u + v >= 1.0 - epsilon {
        return false;
    }

    let t = f * edge2.dot(&q);
    t > epsilon && t < 1.0 - epsilon
}

/// Test if two triangles intersect, ignoring touching contacts.
///
/// Uses segment-triangle tests on all 6 edges (3 from each triangle).
#[must_use]
pub fn triangles_intersect(a: &[Point3<f64>; 3], b: &[Point3<f64>; 3], epsilon: f64) -> bool {
    let edges = [(0, 1), (1, 2), (2, 0)];
    edges
        .iter()
        .any(|&(i, j)| segment_crosses_triangle(&a[i], &a[j], &b[0], &b[1], &b[2], epsilon))
        || edges
            .iter()
            .any(|&(i, j)| segment_crosses_triangle(&b[i], &b[j], &a[0], &a[1], &a[2], epsilon))
}

/// Compute the closest point on a triangle to a query point.
///
/// This implements the algorithm from "Real-Time Collision Detection" by Christer Ericson.
#[must_use]
pub fn closest_point_on_triangle(
    point: &Point3<f64>,
    v0: &Point3<f64>,
    v1: &Point3<f64>,
    v2: &Point3<f64>,
) -> Point3<f64> {
    let ab = v1 - v0;
    let ac = v2 - v0;
    let ap = point - v0;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);

    // Vertex region outside A
    if d1 <= 0.0 && d2 <= 0.0 {
        return *v0;
    }

    let bp = point - v1;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);

    // Vertex region outside B
    if d3 >= 0.0 && d4 <= d3 {
        return *v1;
    }

    // Edge region of AB
    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return v0 + ab * v;
    }

    let cp = point - v2;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);

    // Vertex region outside C
    if d6 >= 0.0 && d5 <= d6 {
        return *v2;
    }

    // Edge region of AC
    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return v0 + ac * w;
    }

    // Edge region of BC
    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return v1 + (v2 - v1) * w;
    }

    // Face region
    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;

    v0 + ab * v + ac * w
}

/// Interior angle of a triangle at corner `a`.
#[must_use]
pub fn corner_angle(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;
    let denom = ab.norm() * ac.norm();
    if denom <= 0.0 {
        return 0.0;
    }
    (ab.dot(&ac) / denom).clamp(-1.0, 1.0).acos()
}
