//! Planar cross-sections: loops of a cut, their 2D frame and region layout.

#![allow(clippy::many_single_char_names)]

use armor_types::{Plane, Point3, Vector3};
use nalgebra::{Point2, Vector2};

/// An orthonormal frame on a cut plane.
///
/// `u × v = normal`, so polygons that are counter-clockwise in `(u, v)`
/// coordinates face along `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapFrame {
    /// Frame origin, on the plane.
    pub origin: Point3<f64>,
    /// First in-plane axis.
    pub u: Vector3<f64>,
    /// Second in-plane axis.
    pub v: Vector3<f64>,
    /// Facing direction.
    pub normal: Vector3<f64>,
}

impl CapFrame {
    /// Frame facing along the plane normal.
    #[must_use]
    pub fn new(plane: &Plane) -> Self {
        let (u, v) = plane.basis();
        Self {
            origin: plane.origin,
            u,
            v,
            normal: plane.normal.into_inner(),
        }
    }

    /// The same plane, facing the other way.
    #[must_use]
    pub fn flipped(&self) -> Self {
        Self {
            origin: self.origin,
            u: self.v,
            v: self.u,
            normal: -self.normal,
        }
    }

    /// Plane coordinates of a point.
    #[must_use]
    pub fn to_2d(&self, p: &Point3<f64>) -> Point2<f64> {
        let d = p - self.origin;
        Point2::new(d.dot(&self.u), d.dot(&self.v))
    }

    /// Point on the plane at the given coordinates.
    #[must_use]
    pub fn to_3d(&self, q: &Point2<f64>) -> Point3<f64> {
        self.origin + self.u * q.x + self.v * q.y
    }

    /// In-plane components of a direction.
    #[must_use]
    pub fn direction_2d(&self, d: &Vector3<f64>) -> Vector2<f64> {
        Vector2::new(d.dot(&self.u), d.dot(&self.v))
    }

    /// Direction in space for plane components.
    #[must_use]
    pub fn direction_3d(&self, d: &Vector2<f64>) -> Vector3<f64> {
        self.u * d.x + self.v * d.y
    }
}

/// One closed loop of a cross-section.
///
/// Outer boundaries run counter-clockwise in the section frame, holes
/// clockwise, so material is always on the left.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionLoop {
    /// Mesh vertex indices of the loop, when it came from a cut.
    pub vertices: Vec<u32>,
    /// Loop points in frame coordinates.
    pub points: Vec<Point2<f64>>,
}

impl SectionLoop {
    /// Signed area; positive for outer boundaries.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        polygon_signed_area(&self.points)
    }

    /// Whether this loop bounds material from outside.
    #[must_use]
    pub fn is_outer(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Loop length.
    #[must_use]
    pub fn perimeter(&self) -> f64 {
        self.segments().map(|(a, b)| (b - a).norm()).sum()
    }

    /// Whether a point lies inside the loop (ignoring orientation).
    #[must_use]
    pub fn contains(&self, p: &Point2<f64>) -> bool {
        point_in_polygon(p, &self.points)
    }

    /// Distance from a point to the loop.
    #[must_use]
    pub fn distance_to(&self, p: &Point2<f64>) -> f64 {
        self.segments()
            .map(|(a, b)| point_segment_distance(p, a, b))
            .fold(f64::INFINITY, f64::min)
    }

    /// Consecutive point pairs, closing the loop.
    pub fn segments(&self) -> impl Iterator<Item = (&Point2<f64>, &Point2<f64>)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (&self.points[i], &self.points[(i + 1) % n]))
    }

    /// Unit tangent at point `i` (central difference).
    #[must_use]
    pub fn tangent(&self, i: usize) -> Vector2<f64> {
        let n = self.points.len();
        let d = self.points[(i + 1) % n] - self.points[(i + n - 1) % n];
        let len = d.norm();
        if len > 0.0 { d / len } else { Vector2::x() }
    }

    /// Unit normal at point `i` pointing into the material.
    #[must_use]
    pub fn inward_normal(&self, i: usize) -> Vector2<f64> {
        let t = self.tangent(i);
        Vector2::new(-t.y, t.x)
    }
}

/// An outer loop and the holes it contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRegion {
    /// Index of the outer loop.
    pub outer: usize,
    /// Indices of hole loops.
    pub holes: Vec<usize>,
}

/// A planar cross-section of a solid.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossSection {
    /// Frame the loops are expressed in.
    pub frame: CapFrame,
    /// Section loops.
    pub loops: Vec<SectionLoop>,
}

impl CrossSection {
    /// Net enclosed area.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.loops.iter().map(SectionLoop::signed_area).sum()
    }

    /// Group loops into regions, assigning each hole to the smallest outer
    /// loop containing it.
    #[must_use]
    pub fn regions(&self) -> Vec<SectionRegion> {
        let mut regions: Vec<SectionRegion> = self
            .loops
            .iter()
            .enumerate()
            .filter(|(_, l)| l.is_outer())
            .map(|(outer, _)| SectionRegion {
                outer,
                holes: Vec::new(),
            })
            .collect();

        for (i, hole) in self.loops.iter().enumerate() {
            if hole.is_outer() || hole.points.is_empty() {
                continue;
            }
            let probe = hole.points[0];
            let owner = regions
                .iter_mut()
                .filter(|r| self.loops[r.outer].contains(&probe))
                .min_by(|a, b| {
                    self.loops[a.outer]
                        .signed_area()
                        .total_cmp(&self.loops[b.outer].signed_area())
                });
            if let Some(region) = owner {
                region.holes.push(i);
            }
        }
        regions
    }

    /// Index into [`CrossSection::regions`] of the region whose material
    /// contains `p`.
    #[must_use]
    pub fn region_containing(&self, regions: &[SectionRegion], p: &Point2<f64>) -> Option<usize> {
        regions.iter().position(|r| {
            self.loops[r.outer].contains(p) && r.holes.iter().all(|&h| !self.loops[h].contains(p))
        })
    }

    /// Whether a convex polygon lies inside the material with at least
    /// `margin` to every loop.
    #[must_use]
    pub fn fits(&self, polygon: &[Point2<f64>], margin: f64) -> bool {
        let regions = self.regions();
        let Some(first) = polygon.first() else {
            return false;
        };
        let Some(region) = self.region_containing(&regions, first) else {
            return false;
        };
        if polygon
            .iter()
            .any(|p| self.region_containing(&regions, p) != Some(region))
        {
            return false;
        }
        let n = polygon.len();
        for l in &self.loops {
            for (a, b) in l.segments() {
                for i in 0..n {
                    if segments_intersect(&polygon[i], &polygon[(i + 1) % n], a, b) {
                        return false;
                    }
                }
            }
            // A whole hole could sit inside the polygon without crossing it.
            if l.points.first().is_some_and(|p| point_in_polygon(p, polygon)) {
                return false;
            }
            if polygon.iter().any(|p| l.distance_to(p) < margin) {
                return false;
            }
        }
        true
    }

    /// Width of material along the inward normal at point `i` of loop `l`.
    #[must_use]
    pub fn inward_width(&self, l: usize, i: usize) -> Option<f64> {
        let lp = &self.loops[l];
        let origin = lp.points[i];
        let dir = lp.inward_normal(i);
        let n = lp.points.len();
        self.loops
            .iter()
            .enumerate()
            .flat_map(|(li, other)| {
                other.segments().enumerate().filter_map(move |(si, (a, b))| {
                    // Skip the two segments meeting at the ray origin.
                    let own = li == l && (si == i || (si + 1) % n == i);
                    if own {
                        None
                    } else {
                        ray_segment_hit(&origin, &dir, a, b)
                    }
                })
            })
            .filter(|t| *t > 0.0)
            .min_by(f64::total_cmp)
    }
}

/// Signed area of a polygon (shoelace).
#[must_use]
pub fn polygon_signed_area(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    let mut twice = 0.0;
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        twice += a.x.mul_add(b.y, -(b.x * a.y));
    }
    twice * 0.5
}

/// Even-odd point in polygon test.
#[must_use]
pub fn point_in_polygon(p: &Point2<f64>, polygon: &[Point2<f64>]) -> bool {
    let n = polygon.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let a = &polygon[i];
        let b = &polygon[j];
        if (a.y > p.y) != (b.y > p.y) {
            let x = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn cross2(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x.mul_add(b.y, -(a.y * b.x))
}

/// Whether segments `p1..p2` and `q1..q2` properly cross.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn segments_intersect(
    p1: &Point2<f64>,
    p2: &Point2<f64>,
    q1: &Point2<f64>,
    q2: &Point2<f64>,
) -> bool {
    let r = p2 - p1;
    let s = q2 - q1;
    let d1 = cross2(&r, &(q1 - p1));
    let d2 = cross2(&r, &(q2 - p1));
    let d3 = cross2(&s, &(p1 - q1));
    let d4 = cross2(&s, &(p2 - q1));
    (d1 > 0.0) != (d2 > 0.0) && (d3 > 0.0) != (d4 > 0.0) && d1 != 0.0 && d3 != 0.0
}

/// Distance from a point to a segment.
#[must_use]
pub fn point_segment_distance(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Ray parameter where `origin + t * dir` crosses segment `a..b`.
#[must_use]
pub fn ray_segment_hit(
    origin: &Point2<f64>,
    dir: &Vector2<f64>,
    a: &Point2<f64>,
    b: &Point2<f64>,
) -> Option<f64> {
    let s = b - a;
    let denom = cross2(dir, &s);
    if denom.abs() < 1e-15 {
        return None;
    }
    let w = a - origin;
    let t = cross2(&w, &s) / denom;
    let u = cross2(&w, dir) / denom;
    ((0.0..=1.0).contains(&u) && t >= 0.0).then_some(t)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use armor_types::Axis;

    fn square(x0: f64, y0: f64, size: f64, ccw: bool) -> SectionLoop {
        let mut points = vec![
            Point2::new(x0, y0),
            Point2::new(x0 + size, y0),
            Point2::new(x0 + size, y0 + size),
            Point2::new(x0, y0 + size),
        ];
        if !ccw {
            points.reverse();
        }
        SectionLoop {
            vertices: Vec::new(),
            points,
        }
    }

    fn frame() -> CapFrame {
        CapFrame::new(&Plane::axis_aligned(Axis::Z, 0.0))
    }

    #[test]
    fn frame_round_trip_and_handedness() {
        let f = frame();
        assert_relative_eq!(f.u.cross(&f.v), f.normal, epsilon = 1e-12);
        let g = f.flipped();
        assert_relative_eq!(g.u.cross(&g.v), g.normal, epsilon = 1e-12);
        let p = Point3::new(3.0, -2.0, 0.0);
        assert_relative_eq!(f.to_3d(&f.to_2d(&p)), p, epsilon = 1e-12);
    }

    #[test]
    fn annulus_regions() {
        let section = CrossSection {
            frame: frame(),
            loops: vec![square(2.0, 2.0, 6.0, false), square(0.0, 0.0, 10.0, true)],
        };
        let regions = section.regions();
        assert_eq!(regions, vec![SectionRegion { outer: 1, holes: vec![0] }]);
        assert_relative_eq!(section.area(), 100.0 - 36.0);
    }

    #[test]
    fn fits_in_wall_but_not_across_hole() {
        let section = CrossSection {
            frame: frame(),
            loops: vec![square(0.0, 0.0, 10.0, true), square(2.0, 2.0, 6.0, false)],
        };
        let small = [
            Point2::new(0.5, 4.0),
            Point2::new(1.5, 4.0),
            Point2::new(1.5, 6.0),
            Point2::new(0.5, 6.0),
        ];
        assert!(section.fits(&small, 0.2));
        assert!(!section.fits(&small, 0.8));
        let wide = [
            Point2::new(0.5, 4.0),
            Point2::new(3.0, 4.0),
            Point2::new(3.0, 6.0),
            Point2::new(0.5, 6.0),
        ];
        assert!(!section.fits(&wide, 0.0));
    }

    #[test]
    fn width_of_wall_strip() {
        let section = CrossSection {
            frame: frame(),
            loops: vec![square(0.0, 0.0, 10.0, true), square(2.0, 2.0, 6.0, false)],
        };
        // The corner normal points diagonally at the hole's nearest corner.
        let width = section.inward_width(0, 1).unwrap();
        assert!(width > 2.0 && width < 3.0);
    }

    #[test]
    fn polygon_helpers() {
        let sq = square(0.0, 0.0, 2.0, true);
        assert_relative_eq!(sq.signed_area(), 4.0);
        assert_relative_eq!(sq.perimeter(), 8.0);
        assert!(sq.contains(&Point2::new(1.0, 1.0)));
        assert!(!sq.contains(&Point2::new(3.0, 1.0)));
        assert_relative_eq!(sq.distance_to(&Point2::new(1.0, 1.5)), 0.5);
        assert!(segments_intersect(
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 2.0),
            &Point2::new(0.0, 2.0),
            &Point2::new(2.0, 0.0)
        ));
        let hit = ray_segment_hit(
            &Point2::new(0.0, 0.0),
            &Vector2::new(1.0, 0.0),
            &Point2::new(3.0, -1.0),
            &Point2::new(3.0, 1.0),
        );
        assert_relative_eq!(hit.unwrap(), 3.0);
    }
}
