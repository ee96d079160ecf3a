//! Axis-aligned bounding box.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box (AABB).
///
/// # Example
///
/// ```
/// use armor_types::{Aabb, Point3};
///
/// let aabb = Aabb::new(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(10.0, 20.0, 30.0),
/// );
///
/// assert_eq!(aabb.extent(), [10.0, 20.0, 30.0]);
/// assert!(aabb.contains(&Point3::new(5.0, 5.0, 5.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

impl Aabb {
    /// Create a new AABB from two corners, ordering them per axis.
    #[must_use]
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self {
            min: Point3::new(min.x.min(max.x), min.y.min(max.y), min.z.min(max.z)),
            max: Point3::new(min.x.max(max.x), min.y.max(max.y), min.z.max(max.z)),
        }
    }

    /// Create an empty (inverted) AABB, the identity for [`Aabb::expand_point`].
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Bounding box of a set of points.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.expand_point(p);
        }
        aabb
    }

    /// Grow the box to include a point.
    pub fn expand_point(&mut self, p: &Point3<f64>) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Grow the box to include another box.
    pub fn expand(&mut self, other: &Self) {
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
    }

    /// Whether the box contains at least one point.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Size along X, Y and Z.
    #[must_use]
    pub fn extent(&self) -> [f64; 3] {
        if !self.is_valid() {
            return [0.0; 3];
        }
        [
            self.max.x - self.min.x,
            self.max.y - self.min.y,
            self.max.z - self.min.z,
        ]
    }

    /// Size as a vector.
    #[must_use]
    pub fn size(&self) -> Vector3<f64> {
        let [x, y, z] = self.extent();
        Vector3::new(x, y, z)
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Length of the diagonal.
    #[must_use]
    pub fn diagonal(&self) -> f64 {
        self.size().norm()
    }

    /// Check whether a point lies inside or on the box.
    #[must_use]
    pub fn contains(&self, p: &Point3<f64>) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Check overlap with another box, with tolerance.
    #[must_use]
    pub fn intersects(&self, other: &Self, tolerance: f64) -> bool {
        !(self.max.x + tolerance < other.min.x
            || other.max.x + tolerance < self.min.x
            || self.max.y + tolerance < other.min.y
            || other.max.y + tolerance < self.min.y
            || self.max.z + tolerance < other.min.z
            || other.max.z + tolerance < self.min.z)
    }

    /// Box grown by `padding` on every side.
    #[must_use]
    pub fn padded(&self, padding: f64) -> Self {
        let pad = Vector3::repeat(padding);
        Self {
            min: self.min - pad,
            max: self.max + pad,
        }
    }

    /// Whether the box fits inside a build volume of the given size.
    ///
    /// The box may be reoriented by permuting axes, so sorted extents are
    /// compared against the sorted volume.
    #[must_use]
    pub fn fits_within(&self, volume: [f64; 3], tolerance: f64) -> bool {
        let mut ours = self.extent();
        let mut theirs = volume;
        ours.sort_by(f64::total_cmp);
        theirs.sort_by(f64::total_cmp);
        ours.iter().zip(&theirs).all(|(a, b)| *a <= *b + tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn new_orders_corners() {
        let aabb = Aabb::new(Point3::new(5.0, 0.0, 3.0), Point3::new(1.0, 2.0, -1.0));
        assert_relative_eq!(aabb.min.x, 1.0);
        assert_relative_eq!(aabb.max.x, 5.0);
        assert_relative_eq!(aabb.min.z, -1.0);
    }

    #[test]
    fn empty_has_zero_extent() {
        let aabb = Aabb::empty();
        assert!(!aabb.is_valid());
        assert_eq!(aabb.extent(), [0.0; 3]);
    }

    #[test]
    fn from_points_covers_all() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, -2.0, 1.0),
            Point3::new(-1.0, 4.0, 2.0),
        ];
        let aabb = Aabb::from_points(&points);
        assert_eq!(aabb.extent(), [4.0, 6.0, 2.0]);
        assert_relative_eq!(aabb.center().y, 1.0);
    }

    #[test]
    fn fits_within_allows_reorientation() {
        let aabb = Aabb::new(Point3::origin(), Point3::new(300.0, 100.0, 50.0));
        assert!(!aabb.fits_within([256.0, 256.0, 256.0], 0.0));
        assert!(aabb.fits_within([50.0, 320.0, 100.0], 0.0));
    }

    #[test]
    fn padded_grows_every_side() {
        let aabb = Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0)).padded(0.5);
        assert_eq!(aabb.extent(), [2.0, 2.0, 2.0]);
    }
}
