//! Oriented planes for mirroring and seam cuts.

use nalgebra::{Point3, Unit, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    /// Lateral axis.
    X,
    /// Front/back axis.
    Y,
    /// Vertical axis.
    Z,
}

impl Axis {
    /// Index into `[x, y, z]` arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Unit vector along the axis.
    #[must_use]
    pub fn unit(self) -> Unit<Vector3<f64>> {
        match self {
            Self::X => Vector3::x_axis(),
            Self::Y => Vector3::y_axis(),
            Self::Z => Vector3::z_axis(),
        }
    }

    /// Component of a point along the axis.
    #[must_use]
    pub fn coord(self, p: &Point3<f64>) -> f64 {
        p[self.index()]
    }
}

/// An oriented plane: the set of points `p` with `(p - origin) · normal = 0`.
///
/// The normal points into the positive half-space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Plane {
    /// A point on the plane.
    pub origin: Point3<f64>,
    /// Unit normal.
    pub normal: Unit<Vector3<f64>>,
}

impl Plane {
    /// Create a plane through `origin` with the given normal.
    #[must_use]
    pub const fn new(origin: Point3<f64>, normal: Unit<Vector3<f64>>) -> Self {
        Self { origin, normal }
    }

    /// The body's mid-sagittal plane, `x = 0`, normal towards the wearer's left.
    #[must_use]
    pub fn mid_sagittal() -> Self {
        Self::new(Point3::origin(), Vector3::x_axis())
    }

    /// Axis-aligned plane at `offset` along `axis`.
    #[must_use]
    pub fn axis_aligned(axis: Axis, offset: f64) -> Self {
        let mut origin = Point3::origin();
        origin[axis.index()] = offset;
        Self::new(origin, axis.unit())
    }

    /// Signed distance from the plane, positive on the normal side.
    #[must_use]
    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        (p - self.origin).dot(&self.normal.into_inner())
    }

    /// Plane moved along its normal.
    #[must_use]
    pub fn shifted(&self, distance: f64) -> Self {
        Self::new(self.origin + self.normal.into_inner() * distance, self.normal)
    }

    /// Orthogonal projection of a point onto the plane.
    #[must_use]
    pub fn project(&self, p: &Point3<f64>) -> Point3<f64> {
        p - self.normal.into_inner() * self.signed_distance(p)
    }

    /// Reflect a point through the plane.
    ///
    /// For the mid-sagittal plane this only negates `x`, so it is exact.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn reflect_point(&self, p: &Point3<f64>) -> Point3<f64> {
        if let Some(axis) = self.axis_normal() {
            let i = axis.index();
            let mut q = *p;
            q[i] = if self.origin[i] == 0.0 {
                -p[i]
            } else {
                2.0 * self.origin[i] - p[i]
            };
            return q;
        }
        p - self.normal.into_inner() * (2.0 * self.signed_distance(p))
    }

    /// Reflect a direction through the plane.
    #[must_use]
    pub fn reflect_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        if let Some(axis) = self.axis_normal() {
            let mut w = *v;
            w[axis.index()] = -v[axis.index()];
            return w;
        }
        let n = self.normal.into_inner();
        v - n * (2.0 * v.dot(&n))
    }

    /// The mirror image of this plane through another plane.
    #[must_use]
    pub fn reflected(&self, mirror: &Self) -> Self {
        let normal = Unit::new_normalize(mirror.reflect_vector(&self.normal.into_inner()));
        Self::new(mirror.reflect_point(&self.origin), normal)
    }

    /// Orthonormal in-plane basis `(u, v)` with `u × v = normal`.
    #[must_use]
    pub fn basis(&self) -> (Vector3<f64>, Vector3<f64>) {
        let n = self.normal.into_inner();
        let helper = if n.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        let u = (helper - n * helper.dot(&n)).normalize();
        let v = n.cross(&u);
        (u, v)
    }

    /// The axis this plane's normal is aligned with (either sign), if any.
    #[allow(clippy::float_cmp)]
    fn axis_normal(&self) -> Option<Axis> {
        let n = self.normal.into_inner();
        [Axis::X, Axis::Y, Axis::Z].into_iter().find(|axis| {
            let i = axis.index();
            n[i].abs() == 1.0 && (0..3).all(|j| j == i || n[j] == 0.0)
        })
    }
}
