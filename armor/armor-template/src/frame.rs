//! Piece-local coordinate frames.

use armor_types::{Axis, Plane, Point3, Vector3};

/// Placement of a piece on the body.
///
/// Local coordinates `(u, v, w)` map to `origin + u*eu + v*ev + w*ew`, where
/// `ew` is the piece axis. `eu` is always the body's +X axis, so every piece
/// is symmetric about the plane `x = origin.x` when its sections are.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieceFrame {
    /// Local origin in body coordinates.
    pub origin: Point3<f64>,
    /// First radial axis.
    pub eu: Vector3<f64>,
    /// Second radial axis.
    pub ev: Vector3<f64>,
    /// Piece axis.
    pub ew: Vector3<f64>,
}

impl PieceFrame {
    /// Frame whose axis points up the body.
    #[must_use]
    pub fn upright(origin: Point3<f64>) -> Self {
        Self {
            origin,
            eu: Vector3::x(),
            ev: Vector3::y(),
            ew: Vector3::z(),
        }
    }

    /// Frame whose axis points down the body (hands).
    #[must_use]
    pub fn hanging(origin: Point3<f64>) -> Self {
        Self {
            origin,
            eu: Vector3::x(),
            ev: Vector3::y(),
            ew: -Vector3::z(),
        }
    }

    /// Frame whose axis points forward (feet). `ev` is up.
    #[must_use]
    pub fn forward(origin: Point3<f64>) -> Self {
        Self {
            origin,
            eu: Vector3::x(),
            ev: Vector3::z(),
            ew: Vector3::y(),
        }
    }

    /// Body coordinates of a local point.
    #[must_use]
    pub fn to_world(&self, u: f64, v: f64, w: f64) -> Point3<f64> {
        self.origin + self.eu * u + self.ev * v + self.ew * w
    }

    /// Radial direction at `angle` in the section plane.
    #[must_use]
    pub fn radial(&self, angle: f64) -> Vector3<f64> {
        let (s, c) = angle.sin_cos();
        self.eu * c + self.ev * s
    }

    /// Tangent direction around the axis at `angle`.
    #[must_use]
    pub fn around(&self, angle: f64) -> Vector3<f64> {
        let (s, c) = angle.sin_cos();
        self.ev * c - self.eu * s
    }

    /// The piece's own plane of symmetry, `x = origin.x`.
    #[must_use]
    pub fn symmetry_plane(&self) -> Plane {
        Plane::axis_aligned(Axis::X, self.origin.x)
    }

    /// Copy with the origin scaled about the body origin.
    #[must_use]
    pub fn scaled(mut self, factor: f64) -> Self {
        self.origin = Point3::from(self.origin.coords * factor);
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn forward_frame_maps_axis_to_y() {
        let frame = PieceFrame::forward(Point3::new(100.0, -50.0, 0.0));
        let p = frame.to_world(1.0, 2.0, 3.0);
        assert_relative_eq!(p, Point3::new(101.0, -47.0, 2.0));
    }

    #[test]
    fn radial_and_around_are_orthogonal() {
        let frame = PieceFrame::hanging(Point3::origin());
        for angle in [0.0, 0.7, FRAC_PI_2, 3.0] {
            let r = frame.radial(angle);
            let t = frame.around(angle);
            assert_relative_eq!(r.dot(&t), 0.0, epsilon = 1e-12);
            assert_relative_eq!(t.dot(&frame.ew), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn symmetry_plane_through_origin() {
        let frame = PieceFrame::upright(Point3::new(230.0, 0.0, 1400.0));
        let plane = frame.symmetry_plane();
        let p = frame.to_world(30.0, 5.0, 10.0);
        let q = plane.reflect_point(&p);
        assert_relative_eq!(q, frame.to_world(-30.0, 5.0, 10.0), epsilon = 1e-9);
    }
}
