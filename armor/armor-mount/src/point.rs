//! Mount points and their seat features.

use armor_kernel::CapFrame;
use armor_template::MountStyle;
use armor_types::{Plane, Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Size of the recess carved for a strap seat.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SeatFeature {
    /// Extent along the strap.
    pub length: f64,
    /// Extent across the strap.
    pub width: f64,
    /// Recess depth into the wall.
    pub depth: f64,
}

impl SeatFeature {
    /// Every dimension multiplied by `factor`.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            length: self.length * factor,
            width: self.width * factor,
            depth: self.depth * factor,
        }
    }
}

/// A strap attachment on a piece's exterior.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MountPoint {
    /// Piece-local id, e.g. `chin_strap_l`.
    pub id: String,
    /// Hardware style.
    pub style: MountStyle,
    /// Seat centre on the exterior surface.
    pub position: Point3<f64>,
    /// Unit outward normal.
    pub normal: Vector3<f64>,
    /// Unit strap direction, tangent to the surface.
    pub strap_dir: Vector3<f64>,
    /// Strap width.
    pub strap_width: f64,
    /// Carved seat.
    pub seat: SeatFeature,
    /// Name of the (sub-)piece carrying the mount.
    pub owner: String,
}

impl MountPoint {
    /// Unit direction across the strap, in the tangent plane.
    #[must_use]
    pub fn cross_dir(&self) -> Vector3<f64> {
        self.normal.cross(&self.strap_dir)
    }

    /// Coordinates of a point in the seat frame: along the strap, across
    /// the strap, and height above the tangent plane.
    #[must_use]
    pub fn local(&self, p: &Point3<f64>) -> (f64, f64, f64) {
        let d = p - self.position;
        (
            d.dot(&self.strap_dir),
            d.dot(&self.cross_dir()),
            d.dot(&self.normal),
        )
    }

    /// Seat frame on the tangent plane: along the strap, across it, and out
    /// of the surface.
    #[must_use]
    pub fn frame(&self) -> CapFrame {
        CapFrame {
            origin: self.position,
            u: self.strap_dir,
            v: self.cross_dir(),
            normal: self.normal,
        }
    }

    /// Corners of the seat rectangle in the tangent plane.
    #[must_use]
    pub fn footprint(&self) -> [Point3<f64>; 4] {
        let a = self.strap_dir * (self.seat.length * 0.5);
        let b = self.cross_dir() * (self.seat.width * 0.5);
        let c = self.position;
        [c - a - b, c + a - b, c + a + b, c - a + b]
    }

    /// The seat footprint extended down to the recess floor.
    #[must_use]
    pub fn footprint_volume(&self) -> [Point3<f64>; 8] {
        let top = self.footprint();
        let down = self.normal * self.seat.depth;
        [
            top[0],
            top[1],
            top[2],
            top[3],
            top[0] - down,
            top[1] - down,
            top[2] - down,
            top[3] - down,
        ]
    }

    /// Same mount with a different owner.
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    /// Mirror image through a plane.
    ///
    /// Left and right suffixes of the id swap.
    #[must_use]
    pub fn mirrored(&self, plane: &Plane) -> Self {
        Self {
            id: swap_side(&self.id),
            style: self.style,
            position: plane.reflect_point(&self.position),
            normal: plane.reflect_vector(&self.normal),
            strap_dir: plane.reflect_vector(&self.strap_dir),
            strap_width: self.strap_width,
            seat: self.seat,
            owner: self.owner.clone(),
        }
    }
}

/// Swap a trailing `_l`/`_r` side suffix.
#[must_use]
pub fn swap_side(id: &str) -> String {
    if let Some(stem) = id.strip_suffix("_l") {
        format!("{stem}_r")
    } else if let Some(stem) = id.strip_suffix("_r") {
        format!("{stem}_l")
    } else {
        id.to_string()
    }
}

/// Rename a piece-prefixed name for its mirrored counterpart.
///
/// `greave_left_calf` becomes `greave_right_calf` when mirroring
/// `greave_left` into `greave_right`.
#[must_use]
pub fn rename_owner(owner: &str, from: &str, to: &str) -> String {
    owner
        .strip_prefix(from)
        .map_or_else(|| owner.to_string(), |rest| format!("{to}{rest}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mount() -> MountPoint {
        MountPoint {
            id: "chin_strap_l".to_string(),
            style: MountStyle::Buckle,
            position: Point3::new(50.0, 10.0, 100.0),
            normal: Vector3::x(),
            strap_dir: Vector3::z(),
            strap_width: 20.0,
            seat: SeatFeature {
                length: 32.0,
                width: 26.0,
                depth: 1.4,
            },
            owner: "helmet".to_string(),
        }
    }

    #[test]
    fn seat_frame() {
        let m = mount();
        assert_relative_eq!(m.cross_dir(), -Vector3::y());
        let (a, b, h) = m.local(&Point3::new(49.0, 5.0, 110.0));
        assert_relative_eq!(a, 10.0);
        assert_relative_eq!(b, 5.0);
        assert_relative_eq!(h, -1.0);

        let corners = m.footprint();
        assert_relative_eq!(corners[0], Point3::new(50.0, 23.0, 84.0));
        assert_relative_eq!(corners[2], Point3::new(50.0, -3.0, 116.0));
        assert_relative_eq!(m.footprint_volume()[4].x, 48.6);

        let frame = m.frame();
        assert_relative_eq!(frame.u.cross(&frame.v), frame.normal);
        assert_relative_eq!(frame.to_2d(&Point3::new(50.0, 5.0, 110.0)), nalgebra::Point2::new(10.0, 5.0));
    }

    #[test]
    fn mirroring_swaps_sides() {
        let m = mount().mirrored(&Plane::mid_sagittal());
        assert_eq!(m.id, "chin_strap_r");
        assert_relative_eq!(m.position, Point3::new(-50.0, 10.0, 100.0));
        assert_relative_eq!(m.normal, -Vector3::x());
        assert_relative_eq!(m.strap_dir, Vector3::z());
        assert_eq!(m.mirrored(&Plane::mid_sagittal()), mount());
    }

    #[test]
    fn side_suffixes() {
        assert_eq!(swap_side("side_buckle_upper_r"), "side_buckle_upper_l");
        assert_eq!(swap_side("knee_buckle"), "knee_buckle");
        assert_eq!(
            rename_owner("greave_left_calf", "greave_left", "greave_right"),
            "greave_right_calf"
        );
        assert_eq!(rename_owner("helmet", "greave_left", "greave_right"), "helmet");
    }

    #[test]
    fn half_size_seat() {
        let seat = mount().seat.scaled(0.5);
        assert_relative_eq!(seat.length, 16.0);
        assert_relative_eq!(seat.depth, 0.7);
    }
}
