//! Evaluated templates: section rings ready for lofting.

use crate::curve::RingShape;
use crate::frame::PieceFrame;
use armor_kernel::{CapFrame, EndCap, Section, Stencil};
use armor_types::{Point3, Vector3};

/// How one end of a loft is closed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlanCap {
    /// Left open for the body; capped with faces tagged as an opening.
    Opening,
    /// Closed to a point at local `(u, v, w)`.
    Apex {
        /// First radial coordinate.
        u: f64,
        /// Second radial coordinate.
        v: f64,
        /// Axial coordinate.
        w: f64,
    },
}

/// A window cut through the finished wall, such as a visor slit.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanOpening {
    /// Name used in logs.
    pub name: &'static str,
    /// Centre on the template surface.
    pub centre: Point3<f64>,
    /// Unit direction out of the piece; the opening is cut along it.
    pub facing: Vector3<f64>,
    /// Unit direction of the width, perpendicular to `facing`.
    pub across: Vector3<f64>,
    /// Extent along `across`.
    pub width: f64,
    /// Extent perpendicular to `across` and `facing`.
    pub height: f64,
}

impl PlanOpening {
    /// Rectangular stencil of the opening, centred on `centre`.
    #[must_use]
    pub fn stencil(&self) -> Stencil {
        let frame = CapFrame {
            origin: self.centre,
            u: self.across,
            v: self.facing.cross(&self.across),
            normal: self.facing,
        };
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        Stencil::rectangle(frame, [-hw, hw], [-hh, hh])
    }

    fn scaled(&self, factor: f64) -> Self {
        Self {
            centre: Point3::from(self.centre.coords * factor),
            width: self.width * factor,
            height: self.height * factor,
            ..self.clone()
        }
    }
}

/// A template evaluated for one request and one relaxation step.
///
/// Rings are ordered by increasing `w` and already carry the print scale.
#[derive(Debug, Clone, PartialEq)]
pub struct LoftPlan {
    /// Placement on the body.
    pub frame: PieceFrame,
    /// Section rings.
    pub rings: Vec<RingShape>,
    /// Sample angles shared by every ring.
    pub angles: Vec<f64>,
    /// Closure at the first ring.
    pub start: PlanCap,
    /// Closure at the last ring.
    pub end: PlanCap,
    /// Windows cut through the wall after shelling.
    pub openings: Vec<PlanOpening>,
}

impl LoftPlan {
    /// Sampled section rings in body coordinates.
    #[must_use]
    pub fn sections(&self) -> Vec<Section> {
        self.rings
            .iter()
            .map(|ring| {
                let points = self
                    .angles
                    .iter()
                    .map(|&angle| {
                        let (u, v) = ring.point(angle);
                        self.frame.to_world(u, v, ring.w)
                    })
                    .collect();
                Section::new(points)
            })
            .collect()
    }

    /// Kernel end caps `(start, end)`.
    #[must_use]
    pub fn caps(&self) -> (EndCap, EndCap) {
        (self.kernel_cap(self.start), self.kernel_cap(self.end))
    }

    fn kernel_cap(&self, cap: PlanCap) -> EndCap {
        match cap {
            PlanCap::Opening => EndCap::Open,
            PlanCap::Apex { u, v, w } => EndCap::Apex(self.frame.to_world(u, v, w)),
        }
    }

    /// Axial range `(w_min, w_max)` including apexes.
    #[must_use]
    pub fn axial_range(&self) -> (f64, f64) {
        let first = self.rings.first().map_or(0.0, |r| r.w);
        let last = self.rings.last().map_or(0.0, |r| r.w);
        let lo = match self.start {
            PlanCap::Apex { w, .. } => w.min(first),
            PlanCap::Opening => first,
        };
        let hi = match self.end {
            PlanCap::Apex { w, .. } => w.max(last),
            PlanCap::Opening => last,
        };
        (lo, hi)
    }

    /// Axial length of the piece.
    #[must_use]
    pub fn length(&self) -> f64 {
        let (lo, hi) = self.axial_range();
        hi - lo
    }

    /// The ring at a height fraction, interpolated between stations.
    ///
    /// Heights beyond the first or last ring clamp to it.
    #[must_use]
    pub fn ring_at(&self, height: f64) -> Option<RingShape> {
        let (lo, hi) = self.axial_range();
        let w = lo + height.clamp(0.0, 1.0) * (hi - lo);
        let first = self.rings.first()?;
        let last = self.rings.last()?;
        if w <= first.w {
            return Some(first.clone());
        }
        if w >= last.w {
            return Some(last.clone());
        }
        let j = self.rings.partition_point(|r| r.w <= w).max(1);
        let (a, b) = (&self.rings[j - 1], &self.rings[j]);
        let t = (w - a.w) / (b.w - a.w);
        Some(a.lerp(b, t))
    }

    /// Template surface point at a height fraction and angle.
    #[must_use]
    pub fn surface_point(&self, height: f64, angle: f64) -> Option<Point3<f64>> {
        let ring = self.ring_at(height)?;
        let (u, v) = ring.point(angle);
        Some(self.frame.to_world(u, v, ring.w))
    }

    /// Point on the piece axis (the ring centre) at a height fraction.
    #[must_use]
    pub fn axis_point(&self, height: f64) -> Option<Point3<f64>> {
        let ring = self.ring_at(height)?;
        Some(self.frame.to_world(ring.cu, ring.cv, ring.w))
    }

    /// Unit piece axis in body coordinates.
    #[must_use]
    pub fn axis(&self) -> Vector3<f64> {
        self.frame.ew
    }

    /// Copy with every length multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        let cap = |cap: PlanCap| match cap {
            PlanCap::Opening => PlanCap::Opening,
            PlanCap::Apex { u, v, w } => PlanCap::Apex {
                u: u * factor,
                v: v * factor,
                w: w * factor,
            },
        };
        Self {
            frame: self.frame.scaled(factor),
            rings: self.rings.iter().map(|r| r.scaled(factor)).collect(),
            angles: self.angles.clone(),
            start: cap(self.start),
            end: cap(self.end),
            openings: self.openings.iter().map(|o| o.scaled(factor)).collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::curve::ring_angles;
    use approx::assert_relative_eq;
    use armor_kernel::{GeometryKernel, MeshKernel, Tolerance};

    fn cylinder() -> LoftPlan {
        LoftPlan {
            frame: PieceFrame::upright(Point3::new(100.0, 0.0, 0.0)),
            rings: (0..5)
                .map(|j| RingShape::ellipse(f64::from(j) * 25.0, 40.0, 30.0))
                .collect(),
            angles: ring_angles(24, None),
            start: PlanCap::Opening,
            end: PlanCap::Apex {
                u: 0.0,
                v: 0.0,
                w: 130.0,
            },
            openings: Vec::new(),
        }
    }

    #[test]
    fn sections_sit_on_the_frame() {
        let plan = cylinder();
        let sections = plan.sections();
        assert_eq!(sections.len(), 5);
        assert_relative_eq!(sections[0].points[0], Point3::new(140.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(sections[4].points[0].z, 100.0);
    }

    #[test]
    fn length_includes_apex() {
        let plan = cylinder();
        assert_relative_eq!(plan.length(), 130.0);
        let top = plan.ring_at(1.0).unwrap();
        assert_relative_eq!(top.w, 100.0);
        let mid = plan.ring_at(0.5).unwrap();
        assert_relative_eq!(mid.w, 65.0, epsilon = 1e-12);
    }

    #[test]
    fn surface_point_on_ellipse() {
        let plan = cylinder();
        let p = plan.surface_point(0.25, std::f64::consts::FRAC_PI_2).unwrap();
        assert_relative_eq!(p, Point3::new(100.0, 30.0, 32.5), epsilon = 1e-9);
        let c = plan.axis_point(0.25).unwrap();
        assert_relative_eq!(c, Point3::new(100.0, 0.0, 32.5), epsilon = 1e-9);
    }

    #[test]
    fn plan_lofts_into_a_valid_solid() {
        let plan = cylinder();
        let (start, end) = plan.caps();
        let mesh = MeshKernel::new()
            .loft(&plan.sections(), &start, &end, Tolerance::default())
            .unwrap();
        assert!(MeshKernel::new().validate_manifold(&mesh));
    }

    #[test]
    fn scaling_scales_origin() {
        let half = cylinder().scaled(0.5);
        assert_relative_eq!(half.frame.origin.x, 50.0);
        assert_relative_eq!(half.length(), 65.0);
    }
}
