//! Per-style hardware cuts of a strap seat.
//!
//! Outlines are in seat coordinates: `a` along the strap and `b` across it,
//! both centred on the mount position. Every style sinks a seat pocket
//! except the interlock, which pairs a groove with a raised tab.

use crate::point::SeatFeature;
use armor_template::MountStyle;
use nalgebra::Point2;

/// Corners of the octagons used for round holes.
const ROUND_SIDES: usize = 8;

/// Eyelets in a lace row.
const LACE_HOLES: usize = 4;

/// How a cut changes the wall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CutKind {
    /// Recess into the exterior, millimeters deep.
    Pocket(f64),
    /// Hole through the wall.
    Hole,
    /// Tab raised off the exterior, millimeters high.
    Boss(f64),
}

/// One outline cut into a seat.
#[derive(Debug, Clone, PartialEq)]
pub struct SeatCut {
    /// Effect on the wall.
    pub kind: CutKind,
    /// Outline in seat coordinates.
    pub outline: Vec<Point2<f64>>,
}

impl SeatCut {
    fn rect(kind: CutKind, a: [f64; 2], b: [f64; 2]) -> Self {
        Self {
            kind,
            outline: vec![
                Point2::new(a[0], b[0]),
                Point2::new(a[1], b[0]),
                Point2::new(a[1], b[1]),
                Point2::new(a[0], b[1]),
            ],
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn round(centre: Point2<f64>, radius: f64) -> Self {
        let outline = (0..ROUND_SIDES)
            .map(|i| {
                let t = std::f64::consts::TAU * (i as f64 + 0.5) / ROUND_SIDES as f64;
                Point2::new(centre.x + radius * t.cos(), centre.y + radius * t.sin())
            })
            .collect();
        Self {
            kind: CutKind::Hole,
            outline,
        }
    }
}

/// Cuts for a style on a seat, in the order they are applied.
///
/// Pockets and bosses come first; holes go through the pocket floor.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn seat_cuts(style: MountStyle, seat: &SeatFeature) -> Vec<SeatCut> {
    let (l, w, depth) = (seat.length, seat.width, seat.depth);
    let pocket = SeatCut::rect(CutKind::Pocket(depth), [-0.5 * l, 0.5 * l], [-0.5 * w, 0.5 * w]);
    match style {
        MountStyle::Buckle => vec![
            pocket,
            SeatCut::rect(CutKind::Hole, [-0.05 * l, 0.05 * l], [-0.4 * w, 0.4 * w]),
        ],
        MountStyle::Velcro => vec![pocket],
        MountStyle::Snap => vec![pocket, SeatCut::round(Point2::origin(), 0.2 * l.min(w))],
        MountStyle::Lace => {
            let r = 0.07 * l.min(w);
            let step = 0.6 * w / (LACE_HOLES - 1) as f64;
            let mut cuts = vec![pocket];
            cuts.extend((0..LACE_HOLES).map(|i| {
                SeatCut::round(Point2::new(0.0, -0.3 * w + step * i as f64), r)
            }));
            cuts
        }
        MountStyle::Clip => vec![
            pocket,
            SeatCut {
                kind: CutKind::Hole,
                outline: vec![
                    Point2::new(-0.4 * l, -0.12 * w),
                    Point2::new(0.15 * l, -0.12 * w),
                    Point2::new(0.15 * l, -0.35 * w),
                    Point2::new(0.4 * l, -0.35 * w),
                    Point2::new(0.4 * l, 0.35 * w),
                    Point2::new(0.15 * l, 0.35 * w),
                    Point2::new(0.15 * l, 0.12 * w),
                    Point2::new(-0.4 * l, 0.12 * w),
                ],
            },
        ],
        MountStyle::Interlock => vec![
            SeatCut::rect(CutKind::Pocket(depth), [-0.45 * l, -0.05 * l], [-0.45 * w, 0.45 * w]),
            SeatCut::rect(CutKind::Boss(depth), [0.1 * l, 0.4 * l], [-0.4 * w, 0.4 * w]),
        ],
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use armor_kernel::polygon_signed_area;

    fn seat() -> SeatFeature {
        SeatFeature {
            length: 30.0,
            width: 24.0,
            depth: 1.2,
        }
    }

    fn inside_seat(cut: &SeatCut, seat: &SeatFeature) -> bool {
        cut.outline
            .iter()
            .all(|p| p.x.abs() <= 0.5 * seat.length && p.y.abs() <= 0.5 * seat.width)
    }

    #[test]
    fn every_style_cuts_inside_its_seat() {
        let seat = seat();
        for style in MountStyle::ALL {
            let cuts = seat_cuts(style, &seat);
            assert!(!cuts.is_empty(), "{style}");
            for cut in &cuts {
                assert!(polygon_signed_area(&cut.outline) > 0.0, "{style} outline is clockwise");
                assert!(inside_seat(cut, &seat), "{style} cut leaves the seat");
            }
        }
    }

    #[test]
    fn hardware_holes_per_style() {
        let seat = seat();
        let holes = |style| {
            seat_cuts(style, &seat)
                .iter()
                .filter(|c| c.kind == CutKind::Hole)
                .count()
        };
        assert_eq!(holes(MountStyle::Buckle), 1);
        assert_eq!(holes(MountStyle::Velcro), 0);
        assert_eq!(holes(MountStyle::Snap), 1);
        assert_eq!(holes(MountStyle::Lace), 4);
        assert_eq!(holes(MountStyle::Clip), 1);
        assert_eq!(holes(MountStyle::Interlock), 0);
    }

    #[test]
    fn lace_eyelets_do_not_touch() {
        let cuts = seat_cuts(MountStyle::Lace, &seat());
        let centres: Vec<f64> = cuts[1..]
            .iter()
            .map(|c| c.outline.iter().map(|p| p.y).sum::<f64>() / 8.0)
            .collect();
        assert_relative_eq!(centres[0], -7.2, epsilon = 1e-9);
        assert_relative_eq!(centres[3], 7.2, epsilon = 1e-9);
        let radius = 0.07 * 24.0;
        for pair in centres.windows(2) {
            assert!(pair[1] - pair[0] > 2.0 * radius);
        }
    }

    #[test]
    fn clip_slot_is_a_tee() {
        let cuts = seat_cuts(MountStyle::Clip, &seat());
        let slot = &cuts[1].outline;
        assert_eq!(slot.len(), 8);
        // Stem 16.5 x 5.76 plus bar 7.5 x 16.8.
        assert_relative_eq!(polygon_signed_area(slot), 16.5 * 5.76 + 7.5 * 16.8, epsilon = 1e-9);
    }

    #[test]
    fn interlock_groove_and_tab_share_depth() {
        let cuts = seat_cuts(MountStyle::Interlock, &seat());
        assert_eq!(cuts[0].kind, CutKind::Pocket(1.2));
        assert_eq!(cuts[1].kind, CutKind::Boss(1.2));
        let groove_end = cuts[0].outline.iter().map(|p| p.x).fold(f64::MIN, f64::max);
        let tab_start = cuts[1].outline.iter().map(|p| p.x).fold(f64::MAX, f64::min);
        assert!(groove_end < tab_start);
    }
}
