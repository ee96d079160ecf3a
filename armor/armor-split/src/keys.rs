//! Interlock key sites along a seam.

use armor_kernel::{CrossSection, InterlockKey, cross_section};
use armor_types::{Plane, SolidMesh};
use nalgebra::{Point2, Vector2};
use tracing::debug;

use crate::SplitParams;

/// Interlock keys for a cut of `mesh` by `plane`.
///
/// Sites are spaced `key_spacing` apart along each outer section loop,
/// starting half a spacing in. A key sits in the middle of the wall strip,
/// aligned with the loop, and is kept only if its recess footprint fits the
/// section with clearance to spare. Keys whose footprints would crowd an
/// earlier key are dropped, so a strip seen from both of its faces gets one
/// row of keys. A section that cannot be computed gives no keys.
#[must_use]
pub fn key_sites(mesh: &SolidMesh, plane: &Plane, params: &SplitParams) -> Vec<InterlockKey> {
    let section = match cross_section(mesh, plane, params.tolerance) {
        Ok(section) => section,
        Err(err) => {
            debug!(%err, "no section for interlock keys");
            return Vec::new();
        }
    };
    let keys = keys_in_section(&section, params);
    debug!(
        loops = section.loops.len(),
        keys = keys.len(),
        "placed interlock keys"
    );
    keys
}

fn keys_in_section(section: &CrossSection, params: &SplitParams) -> Vec<InterlockKey> {
    let half_length = params.key_half_length();
    let half_width = params.key_half_width();
    let clearance = params.key_clearance;
    let spacing = params.key_spacing;
    if spacing <= 0.0 || half_length <= 0.0 || half_width <= 0.0 {
        return Vec::new();
    }
    let crowding = 2.0 * (half_length + half_width + 2.0 * clearance);

    let mut centers: Vec<Point2<f64>> = Vec::new();
    let mut keys = Vec::new();
    for (l, lp) in section.loops.iter().enumerate() {
        if !lp.is_outer() || lp.points.len() < 3 {
            continue;
        }
        let n = lp.points.len();
        let mut walked = 0.0;
        let mut next = 0.5 * spacing;
        for i in 0..n {
            if walked >= next {
                while next <= walked {
                    next += spacing;
                }
                let site = site_at(section, l, i, half_length, half_width, clearance);
                if let Some((center, tangent)) = site {
                    if centers.iter().all(|c| (c - center).norm() >= crowding) {
                        centers.push(center);
                        keys.push(InterlockKey {
                            center: section.frame.to_3d(&center),
                            tangent: section.frame.direction_3d(&tangent),
                            half_length,
                            half_width,
                            height: params.key_height(),
                            clearance,
                        });
                    }
                }
            }
            walked += (lp.points[(i + 1) % n] - lp.points[i]).norm();
        }
    }
    keys
}

/// Centre and tangent of a key at point `i` of loop `l`, if it fits.
fn site_at(
    section: &CrossSection,
    l: usize,
    i: usize,
    half_length: f64,
    half_width: f64,
    clearance: f64,
) -> Option<(Point2<f64>, Vector2<f64>)> {
    let lp = &section.loops[l];
    let width = section.inward_width(l, i)?;
    if width < 2.0 * (half_width + 2.0 * clearance) {
        return None;
    }
    let center = lp.points[i] + lp.inward_normal(i) * (0.5 * width);
    let tangent = lp.tangent(i);
    let across = Vector2::new(-tangent.y, tangent.x);
    let a = tangent * (half_length + clearance);
    let b = across * (half_width + clearance);
    let outline = [
        center - a - b,
        center + a - b,
        center + a + b,
        center - a + b,
    ];
    section
        .fits(&outline, 0.5 * clearance)
        .then_some((center, tangent))
}
