//! Seam cuts for shells larger than the print bed.

use armor_kernel::{BooleanOp, GeometryKernel, HalfSpace, InterlockKey, Operand};
use armor_mount::MountPoint;
use armor_template::SeamPlane;
use armor_types::{Aabb, GeometryError, GeometryResult, Plane, Point3, SolidMesh};
use tracing::{debug, info, warn};

use crate::report::{AppliedSeam, SplitReport};
use crate::{SplitParams, key_sites};

/// A named part of a split piece.
#[derive(Debug, Clone, PartialEq)]
pub struct SubPiece {
    /// Piece name followed by the seam labels of every cut it came from.
    pub name: String,
    /// Closed solid.
    pub mesh: SolidMesh,
}

/// Output of [`Splitter::split`].
#[derive(Debug, Clone, PartialEq)]
pub struct SplitPiece {
    /// Sub-pieces in cut order; a single part when nothing was cut.
    pub parts: Vec<SubPiece>,
    /// Bookkeeping of the cuts.
    pub report: SplitReport,
}

/// Both halves of one cut.
struct Cut {
    lower: SolidMesh,
    upper: SolidMesh,
    keys: Vec<InterlockKey>,
}

/// Splits shells into bed-sized sub-pieces along template seams.
#[derive(Debug, Clone, Copy)]
pub struct Splitter<'k, K: GeometryKernel + ?Sized> {
    kernel: &'k K,
    params: SplitParams,
}

impl<'k, K: GeometryKernel + ?Sized> Splitter<'k, K> {
    /// Create a splitter.
    #[must_use]
    pub const fn new(kernel: &'k K, params: SplitParams) -> Self {
        Self { kernel, params }
    }

    /// Splitting parameters.
    #[must_use]
    pub const fn params(&self) -> &SplitParams {
        &self.params
    }

    /// Whether a solid fits the bed in some axis permutation.
    #[must_use]
    pub fn fits(&self, mesh: &SolidMesh) -> bool {
        mesh.bounds()
            .fits_within(self.params.bed, self.params.fit_tolerance)
    }

    /// Split a shell along `seams` until its parts fit the bed.
    ///
    /// Seams are positioned on the bounds of the whole shell and applied in
    /// order to each part that still does not fit and that the seam plane
    /// crosses. A seam is moved in steps of `shift_step`, nearest first, until
    /// it clears every mount on the part by `mount_clearance`. Parts still too
    /// large after the last seam are kept and listed in the report.
    ///
    /// # Errors
    ///
    /// Returns "seam/mount conflict" if no allowed position clears the
    /// mounts, and a kernel or invalid-solid error if a cut fails even
    /// without interlock keys.
    pub fn split(
        &self,
        piece: &str,
        shell: &SolidMesh,
        seams: &[SeamPlane],
        mounts: &[MountPoint],
    ) -> GeometryResult<SplitPiece> {
        let mut report = SplitReport::new(piece, shell.volume());
        let mut parts = vec![SubPiece {
            name: piece.to_string(),
            mesh: shell.clone(),
        }];

        if self.fits(shell) {
            debug!(piece, "fits the print bed");
        } else {
            let bounds = shell.bounds();
            for seam in seams {
                let mut next = Vec::with_capacity(parts.len() * 2);
                for part in parts {
                    if self.fits(&part.mesh) {
                        next.push(part);
                        continue;
                    }
                    let part_bounds = part.mesh.bounds();
                    let nominal = seam.plane(&bounds);
                    if !crosses(&part_bounds, &nominal) {
                        next.push(part);
                        continue;
                    }
                    let (plane, shift) = self
                        .place_seam(seam, &bounds, &part_bounds, mounts)
                        .ok_or_else(|| GeometryError::seam_mount_conflict(piece))?;
                    if !crosses(&part_bounds, &plane) {
                        next.push(part);
                        continue;
                    }

                    let cut = self.cut(piece, &part.mesh, &plane)?;
                    report.tab_volume +=
                        cut.keys.iter().map(InterlockKey::tab_volume).sum::<f64>();
                    report.recess_volume +=
                        cut.keys.iter().map(InterlockKey::recess_volume).sum::<f64>();
                    report.seams.push(AppliedSeam {
                        target: part.name.clone(),
                        axis: seam.axis,
                        offset: seam.axis.coord(&plane.origin),
                        shift,
                        labels: seam.labels.clone(),
                        keys: cut.keys.len(),
                    });
                    debug!(
                        piece,
                        part = %part.name,
                        axis = ?seam.axis,
                        shift,
                        keys = cut.keys.len(),
                        "cut seam"
                    );
                    next.push(SubPiece {
                        name: format!("{}_{}", part.name, seam.labels.0),
                        mesh: cut.lower,
                    });
                    next.push(SubPiece {
                        name: format!("{}_{}", part.name, seam.labels.1),
                        mesh: cut.upper,
                    });
                }
                parts = next;
            }
        }

        for part in parts.iter().filter(|p| !self.fits(&p.mesh)) {
            warn!(piece, part = %part.name, "sub-piece still exceeds the print bed");
            report.oversized.push(part.name.clone());
        }
        report.parts = parts
            .iter()
            .map(|p| (p.name.clone(), p.mesh.volume()))
            .collect();
        info!(
            piece,
            parts = parts.len(),
            seams = report.seams.len(),
            "split piece"
        );
        Ok(SplitPiece { parts, report })
    }

    /// Seam plane nearest the nominal position that clears every mount on
    /// the part, with its shift.
    fn place_seam(
        &self,
        seam: &SeamPlane,
        bounds: &Aabb,
        part_bounds: &Aabb,
        mounts: &[MountPoint],
    ) -> Option<(Plane, f64)> {
        let clearance = self.params.mount_clearance;
        let region = part_bounds.padded(clearance);
        let nearby: Vec<&MountPoint> = mounts
            .iter()
            .filter(|m| region.contains(&m.position))
            .collect();
        let nominal = seam.plane(bounds);
        let max_shift = seam.max_shift_mm(bounds);
        let step = self.params.shift_step;

        let mut k = 0.0_f64;
        loop {
            let magnitude = k * step;
            if magnitude > max_shift + self.params.tolerance.linear {
                return None;
            }
            for shift in [magnitude, -magnitude] {
                let plane = nominal.shifted(shift);
                if nearby.iter().all(|m| clears(&plane, m, clearance)) {
                    return Some((plane, shift));
                }
            }
            if step <= 0.0 {
                return None;
            }
            k += 1.0;
        }
    }

    /// Cut with keys, falling back to a plain cut if the keyed halves do not
    /// hold up.
    fn cut(&self, piece: &str, mesh: &SolidMesh, plane: &Plane) -> GeometryResult<Cut> {
        let keys = if self.params.keys {
            key_sites(mesh, plane, &self.params)
        } else {
            Vec::new()
        };
        if !keys.is_empty() {
            match self.try_cut(piece, mesh, plane, keys) {
                Ok(cut) => return Ok(cut),
                Err(err) => warn!(piece, reason = %err.reason(), "keyed cut failed, cutting plain"),
            }
        }
        self.try_cut(piece, mesh, plane, Vec::new())
    }

    fn try_cut(
        &self,
        piece: &str,
        mesh: &SolidMesh,
        plane: &Plane,
        keys: Vec<InterlockKey>,
    ) -> GeometryResult<Cut> {
        let half = HalfSpace::new(*plane).with_keys(keys);
        let side = |op: BooleanOp| {
            self.params
                .tolerance
                .retry_relaxed(|tol| self.kernel.boolean(op, mesh, Operand::HalfSpace(&half), tol))
                .map_err(|err| GeometryError::kernel(piece, err.to_string()))
        };
        let lower = side(BooleanOp::Intersect)?;
        let upper = side(BooleanOp::Subtract)?;
        if !self.kernel.validate_manifold(&lower) || !self.kernel.validate_manifold(&upper) {
            return Err(GeometryError::invalid_solid(piece, "splitting"));
        }
        Ok(Cut {
            lower,
            upper,
            keys: half.keys,
        })
    }
}

/// Whether a plane passes strictly between the faces of a box.
fn crosses(bounds: &Aabb, plane: &Plane) -> bool {
    let corners = [bounds.min, bounds.max];
    let (mut below, mut above) = (false, false);
    for x in corners {
        for y in corners {
            for z in corners {
                let d = plane.signed_distance(&Point3::new(x.x, y.y, z.z));
                below |= d < 0.0;
                above |= d > 0.0;
            }
        }
    }
    below && above
}

/// Whether a mount's seat lies wholly on one side of a plane, at least
/// `clearance` away.
fn clears(plane: &Plane, mount: &MountPoint, clearance: f64) -> bool {
    let corners = mount.footprint_volume();
    corners.iter().all(|p| plane.signed_distance(p) >= clearance)
        || corners.iter().all(|p| plane.signed_distance(p) <= -clearance)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use armor_kernel::{EndCap, MeshKernel, Section, Tolerance, loft_sections};
    use armor_mount::SeatFeature;
    use armor_shell::{ShellParams, ShellingEngine};
    use armor_template::MountStyle;
    use armor_types::{Axis, GeometryErrorKind, SurfaceRegion, Vector3};
    use std::f64::consts::TAU;

    fn shelled_tube() -> SolidMesh {
        let sections: Vec<Section> = (0..6)
            .map(|j| {
                let z = f64::from(j) * 24.0;
                Section::new(
                    (0..40)
                        .map(|i| {
                            let a = TAU * f64::from(i) / 40.0;
                            Point3::new(50.0 * a.cos(), 50.0 * a.sin(), z)
                        })
                        .collect(),
                )
            })
            .collect();
        let base = loft_sections(&sections, &EndCap::Open, &EndCap::Open, Tolerance::default())
            .unwrap();
        ShellingEngine::new(&MeshKernel::new())
            .shell("tube", &base, &ShellParams::new(4.0, 2.0))
            .unwrap()
            .mesh
    }

    fn mid_seam() -> SeamPlane {
        SeamPlane::new(Axis::Z, 0.5, "lower", "upper")
    }

    fn side_mount(z: f64) -> MountPoint {
        MountPoint {
            id: "side_buckle".to_string(),
            style: MountStyle::Buckle,
            position: Point3::new(50.0, 0.0, z),
            normal: Vector3::x(),
            strap_dir: Vector3::z(),
            strap_width: 10.0,
            seat: SeatFeature {
                length: 20.0,
                width: 10.0,
                depth: 1.0,
            },
            owner: "tube".to_string(),
        }
    }

    #[test]
    fn fitting_shell_is_untouched() {
        let kernel = MeshKernel::new();
        let tube = shelled_tube();
        let split = Splitter::new(&kernel, SplitParams::new([256.0; 3], 4.0))
            .split("tube", &tube, &[mid_seam()], &[])
            .unwrap();
        assert_eq!(split.parts.len(), 1);
        assert_eq!(split.parts[0].name, "tube");
        assert_eq!(split.parts[0].mesh, tube);
        assert!(!split.report.is_split());
    }

    #[test]
    fn keyed_cut_conserves_volume() {
        let kernel = MeshKernel::new();
        let tube = shelled_tube();
        let split = Splitter::new(&kernel, SplitParams::new([256.0, 256.0, 80.0], 4.0))
            .split("tube", &tube, &[mid_seam()], &[])
            .unwrap();

        let names: Vec<&str> = split.parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["tube_lower", "tube_upper"]);
        for part in &split.parts {
            assert!(kernel.validate_manifold(&part.mesh));
            assert!(part.mesh.count_region(SurfaceRegion::Seam) > 0);
        }
        let seam = &split.report.seams[0];
        assert_eq!(seam.keys, 5);
        assert_relative_eq!(seam.offset, 60.0);
        assert_relative_eq!(seam.shift, 0.0);
        assert!(split.report.tab_volume > 0.0);
        assert!(split.report.recess_volume > split.report.tab_volume);
        assert!(split.report.volume_error() < 1e-6);
        assert!(split.report.oversized.is_empty());
        assert!(split.parts[0].mesh.bounds().max.z > 60.0 + 1.0);
    }

    #[test]
    fn plain_cut_without_keys() {
        let kernel = MeshKernel::new();
        let tube = shelled_tube();
        let params = SplitParams::new([256.0, 256.0, 80.0], 4.0).with_keys(false);
        let split = Splitter::new(&kernel, params)
            .split("tube", &tube, &[mid_seam()], &[])
            .unwrap();
        assert_eq!(split.report.seams[0].keys, 0);
        assert_relative_eq!(split.report.tab_volume, 0.0);
        let total: f64 = split.parts.iter().map(|p| p.mesh.volume()).sum();
        assert_relative_eq!(total, tube.volume(), max_relative = 1e-6);
        for part in &split.parts {
            assert_eq!(part.mesh.count_region(SurfaceRegion::Interlock), 0);
        }
    }

    #[test]
    fn seam_shifts_off_a_mount() {
        let kernel = MeshKernel::new();
        let tube = shelled_tube();
        let mount = side_mount(60.0);
        let seam = mid_seam().with_max_shift(0.2);
        let split = Splitter::new(&kernel, SplitParams::new([256.0, 256.0, 90.0], 4.0))
            .split("tube", &tube, &[seam], &[mount.clone()])
            .unwrap();

        let applied = &split.report.seams[0];
        assert_relative_eq!(applied.shift, 15.0);
        assert_relative_eq!(applied.offset, 75.0);
        assert!(clears(&applied.plane(), &mount, 3.0));
        assert!(split.report.volume_error() < 1e-6);
    }

    #[test]
    fn seam_mount_conflict() {
        let kernel = MeshKernel::new();
        let tube = shelled_tube();
        let err = Splitter::new(&kernel, SplitParams::new([256.0, 256.0, 90.0], 4.0))
            .split("tube", &tube, &[mid_seam()], &[side_mount(60.0)])
            .unwrap_err();
        assert_eq!(err.kind, GeometryErrorKind::SeamMountConflict);
        assert_eq!(err.reason(), "seam/mount conflict");
    }

    #[test]
    fn mounts_on_other_parts_are_ignored() {
        let kernel = MeshKernel::new();
        let tube = shelled_tube();
        let seams = [
            SeamPlane::new(Axis::X, 0.5, "right", "left"),
            SeamPlane::new(Axis::Z, 0.5, "lower", "upper"),
        ];
        // On the left half only, so the right half is cut at the nominal
        // height.
        let mount = side_mount(50.0);
        let split = Splitter::new(&kernel, SplitParams::new([72.0, 72.0, 256.0], 4.0))
            .split("tube", &tube, &seams, &[mount])
            .unwrap();

        let names: Vec<&str> = split.parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "tube_right_lower",
                "tube_right_upper",
                "tube_left_lower",
                "tube_left_upper"
            ]
        );
        let seams = &split.report.seams;
        assert_eq!(seams.len(), 3);
        assert_eq!(seams[1].target, "tube_right");
        assert_relative_eq!(seams[1].shift, 0.0);
        assert_eq!(seams[2].target, "tube_left");
        assert_relative_eq!(seams[2].shift, 5.0);
        assert!(split.report.oversized.is_empty());
        assert!(split.report.volume_error() < 1e-6);
    }
}
