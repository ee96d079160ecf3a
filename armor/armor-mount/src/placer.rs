//! Mount planning on shells and seat carving on (sub-)pieces.

use crate::feature::{CutKind, seat_cuts};
use crate::params::MountParams;
use crate::point::{MountPoint, SeatFeature};
use armor_config::MeasurementProfile;
use armor_kernel::{GeometryKernel, Stencil, SurfaceQuery, emboss, pierce};
use armor_template::{AnchorRule, ArmorPieceSpec, LoftPlan, StrapDir};
use armor_types::{GeometryError, GeometryResult, SolidMesh, SurfaceRegion, Vector3};
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// A piece with its seats carved.
#[derive(Debug, Clone)]
pub struct CarvedPiece {
    /// The carved solid.
    pub mesh: SolidMesh,
    /// Mounts with their final seat sizes.
    pub mounts: Vec<MountPoint>,
    /// Mounts that needed the reduced seat.
    pub reduced: usize,
}

/// Exterior regions a pocket or tab may cover.
const SURFACE: &[SurfaceRegion] = &[SurfaceRegion::Outer, SurfaceRegion::Cap];

/// Places strap mounts and carves their seats.
#[derive(Debug, Clone, Copy)]
pub struct MountPlacer<'k, K: GeometryKernel + ?Sized> {
    kernel: &'k K,
    params: MountParams,
}

impl<'k, K: GeometryKernel + ?Sized> MountPlacer<'k, K> {
    /// Create a placer.
    #[must_use]
    pub const fn new(kernel: &'k K, params: MountParams) -> Self {
        Self { kernel, params }
    }

    /// The parameters in use.
    #[must_use]
    pub const fn params(&self) -> &MountParams {
        &self.params
    }

    /// Evaluate every anchor rule of a spec on an unsplit shell.
    ///
    /// Each rule is evaluated on the template surface and projected to the
    /// nearest exterior point of the shell. Symmetric rules add the exact
    /// reflection through the piece's plane of symmetry.
    ///
    /// # Errors
    ///
    /// Returns an invalid-solid error if the shell has no exterior surface
    /// near an anchor.
    pub fn plan(
        &self,
        piece: &str,
        spec: &ArmorPieceSpec,
        plan: &LoftPlan,
        shell: &SolidMesh,
        profile: &MeasurementProfile,
    ) -> GeometryResult<Vec<MountPoint>> {
        let exterior = SurfaceQuery::for_regions(shell, SurfaceRegion::is_exterior);
        let mut mounts = Vec::with_capacity(spec.anchors.len() * 2);

        for rule in &spec.anchors {
            let primary = self
                .place_rule(piece, rule, plan, shell, &exterior, profile)
                .ok_or_else(|| GeometryError::invalid_solid(piece, "mount placement"))?;
            if rule.symmetric {
                let ids = rule.ids();
                let mut twin = primary.mirrored(&plan.frame.symmetry_plane());
                twin.id.clone_from(&ids[1]);
                mounts.push(primary);
                mounts.push(twin);
            } else {
                mounts.push(primary);
            }
        }

        debug!(piece, mounts = mounts.len(), "mounts planned");
        Ok(mounts)
    }

    fn place_rule(
        &self,
        piece: &str,
        rule: &AnchorRule,
        plan: &LoftPlan,
        shell: &SolidMesh,
        exterior: &SurfaceQuery<'_>,
        profile: &MeasurementProfile,
    ) -> Option<MountPoint> {
        let target = plan.surface_point(rule.height, rule.angle)?;
        let hit = exterior.nearest(&target)?;
        let normal = shell.face_unit_normal(hit.face)?.into_inner();

        let around = plan.frame.around(rule.angle);
        let axis = plan.axis();
        let (preferred, fallback) = match rule.direction {
            StrapDir::Around => (around, axis),
            StrapDir::Along => (axis, around),
        };
        let strap_dir = tangent(&preferred, &normal).or_else(|| tangent(&fallback, &normal))?;

        let strap_width = rule.width.evaluate(profile) * self.params.scale;
        let shape = rule.style.seat();
        let seat = SeatFeature {
            length: shape.length * strap_width,
            width: strap_width * (1.0 + 2.0 * shape.side_pad),
            depth: shape.depth * self.params.wall_thickness,
        };

        Some(MountPoint {
            id: rule.ids().swap_remove(0),
            style: rule.style,
            position: hit.point,
            normal,
            strap_dir,
            strap_width,
            seat,
            owner: piece.to_string(),
        })
    }

    /// Carve the seats of the given mounts into a solid.
    ///
    /// Each seat gets its style's cuts: a pocket with hardware holes, or a
    /// groove and tab for interlocks. Each seat is tried at full size and
    /// once at the reduced size.
    ///
    /// # Errors
    ///
    /// Returns "mount intersects cavity" if a reduced seat still breaks
    /// through the cavity margin, cannot be cut, or leaves an invalid solid.
    pub fn carve(
        &self,
        piece: &str,
        mesh: &SolidMesh,
        mounts: &[MountPoint],
    ) -> GeometryResult<CarvedPiece> {
        let mut current = mesh.clone();
        let mut placed = Vec::with_capacity(mounts.len());
        let mut reduced = 0;

        for mount in mounts {
            if let Some(carved) = self.try_carve(&current, mount) {
                current = carved;
                placed.push(mount.clone().with_owner(piece));
                continue;
            }

            warn!(piece, mount = %mount.id, "seat does not fit, retrying smaller");
            let mut smaller = mount.clone().with_owner(piece);
            smaller.seat = mount.seat.scaled(self.params.retry_scale);
            let Some(carved) = self.try_carve(&current, &smaller) else {
                return Err(GeometryError::mount_cavity(piece));
            };
            current = carved;
            placed.push(smaller);
            reduced += 1;
        }

        info!(
            piece,
            mounts = placed.len(),
            reduced,
            mount_faces = current.count_region(SurfaceRegion::Mount),
            "seats carved"
        );
        Ok(CarvedPiece {
            mesh: current,
            mounts: placed,
            reduced,
        })
    }

    /// Apply every cut of one seat, or `None` if any cut fails.
    fn try_carve(&self, mesh: &SolidMesh, mount: &MountPoint) -> Option<SolidMesh> {
        let frame = mount.frame();
        let tol = self.params.tolerance;
        let mut current = mesh.clone();

        for cut in seat_cuts(mount.style, &mount.seat) {
            let stencil = Stencil::new(frame, cut.outline);
            current = match cut.kind {
                CutKind::Pocket(depth) => self.sink(&current, &stencil, depth, &mount.id)?,
                CutKind::Boss(height) => {
                    emboss(&current, &stencil, height, SURFACE, SurfaceRegion::Mount, tol)
                        .inspect_err(|err| debug!(mount = %mount.id, error = %err, "tab failed"))
                        .ok()?
                        .mesh
                }
                CutKind::Hole => pierce(
                    &current,
                    &stencil,
                    &[SurfaceRegion::Outer, SurfaceRegion::Cap, SurfaceRegion::Mount],
                    &[SurfaceRegion::Inner],
                    SurfaceRegion::Mount,
                    tol,
                )
                .inspect_err(|err| debug!(mount = %mount.id, error = %err, "hole failed"))
                .ok()?,
            };
        }

        let added = current
            .count_region(SurfaceRegion::Mount)
            .saturating_sub(mesh.count_region(SurfaceRegion::Mount));
        if added == 0 {
            debug!(mount = %mount.id, "seat cut nothing");
            return None;
        }
        self.kernel.validate_manifold(&current).then_some(current)
    }

    /// Sink a pocket whose floor stays inside the wall and clear of the
    /// cavity.
    fn sink(&self, mesh: &SolidMesh, stencil: &Stencil, depth: f64, id: &str) -> Option<SolidMesh> {
        let sunk = emboss(
            mesh,
            stencil,
            -depth,
            SURFACE,
            SurfaceRegion::Mount,
            self.params.tolerance,
        )
        .inspect_err(|err| debug!(mount = id, error = %err, "pocket failed"))
        .ok()?;

        let solid = SurfaceQuery::new(mesh);
        let cavity = SurfaceQuery::for_regions(mesh, |r| r == SurfaceRegion::Inner);
        let contained = sunk.moved.par_iter().all(|&v| {
            let p = sunk.mesh.vertices[v as usize];
            solid.contains(&p)
                && cavity
                    .nearest(&p)
                    .is_none_or(|hit| hit.distance >= self.params.cavity_margin)
        });
        if !contained {
            debug!(mount = id, depth, "pocket floor reaches the cavity");
            return None;
        }
        Some(sunk.mesh)
    }
}

/// Index of the part whose exterior lies closest to a mount.
#[must_use]
pub fn owner_index(mount: &MountPoint, parts: &[&SolidMesh]) -> Option<usize> {
    parts
        .iter()
        .enumerate()
        .filter_map(|(i, mesh)| {
            SurfaceQuery::for_regions(mesh, SurfaceRegion::is_exterior)
                .nearest(&mount.position)
                .map(|hit| (i, hit.distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

/// Component of `v` tangent to a surface with unit normal `normal`.
fn tangent(v: &Vector3<f64>, normal: &Vector3<f64>) -> Option<Vector3<f64>> {
    let t = v - normal * v.dot(normal);
    let len = t.norm();
    (len > 1e-6).then(|| t / len)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use armor_config::{GenerationRequest, SizeClass};
    use armor_deform::Deformer;
    use armor_kernel::MeshKernel;
    use armor_shell::{ShellParams, ShellingEngine};
    use armor_template::{MountStyle, TemplateLibrary};
    use armor_types::{GeometryErrorKind, PieceKind};

    struct Fixture {
        kind: PieceKind,
        request: GenerationRequest,
        spec: ArmorPieceSpec,
        plan: LoftPlan,
        shell: SolidMesh,
    }

    fn fixture(kind: PieceKind) -> Fixture {
        let request = GenerationRequest::builder()
            .size(SizeClass::M)
            .detail(1)
            .build()
            .unwrap();
        let kernel = MeshKernel::new();
        let spec = TemplateLibrary::standard().spec(kind).unwrap();
        let base = Deformer::new(&kernel).deform(&spec, &request).unwrap();
        let shell = ShellingEngine::new(&kernel)
            .shell(kind.name(), &base.mesh, &ShellParams::for_request(&request))
            .unwrap();
        Fixture {
            kind,
            request,
            spec,
            plan: base.plan,
            shell: shell.mesh,
        }
    }

    fn planned(f: &Fixture) -> Vec<MountPoint> {
        let kernel = MeshKernel::new();
        MountPlacer::new(&kernel, MountParams::for_request(&f.request))
            .plan(f.kind.name(), &f.spec, &f.plan, &f.shell, f.request.measurements())
            .unwrap()
    }

    #[test]
    fn helmet_chin_straps_are_mirrored() {
        let f = fixture(PieceKind::Helmet);
        let mounts = planned(&f);

        assert_eq!(mounts.len(), 2);
        assert_eq!(mounts[0].id, "chin_strap_l");
        assert_eq!(mounts[1].id, "chin_strap_r");
        assert!(mounts[0].position.x > 0.0);
        assert_relative_eq!(mounts[1].position.x, -mounts[0].position.x, epsilon = 1e-9);
        assert_relative_eq!(mounts[1].position.y, mounts[0].position.y, epsilon = 1e-9);
        assert_relative_eq!(mounts[1].position.z, mounts[0].position.z, epsilon = 1e-9);

        let exterior = SurfaceQuery::for_regions(&f.shell, SurfaceRegion::is_exterior);
        for m in &mounts {
            assert_relative_eq!(m.normal.norm(), 1.0, epsilon = 1e-9);
            assert_relative_eq!(m.strap_dir.norm(), 1.0, epsilon = 1e-9);
            assert!(m.normal.dot(&m.strap_dir).abs() < 1e-9);
            assert!(exterior.nearest(&m.position).unwrap().distance < 0.5);
            assert_relative_eq!(m.strap_width, 20.0);
            assert_relative_eq!(m.seat.depth, 0.35 * 4.0);
        }
    }

    #[test]
    fn carving_recesses_the_exterior() {
        let f = fixture(PieceKind::Helmet);
        let mounts = planned(&f);
        let kernel = MeshKernel::new();
        let carved = MountPlacer::new(&kernel, MountParams::for_request(&f.request))
            .carve("helmet", &f.shell, &mounts)
            .unwrap();

        assert!(kernel.validate_manifold(&carved.mesh));
        assert!(carved.mesh.count_region(SurfaceRegion::Mount) > 0);
        assert!(carved.mesh.volume() < f.shell.volume());
        assert_eq!(carved.reduced, 0);
        assert_eq!(carved.mounts.len(), 2);
    }

    #[test]
    fn tight_margin_reduces_seat() {
        let f = fixture(PieceKind::Helmet);
        let mounts = planned(&f);
        let kernel = MeshKernel::new();
        let params = MountParams::for_request(&f.request).with_cavity_margin(3.0);
        let carved = MountPlacer::new(&kernel, params)
            .carve("helmet", &f.shell, &mounts)
            .unwrap();

        assert_eq!(carved.reduced, 2);
        assert_relative_eq!(carved.mounts[0].seat.depth, 0.7, epsilon = 1e-12);
    }

    #[test]
    fn cavity_breach_fails_piece() {
        let f = fixture(PieceKind::Helmet);
        let mounts = planned(&f);
        let kernel = MeshKernel::new();
        let params = MountParams::for_request(&f.request).with_cavity_margin(10.0);
        let err = MountPlacer::new(&kernel, params)
            .carve("helmet", &f.shell, &mounts)
            .unwrap_err();
        assert_eq!(err.kind, GeometryErrorKind::MountIntersectsCavity);
        assert_eq!(err.to_string(), "helmet: mount intersects cavity");
    }

    #[test]
    fn owner_is_nearest_part() {
        let f = fixture(PieceKind::Helmet);
        let mounts = planned(&f);
        let mut far = f.shell.clone();
        far.translate(Vector3::new(0.0, 0.0, 1000.0));
        assert_eq!(owner_index(&mounts[0], &[&far, &f.shell]), Some(1));
        assert_eq!(owner_index(&mounts[0], &[]), None);
    }

    /// `V - F / 2` of a closed triangle surface; drops by two per handle.
    fn euler(mesh: &SolidMesh) -> i64 {
        i64::try_from(mesh.vertex_count()).unwrap() - i64::try_from(mesh.face_count() / 2).unwrap()
    }

    fn carved(f: &Fixture) -> CarvedPiece {
        let kernel = MeshKernel::new();
        MountPlacer::new(&kernel, MountParams::for_request(&f.request))
            .carve(f.kind.name(), &f.shell, &planned(f))
            .unwrap()
    }

    #[test]
    fn buckle_slots_go_through_the_wall() {
        let f = fixture(PieceKind::Helmet);
        let carved = carved(&f);
        // One slot per chin strap.
        assert_eq!(euler(&f.shell) - euler(&carved.mesh), 4);

        let kernel = MeshKernel::new();
        assert!(kernel.validate_manifold(&carved.mesh));
        let cavity = SurfaceQuery::for_regions(&carved.mesh, |r| r == SurfaceRegion::Inner);
        for mount in &carved.mounts {
            let slot_wall = carved
                .mesh
                .faces_in(SurfaceRegion::Mount)
                .flat_map(|face| carved.mesh.triangle(face))
                .filter(|p| {
                    let (a, b, _) = mount.local(p);
                    a.abs() <= 0.05 * mount.seat.length + 1e-6
                        && b.abs() <= 0.4 * mount.seat.width + 1e-6
                })
                .map(|p| cavity.nearest(&p).unwrap().distance)
                .fold(f64::INFINITY, f64::min);
            assert!(slot_wall < 1e-6, "{} slot does not reach the cavity", mount.id);
        }
    }

    #[test]
    fn styles_cut_their_hardware() {
        // Through-holes per piece: buckles 1, clip 1, lace 4, interlock 0.
        for (kind, holes) in [
            (PieceKind::CuisseLeft, 3),
            (PieceKind::SabatonLeft, 5),
            (PieceKind::PauldronLeft, 1),
            (PieceKind::GauntletLeft, 0),
        ] {
            let f = fixture(kind);
            let carved = carved(&f);
            let kernel = MeshKernel::new();
            assert!(kernel.validate_manifold(&carved.mesh), "{}", kind.name());
            assert!(carved.mesh.count_region(SurfaceRegion::Mount) > 0, "{}", kind.name());
            assert_eq!(euler(&f.shell) - euler(&carved.mesh), 2 * holes, "{}", kind.name());
        }
    }

    #[test]
    fn interlock_raises_a_tab_beside_its_groove() {
        let f = fixture(PieceKind::PauldronLeft);
        let carved = carved(&f);
        let interlock = carved
            .mounts
            .iter()
            .find(|m| m.style == MountStyle::Interlock)
            .unwrap();
        let heights: Vec<(f64, f64)> = carved
            .mesh
            .faces_in(SurfaceRegion::Mount)
            .flat_map(|face| carved.mesh.triangle(face))
            .map(|p| interlock.local(&p))
            .filter(|(_, b, _)| b.abs() < 0.5 * interlock.seat.width)
            .filter(|(a, _, h)| a.abs() < 0.5 * interlock.seat.length && h.abs() < 3.0 * interlock.seat.depth)
            .map(|(a, _, h)| (a, h))
            .collect();
        let tab = heights
            .iter()
            .filter(|(a, _)| *a > 0.0)
            .map(|(_, h)| *h)
            .fold(f64::MIN, f64::max);
        let groove = heights
            .iter()
            .filter(|(a, _)| *a < 0.0)
            .map(|(_, h)| *h)
            .fold(f64::MAX, f64::min);
        assert!(tab > 0.5 * interlock.seat.depth, "tab height {tab}");
        assert!(groove < -0.5 * interlock.seat.depth, "groove depth {groove}");
    }
}
