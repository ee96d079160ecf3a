//! Hollowing base solids into walls.

use crate::limit::{ball_limits, lipschitz_smooth};
use crate::params::ShellParams;
use armor_kernel::{EdgeAdjacency, GeometryKernel, Stencil, SurfaceQuery, pierce, vertex_normals};
use armor_types::{GeometryError, GeometryResult, SolidMesh, SurfaceRegion};
use rayon::prelude::*;
use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sampled wall thickness of a shell.
///
/// Each inner vertex is measured to the nearest exterior face.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThicknessReport {
    /// Requested thickness.
    pub target: f64,
    /// Smallest allowed thickness.
    pub minimum: f64,
    /// Thinnest sample.
    pub min: f64,
    /// Thickest sample.
    pub max: f64,
    /// Mean over all samples.
    pub mean: f64,
    /// Number of samples.
    pub samples: usize,
    /// Vertices offset by less than the target.
    pub clamped: usize,
}

impl ThicknessReport {
    /// Whether every sample lies in `[minimum, target]` within `epsilon`.
    #[must_use]
    pub fn within(&self, epsilon: f64) -> bool {
        self.min >= self.minimum - epsilon && self.max <= self.target + epsilon
    }
}

/// A hollowed solid.
///
/// The first `outer_vertices` vertices are the exterior surface; vertex
/// `outer_vertices + i` is the inner offset of exterior vertex `i`.
#[derive(Debug, Clone)]
pub struct ShelledPiece {
    /// Closed shell: exterior, cavity and rim strips.
    pub mesh: SolidMesh,
    /// Number of exterior vertices.
    pub outer_vertices: usize,
    /// Offset distance used at each exterior vertex.
    pub distances: Vec<f64>,
    /// Sampled wall thickness.
    pub report: ThicknessReport,
}

impl ShelledPiece {
    /// Inner counterpart of an exterior vertex.
    #[must_use]
    pub const fn inner_of(&self, outer: usize) -> usize {
        self.outer_vertices + outer
    }
}

/// Converts closed solids into shells of bounded wall thickness.
#[derive(Debug, Clone, Copy)]
pub struct ShellingEngine<'k, K: GeometryKernel + ?Sized> {
    kernel: &'k K,
}

impl<'k, K: GeometryKernel + ?Sized> ShellingEngine<'k, K> {
    /// Create an engine on a kernel.
    #[must_use]
    pub const fn new(kernel: &'k K) -> Self {
        Self { kernel }
    }

    /// Shell a base solid.
    ///
    /// Opening faces are removed and the rest is offset inward. Where the
    /// inward ball of radius `thickness` would touch the surface elsewhere
    /// the offset is reduced, never below `min_thickness`. The outer and
    /// inner boundaries of each opening are joined by a rim strip.
    ///
    /// # Errors
    ///
    /// - "wall thickness violation" if the minimum cannot be held somewhere
    /// - a kernel error if the offset fails twice
    /// - "invalid solid after shelling" if the shell does not validate
    pub fn shell(
        &self,
        piece: &str,
        base: &SolidMesh,
        params: &ShellParams,
    ) -> GeometryResult<ShelledPiece> {
        let surface = base.without_regions(&[SurfaceRegion::Opening]);
        let n = surface.vertex_count();

        let normals = vertex_normals(&surface);
        let limits = ball_limits(&surface, &normals, params.thickness);
        let thinnest = limits.iter().copied().fold(f64::INFINITY, f64::min);
        if thinnest < params.min_thickness * (1.0 - 1e-9) {
            warn!(
                piece,
                thinnest,
                min_thickness = params.min_thickness,
                "curvature cannot hold the minimum wall"
            );
            return Err(GeometryError::wall_thickness(piece));
        }

        let mut distances: Vec<f64> = limits
            .iter()
            .map(|&r| {
                if r >= params.thickness {
                    params.thickness
                } else {
                    (r * params.limit_fraction).clamp(params.min_thickness, params.thickness)
                }
            })
            .collect();
        let sweeps = lipschitz_smooth(&surface, &mut distances, params.lipschitz);
        let clamped = distances
            .iter()
            .filter(|&&d| d < params.thickness * (1.0 - 1e-9))
            .count();
        debug!(piece, thinnest, clamped, sweeps, "offset field ready");

        let mut inner = params
            .tolerance
            .retry_relaxed(|tol| self.kernel.offset(&surface, &distances, tol))
            .map_err(|err| GeometryError::kernel(piece, err.to_string()))?;
        inner.regions.fill(SurfaceRegion::Inner);
        inner.flip_winding();

        let loops = EdgeAdjacency::build(&surface)
            .boundary_loops()
            .ok_or_else(|| GeometryError::invalid_solid(piece, "shelling"))?;

        let mut mesh = surface;
        mesh.merge(&inner);
        add_rims(&mut mesh, &loops, n);

        if !self.kernel.validate_manifold(&mesh) {
            let report = self.kernel.report(&mesh);
            warn!(piece, %report, "shell failed validation");
            return Err(GeometryError::invalid_solid(piece, "shelling"));
        }

        let report = thickness_report(&mesh, n, params, clamped);
        info!(
            piece,
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            rims = loops.len(),
            min = report.min,
            max = report.max,
            clamped,
            "piece shelled"
        );

        Ok(ShelledPiece {
            mesh,
            outer_vertices: n,
            distances,
            report,
        })
    }

    /// Cut windows such as a visor slit through a shelled wall.
    ///
    /// Each stencil enters through the exterior and leaves through the
    /// inner surface. The new walls are tagged as rims.
    ///
    /// # Errors
    ///
    /// - a kernel error if an opening cannot be cut twice
    /// - "invalid solid after opening" if the result does not validate
    pub fn cut_openings(
        &self,
        piece: &str,
        mut mesh: SolidMesh,
        openings: &[Stencil],
        params: &ShellParams,
    ) -> GeometryResult<SolidMesh> {
        if openings.is_empty() {
            return Ok(mesh);
        }
        for stencil in openings {
            mesh = params
                .tolerance
                .retry_relaxed(|tol| {
                    pierce(
                        &mesh,
                        stencil,
                        &[SurfaceRegion::Outer, SurfaceRegion::Cap],
                        &[SurfaceRegion::Inner],
                        SurfaceRegion::Rim,
                        tol,
                    )
                })
                .map_err(|err| GeometryError::kernel(piece, err.to_string()))?;
        }
        if !self.kernel.validate_manifold(&mesh) {
            let report = self.kernel.report(&mesh);
            warn!(piece, %report, "opening failed validation");
            return Err(GeometryError::invalid_solid(piece, "opening"));
        }
        debug!(piece, openings = openings.len(), "openings cut");
        Ok(mesh)
    }
}

/// Join each exterior boundary loop to its inner copy.
#[allow(clippy::cast_possible_truncation)]
fn add_rims(mesh: &mut SolidMesh, loops: &[Vec<u32>], outer_vertices: usize) {
    let offset = outer_vertices as u32;
    for ring in loops {
        for (i, &a) in ring.iter().enumerate() {
            let b = ring[(i + 1) % ring.len()];
            mesh.push_face([b, a, a + offset], SurfaceRegion::Rim);
            mesh.push_face([b, a + offset, b + offset], SurfaceRegion::Rim);
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn thickness_report(
    mesh: &SolidMesh,
    outer_vertices: usize,
    params: &ShellParams,
    clamped: usize,
) -> ThicknessReport {
    let exterior = SurfaceQuery::for_regions(mesh, SurfaceRegion::is_exterior);
    let samples: Vec<f64> = mesh.vertices[outer_vertices..]
        .par_iter()
        .filter_map(|p| exterior.nearest(p).map(|hit| hit.distance))
        .collect();

    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let max = samples.iter().copied().fold(0.0, f64::max);
    let mean = if samples.is_empty() {
        0.0
    } else {
        samples.iter().sum::<f64>() / samples.len() as f64
    };

    ThicknessReport {
        target: params.thickness,
        minimum: params.min_thickness,
        min,
        max,
        mean,
        samples: samples.len(),
        clamped,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::params::DEFAULT_LIMIT_FRACTION;
    use approx::assert_relative_eq;
    use armor_config::{GenerationRequest, SizeClass};
    use armor_deform::Deformer;
    use armor_kernel::{CapFrame, EndCap, MeshKernel, Section, Tolerance, loft_sections};
    use armor_template::TemplateLibrary;
    use armor_types::{GeometryErrorKind, PieceKind, Point3, Vector3};
    use std::f64::consts::TAU;

    #[allow(clippy::cast_precision_loss)]
    fn tube(radius: f64, end: &EndCap) -> SolidMesh {
        let sections: Vec<Section> = (0..8)
            .map(|j| {
                let z = f64::from(j) * 5.0;
                Section::new(
                    (0..48)
                        .map(|i| {
                            let a = TAU * f64::from(i) / 48.0;
                            Point3::new(radius * a.cos(), radius * a.sin(), z)
                        })
                        .collect(),
                )
            })
            .collect();
        loft_sections(&sections, &EndCap::Open, end, Tolerance::default()).unwrap()
    }

    fn base(kind: PieceKind, request: &GenerationRequest) -> SolidMesh {
        let spec = TemplateLibrary::standard().spec(kind).unwrap();
        Deformer::new(&MeshKernel::new())
            .deform(&spec, request)
            .unwrap()
            .mesh
    }

    #[test]
    fn wide_tube_keeps_full_wall() {
        let kernel = MeshKernel::new();
        let shell = ShellingEngine::new(&kernel)
            .shell("tube", &tube(30.0, &EndCap::Flat), &ShellParams::new(3.0, 1.5))
            .unwrap();

        assert!(kernel.validate_manifold(&shell.mesh));
        assert_eq!(shell.report.clamped, 0);
        assert!(shell.report.within(0.05));
        assert_relative_eq!(shell.report.mean, 3.0, epsilon = 0.05);
        assert_eq!(shell.mesh.count_region(SurfaceRegion::Opening), 0);
        assert_eq!(shell.mesh.count_region(SurfaceRegion::Rim), 2 * 48);
        assert!(shell.mesh.volume() < tube(30.0, &EndCap::Flat).volume());
    }

    #[test]
    fn tight_tube_is_clamped() {
        let kernel = MeshKernel::new();
        let shell = ShellingEngine::new(&kernel)
            .shell("tube", &tube(3.0, &EndCap::Open), &ShellParams::new(4.0, 2.0))
            .unwrap();

        assert!(kernel.validate_manifold(&shell.mesh));
        assert_eq!(shell.report.clamped, shell.outer_vertices);
        for &d in &shell.distances {
            assert_relative_eq!(d, 3.0 * DEFAULT_LIMIT_FRACTION, epsilon = 0.01);
        }
        assert!(shell.report.within(0.05));
        assert_eq!(shell.mesh.count_region(SurfaceRegion::Rim), 4 * 48);
    }

    #[test]
    fn minimum_wall_violation() {
        let kernel = MeshKernel::new();
        let err = ShellingEngine::new(&kernel)
            .shell("tube", &tube(1.5, &EndCap::Open), &ShellParams::new(4.0, 2.0))
            .unwrap_err();
        assert_eq!(err.kind, GeometryErrorKind::WallThickness);
        assert_eq!(err.to_string(), "tube: wall thickness violation");
    }

    #[test]
    fn helmet_shell_is_valid() {
        let request = GenerationRequest::builder()
            .size(SizeClass::M)
            .detail(1)
            .build()
            .unwrap();
        let kernel = MeshKernel::new();
        let params = ShellParams::for_request(&request);
        let shell = ShellingEngine::new(&kernel)
            .shell("helmet", &base(PieceKind::Helmet, &request), &params)
            .unwrap();

        assert!(kernel.validate_manifold(&shell.mesh));
        assert!(shell.report.within(0.05 * params.thickness));
        assert!(shell.mesh.count_region(SurfaceRegion::Inner) > 0);
        assert!(shell.mesh.count_region(SurfaceRegion::Rim) > 0);
        let outer = shell.mesh.vertices[0];
        let inner = shell.mesh.vertices[shell.inner_of(0)];
        assert!((outer - inner).norm() >= params.min_thickness - 1e-9);
    }

    #[allow(clippy::cast_possible_wrap)]
    fn euler(mesh: &SolidMesh) -> i64 {
        mesh.vertex_count() as i64 - mesh.face_count() as i64 / 2
    }

    fn window(origin: Point3<f64>) -> Stencil {
        let frame = CapFrame {
            origin,
            u: Vector3::y(),
            v: Vector3::z(),
            normal: Vector3::x(),
        };
        Stencil::rectangle(frame, [-5.0, 5.0], [-4.0, 4.0])
    }

    #[test]
    fn window_cuts_through_a_tube_wall() {
        let kernel = MeshKernel::new();
        let engine = ShellingEngine::new(&kernel);
        let params = ShellParams::new(3.0, 1.5);
        let shell = engine
            .shell("tube", &tube(30.0, &EndCap::Flat), &params)
            .unwrap();
        let rims = shell.mesh.count_region(SurfaceRegion::Rim);
        let before = shell.mesh.volume();

        let cut = engine
            .cut_openings("tube", shell.mesh.clone(), &[window(Point3::new(30.0, 0.0, 17.5))], &params)
            .unwrap();
        assert!(kernel.validate_manifold(&cut));
        assert_eq!(euler(&shell.mesh), 2);
        assert_eq!(euler(&cut), 0);
        assert!(cut.count_region(SurfaceRegion::Rim) > rims);
        let removed = before - cut.volume();
        assert!((200.0..260.0).contains(&removed), "removed {removed}");

        let same = engine.cut_openings("tube", shell.mesh.clone(), &[], &params).unwrap();
        assert_eq!(same, shell.mesh);
    }

    #[test]
    fn window_off_the_wall_is_a_kernel_failure() {
        let kernel = MeshKernel::new();
        let engine = ShellingEngine::new(&kernel);
        let params = ShellParams::new(3.0, 1.5);
        let shell = engine
            .shell("tube", &tube(30.0, &EndCap::Flat), &params)
            .unwrap();
        let err = engine
            .cut_openings("tube", shell.mesh, &[window(Point3::new(30.0, 0.0, 200.0))], &params)
            .unwrap_err();
        assert!(matches!(err.kind, GeometryErrorKind::Kernel(_)), "{err}");
    }

    #[test]
    fn helmet_visor_opens_the_front() {
        let request = GenerationRequest::builder()
            .size(SizeClass::M)
            .detail(1)
            .build()
            .unwrap();
        let kernel = MeshKernel::new();
        let params = ShellParams::for_request(&request);
        let spec = TemplateLibrary::standard().spec(PieceKind::Helmet).unwrap();
        let deformed = Deformer::new(&kernel).deform(&spec, &request).unwrap();
        let engine = ShellingEngine::new(&kernel);
        let shell = engine.shell("helmet", &deformed.mesh, &params).unwrap();

        let stencils: Vec<Stencil> = deformed.plan.openings.iter().map(|o| o.stencil()).collect();
        assert_eq!(stencils.len(), 1);
        let cut = engine
            .cut_openings("helmet", shell.mesh.clone(), &stencils, &params)
            .unwrap();
        assert!(kernel.validate_manifold(&cut));
        assert_eq!(euler(&cut), euler(&shell.mesh) - 2);

        // New rim faces all sit on the front of the helm.
        let rims = |mesh: &SolidMesh| {
            mesh.faces_in(SurfaceRegion::Rim)
                .filter(|&f| mesh.triangle(f).iter().all(|p| p.y > 0.0))
                .count()
        };
        assert!(rims(&cut) > rims(&shell.mesh));
    }

    #[test]
    fn cuirass_keel_cannot_hold_thick_walls() {
        let request = GenerationRequest::builder()
            .size(SizeClass::M)
            .detail(1)
            .wall_thickness(8.0)
            .min_wall_thickness(7.0)
            .build()
            .unwrap();
        let kernel = MeshKernel::new();
        let params = ShellParams::for_request(&request);
        let engine = ShellingEngine::new(&kernel);

        let err = engine
            .shell("cuirass", &base(PieceKind::Cuirass, &request), &params)
            .unwrap_err();
        assert_eq!(err.reason(), "wall thickness violation");

        let greave = engine
            .shell("greave_left", &base(PieceKind::GreaveLeft, &request), &params)
            .unwrap();
        assert!(greave.report.within(0.05 * params.thickness));
    }
}
