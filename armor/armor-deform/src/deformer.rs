//! Template evaluation, lofting and the bounded relaxation retry.

use crate::error::DeformResult;
use crate::params::DeformParams;
use armor_config::GenerationRequest;
use armor_kernel::GeometryKernel;
use armor_template::{ArmorPieceSpec, LoftPlan, Relaxation, TemplateError};
use armor_types::{GeometryError, SolidMesh};
use tracing::{info, warn};

/// A lofted base solid, before shelling.
#[derive(Debug, Clone)]
pub struct DeformedPiece {
    /// Closed outer solid. Open ends are tagged as openings.
    pub mesh: SolidMesh,
    /// The plan the solid was lofted from.
    pub plan: LoftPlan,
    /// Attempts used, starting at one.
    pub attempts: u32,
    /// Relaxation of the successful attempt.
    pub relaxation: Relaxation,
}

/// Turns piece specs into validated base solids.
///
/// Works on the left-hand (or central) geometry of a spec; right-hand pieces
/// are reflected from the finished left piece by the engine.
#[derive(Debug, Clone, Copy)]
pub struct Deformer<'k, K: GeometryKernel + ?Sized> {
    kernel: &'k K,
    params: DeformParams,
}

impl<'k, K: GeometryKernel + ?Sized> Deformer<'k, K> {
    /// Create a deformer with default parameters.
    #[must_use]
    pub fn new(kernel: &'k K) -> Self {
        Self {
            kernel,
            params: DeformParams::default(),
        }
    }

    /// Replace the parameters.
    #[must_use]
    pub const fn with_params(mut self, params: DeformParams) -> Self {
        self.params = params;
        self
    }

    /// The parameters in use.
    #[must_use]
    pub const fn params(&self) -> &DeformParams {
        &self.params
    }

    /// Evaluate and loft a piece.
    ///
    /// Each attempt lofts the template at a looser [`Relaxation`]. A kernel
    /// failure is retried once at the relaxed tolerance before it fails the
    /// piece.
    ///
    /// # Errors
    ///
    /// - [`TemplateError`] if the template parameters are out of range
    /// - [`GeometryError`] with a kernel reason if a loft fails twice
    /// - [`GeometryError`] "non-manifold after N attempts" if no attempt
    ///   produced a valid solid
    pub fn deform(
        &self,
        spec: &ArmorPieceSpec,
        request: &GenerationRequest,
    ) -> DeformResult<DeformedPiece> {
        let piece = spec.kind.name();
        let attempts = self.params.max_attempts;

        for attempt in 0..attempts {
            let relaxation = Relaxation::for_attempt(attempt, attempts);
            let plan = match spec.params.loft_plan(request, relaxation) {
                Ok(plan) => plan,
                Err(err @ TemplateError::Degenerate { .. }) => {
                    warn!(piece, attempt = attempt + 1, error = %err, "template degenerate, relaxing");
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            let sections = plan.sections();
            let (start, end) = plan.caps();
            let mesh = self
                .params
                .tolerance
                .retry_relaxed(|tol| self.kernel.loft(&sections, &start, &end, tol))
                .map_err(|err| GeometryError::kernel(piece, err.to_string()))?;

            if self.kernel.validate_manifold(&mesh) {
                info!(
                    piece,
                    attempt = attempt + 1,
                    vertices = mesh.vertex_count(),
                    faces = mesh.face_count(),
                    "piece deformed"
                );
                return Ok(DeformedPiece {
                    mesh,
                    plan,
                    attempts: attempt + 1,
                    relaxation,
                });
            }

            let report = self.kernel.report(&mesh);
            warn!(piece, attempt = attempt + 1, %report, "lofted solid invalid, relaxing");
        }

        Err(GeometryError::non_manifold(piece, attempts).into())
    }

}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::DeformError;
    use armor_config::SizeClass;
    use armor_kernel::{
        BooleanOp, EndCap, KernelError, KernelResult, MeshKernel, Operand, Section, Tolerance,
    };
    use armor_template::{HelmetParams, TemplateLibrary, TemplateParams};
    use armor_types::{GeometryErrorKind, PieceKind, Plane, SurfaceRegion};
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Rejects the first few solids it validates, and optionally fails lofts
    /// at the strict tolerance.
    #[derive(Default)]
    struct FlakyKernel {
        inner: MeshKernel,
        rejections: AtomicU32,
        strict_lofts_fail: bool,
        lofts_fail: bool,
        lofts: AtomicU32,
    }

    impl GeometryKernel for FlakyKernel {
        fn loft(
            &self,
            sections: &[Section],
            start: &EndCap,
            end: &EndCap,
            tol: Tolerance,
        ) -> KernelResult<SolidMesh> {
            self.lofts.fetch_add(1, Ordering::SeqCst);
            if self.lofts_fail || (self.strict_lofts_fail && tol == Tolerance::default()) {
                return Err(KernelError::degenerate("coincident section points"));
            }
            self.inner.loft(sections, start, end, tol)
        }

        fn offset(
            &self,
            surface: &SolidMesh,
            distances: &[f64],
            tol: Tolerance,
        ) -> KernelResult<SolidMesh> {
            self.inner.offset(surface, distances, tol)
        }

        fn boolean(
            &self,
            op: BooleanOp,
            a: &SolidMesh,
            b: Operand<'_>,
            tol: Tolerance,
        ) -> KernelResult<SolidMesh> {
            self.inner.boolean(op, a, b, tol)
        }

        fn validate_manifold(&self, mesh: &SolidMesh) -> bool {
            let pending = self.rejections.load(Ordering::SeqCst);
            if pending > 0 {
                self.rejections.store(pending - 1, Ordering::SeqCst);
                return false;
            }
            self.inner.validate_manifold(mesh)
        }

        fn mirror(&self, mesh: &SolidMesh, plane: &Plane) -> SolidMesh {
            self.inner.mirror(mesh, plane)
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest::builder()
            .size(SizeClass::M)
            .detail(1)
            .build()
            .unwrap()
    }

    fn spec(kind: PieceKind) -> ArmorPieceSpec {
        TemplateLibrary::standard().spec(kind).unwrap()
    }

    #[test]
    fn helmet_first_attempt() {
        let kernel = MeshKernel::new();
        let piece = Deformer::new(&kernel)
            .deform(&spec(PieceKind::Helmet), &request())
            .unwrap();
        assert_eq!(piece.attempts, 1);
        assert_eq!(piece.relaxation, Relaxation::default());
        assert!(kernel.validate_manifold(&piece.mesh));
        assert!(piece.mesh.count_region(SurfaceRegion::Opening) > 0);
    }

    #[test]
    fn invalid_solids_relax_until_valid() {
        let kernel = FlakyKernel {
            rejections: AtomicU32::new(2),
            ..FlakyKernel::default()
        };
        let piece = Deformer::new(&kernel)
            .deform(&spec(PieceKind::GreaveLeft), &request())
            .unwrap();
        assert_eq!(piece.attempts, 3);
        assert!(piece.relaxation.overlap < Relaxation::MAX_OVERLAP);
        assert!(piece.relaxation.feature_gain < 1.0);
    }

    #[test]
    fn attempts_exhausted() {
        let kernel = FlakyKernel {
            rejections: AtomicU32::new(100),
            ..FlakyKernel::default()
        };
        let err = Deformer::new(&kernel)
            .deform(&spec(PieceKind::Helmet), &request())
            .unwrap_err();
        let DeformError::Geometry(err) = err else {
            panic!("expected a geometry error");
        };
        assert_eq!(err.piece, "helmet");
        assert_eq!(err.reason(), "non-manifold after 4 attempts");
        assert_eq!(kernel.lofts.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn kernel_failure_retried_relaxed() {
        let kernel = FlakyKernel {
            strict_lofts_fail: true,
            ..FlakyKernel::default()
        };
        let piece = Deformer::new(&kernel)
            .deform(&spec(PieceKind::PoleynLeft), &request())
            .unwrap();
        assert_eq!(piece.attempts, 1);
        assert_eq!(kernel.lofts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn kernel_failure_escalates() {
        let kernel = FlakyKernel {
            lofts_fail: true,
            ..FlakyKernel::default()
        };
        let err = Deformer::new(&kernel)
            .deform(&spec(PieceKind::Cuirass), &request())
            .unwrap_err();
        let DeformError::Geometry(err) = err else {
            panic!("expected a geometry error");
        };
        assert!(matches!(err.kind, GeometryErrorKind::Kernel(_)));
        assert_eq!(kernel.lofts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn bad_parameters_fail_without_lofting() {
        let kernel = FlakyKernel::default();
        let bad = ArmorPieceSpec::new(
            PieceKind::Helmet,
            TemplateParams::Helmet(HelmetParams {
                coverage: 5.0,
                ..HelmetParams::default()
            }),
        );
        let err = Deformer::new(&kernel).deform(&bad, &request()).unwrap_err();
        assert!(matches!(err, DeformError::Template(_)));
        assert_eq!(kernel.lofts.load(Ordering::SeqCst), 0);
    }
}
