//! Per-piece pipelines and the parallel join.

use armor_config::{GenerationRequest, GenerationRequestBuilder};
use armor_deform::{DeformError, Deformer};
use armor_kernel::{GeometryKernel, MeshKernel, Stencil};
use armor_mount::{MountPlacer, MountPoint, owner_index, rename_owner};
use armor_shell::{ShellingEngine, ThicknessReport};
use armor_split::{SplitReport, Splitter, SubPiece};
use armor_template::{PlanOpening, TemplateError, TemplateLibrary};
use armor_types::{GeometryError, PieceKind, Plane, SolidMesh};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::{
    CancelToken, EngineConfig, EngineError, EngineResult, Manifest, ManifestEntry, PieceError,
};

/// Every solid and record produced for one piece.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledPiece {
    /// The piece.
    pub kind: PieceKind,
    /// Output solids in order; one unless the piece was split.
    pub parts: Vec<SubPiece>,
    /// Carved mounts, each naming the part that carries it.
    pub mounts: Vec<MountPoint>,
    /// Sampled wall thickness of the unsplit shell.
    pub thickness: ThicknessReport,
    /// Cuts made, when splitting was enabled.
    pub split: Option<SplitReport>,
    /// Loft attempts used.
    pub attempts: u32,
    /// Mounts carved at reduced size.
    pub reduced_mounts: usize,
}

impl AssembledPiece {
    /// Output name of the piece.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Names of the output solids.
    #[must_use]
    pub fn part_names(&self) -> Vec<String> {
        self.parts.iter().map(|p| p.name.clone()).collect()
    }

    /// Total volume of the output solids.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.parts.iter().map(|p| p.mesh.volume()).sum()
    }

    /// The right-hand piece built from this left-hand one.
    ///
    /// Solids and mounts are reflected through the mid-sagittal plane and
    /// every name moves from this piece to `kind`.
    #[must_use]
    pub fn mirrored<K: GeometryKernel + ?Sized>(&self, kernel: &K, kind: PieceKind) -> Self {
        let plane = Plane::mid_sagittal();
        let from = self.kind.name();
        let to = kind.name();
        Self {
            kind,
            parts: self
                .parts
                .iter()
                .map(|p| SubPiece {
                    name: rename_owner(&p.name, from, to),
                    mesh: kernel.mirror(&p.mesh, &plane),
                })
                .collect(),
            mounts: self
                .mounts
                .iter()
                .map(|m| {
                    let mut twin = m.mirrored(&plane);
                    twin.owner = rename_owner(&m.owner, from, to);
                    twin
                })
                .collect(),
            thickness: self.thickness,
            split: self.split.as_ref().map(|r| r.mirrored(&plane, to)),
            attempts: self.attempts,
            reduced_mounts: self.reduced_mounts,
        }
    }
}

/// The finished solids of a run and its manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledSet {
    pieces: Vec<AssembledPiece>,
    manifest: Manifest,
}

impl AssembledSet {
    /// Output solids as `(name, mesh)`, in request order.
    pub fn solids(&self) -> impl Iterator<Item = (&str, &SolidMesh)> {
        self.pieces
            .iter()
            .flat_map(|p| p.parts.iter().map(|s| (s.name.as_str(), &s.mesh)))
    }

    /// A solid by output name.
    #[must_use]
    pub fn solid(&self, name: &str) -> Option<&SolidMesh> {
        self.solids().find(|(n, _)| *n == name).map(|(_, m)| m)
    }

    /// Number of output solids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pieces.iter().map(|p| p.parts.len()).sum()
    }

    /// Whether no solid was produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pieces that succeeded, in request order.
    #[must_use]
    pub fn pieces(&self) -> &[AssembledPiece] {
        &self.pieces
    }

    /// A successful piece.
    #[must_use]
    pub fn piece(&self, kind: PieceKind) -> Option<&AssembledPiece> {
        self.pieces.iter().find(|p| p.kind == kind)
    }

    /// Outcome of every requested piece.
    #[must_use]
    pub const fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Owned `(name, mesh)` pairs and the manifest, for exporters.
    #[must_use]
    pub fn into_parts(self) -> (Vec<(String, SolidMesh)>, Manifest) {
        let solids = self
            .pieces
            .into_iter()
            .flat_map(|p| p.parts.into_iter().map(|s| (s.name, s.mesh)))
            .collect();
        (solids, self.manifest)
    }
}

/// Why a pipeline stopped early.
enum Halt {
    Cancelled,
    Failed(PieceError),
}

impl From<PieceError> for Halt {
    fn from(err: PieceError) -> Self {
        Self::Failed(err)
    }
}

impl From<GeometryError> for Halt {
    fn from(err: GeometryError) -> Self {
        Self::Failed(err.into())
    }
}

impl From<TemplateError> for Halt {
    fn from(err: TemplateError) -> Self {
        Self::Failed(err.into())
    }
}

impl From<DeformError> for Halt {
    fn from(err: DeformError) -> Self {
        Self::Failed(err.into())
    }
}

/// Generates armor sets from requests.
///
/// Each distinct left or central piece runs its own pipeline: deform,
/// shell, plan mounts, split around them, carve the seats on the owning
/// parts. Right-hand pieces are mirrored from their left pipeline's result,
/// so a pair always matches exactly. Pipelines run on the rayon pool and a
/// failing piece never affects its siblings.
///
/// # Example
///
/// ```no_run
/// use armor_assembly::ArmorEngine;
/// use armor_config::{GenerationRequest, SizeClass};
/// use armor_types::PieceKind;
///
/// let request = GenerationRequest::builder()
///     .size(SizeClass::L)
///     .pieces(vec![PieceKind::Helmet, PieceKind::GreaveLeft, PieceKind::GreaveRight])
///     .build()
///     .unwrap();
/// let set = ArmorEngine::new().generate(&request).unwrap();
/// for (name, mesh) in set.solids() {
///     println!("{name}: {} faces", mesh.face_count());
/// }
/// print!("{}", set.manifest());
/// ```
#[derive(Debug, Clone)]
pub struct ArmorEngine<K: GeometryKernel = MeshKernel> {
    kernel: K,
    library: TemplateLibrary,
    config: EngineConfig,
}

impl Default for ArmorEngine<MeshKernel> {
    fn default() -> Self {
        Self::new()
    }
}

impl ArmorEngine<MeshKernel> {
    /// An engine with the mesh kernel, the standard templates and default
    /// settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_kernel(MeshKernel::new())
    }
}

impl<K: GeometryKernel> ArmorEngine<K> {
    /// An engine on another geometry kernel.
    #[must_use]
    pub fn with_kernel(kernel: K) -> Self {
        Self {
            kernel,
            library: TemplateLibrary::standard(),
            config: EngineConfig::default(),
        }
    }

    /// Replace the template library.
    #[must_use]
    pub fn with_library(mut self, library: TemplateLibrary) -> Self {
        self.library = library;
        self
    }

    /// Replace the settings.
    #[must_use]
    pub const fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// The settings in use.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The geometry kernel.
    #[must_use]
    pub const fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Validate a request under construction, then generate it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] without doing any geometry work
    /// if the request is invalid.
    pub fn generate_from(&self, builder: GenerationRequestBuilder) -> EngineResult<AssembledSet> {
        let request = builder.build()?;
        self.generate(&request)
    }

    /// Generate every requested piece.
    ///
    /// # Errors
    ///
    /// Never fails for piece-level problems; those are reported in the
    /// manifest. See [`ArmorEngine::generate_with_cancel`].
    pub fn generate(&self, request: &GenerationRequest) -> EngineResult<AssembledSet> {
        self.generate_with_cancel(request, &CancelToken::new())
    }

    /// Generate every requested piece, checking `cancel` between stages.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Cancelled`] if the token was cancelled before
    /// the join; completed pieces are discarded.
    pub fn generate_with_cancel(
        &self,
        request: &GenerationRequest,
        cancel: &CancelToken,
    ) -> EngineResult<AssembledSet> {
        let requested = request.pieces();
        let mut sources: Vec<PieceKind> = Vec::with_capacity(requested.len());
        for kind in requested {
            let source = kind.source();
            if !sources.contains(&source) {
                sources.push(source);
            }
        }
        info!(
            pieces = requested.len(),
            pipelines = sources.len(),
            detail = request.detail().get(),
            scale = request.scale(),
            "generation started"
        );

        let run = |&kind: &PieceKind| (kind, self.run_pipeline(kind, request, cancel));
        let outcomes: Vec<(PieceKind, Result<AssembledPiece, Halt>)> = if self.config.parallel {
            sources.par_iter().map(run).collect()
        } else {
            sources.iter().map(run).collect()
        };

        let halted = outcomes
            .iter()
            .any(|(_, outcome)| matches!(outcome, Err(Halt::Cancelled)));
        if halted || cancel.is_cancelled() {
            warn!("generation cancelled");
            return Err(EngineError::Cancelled);
        }

        let mut manifest = Manifest::new(request.color_scheme());
        let mut pieces = Vec::with_capacity(requested.len());
        for &kind in requested {
            let Some((_, outcome)) = outcomes.iter().find(|(k, _)| *k == kind.source()) else {
                continue;
            };
            match outcome {
                Ok(source) => {
                    let piece = if kind == source.kind {
                        source.clone()
                    } else {
                        source.mirrored(&self.kernel, kind)
                    };
                    manifest
                        .entries
                        .push(ManifestEntry::ok(kind.name(), piece.part_names()));
                    pieces.push(piece);
                }
                Err(Halt::Failed(err)) => {
                    let err = err.clone().for_piece(kind.name());
                    warn!(piece = kind.name(), reason = %err.reason(), "piece failed");
                    manifest
                        .entries
                        .push(ManifestEntry::failed(kind.name(), err.reason()));
                }
                Err(Halt::Cancelled) => return Err(EngineError::Cancelled),
            }
        }

        info!(
            ok = manifest.ok_count(),
            failed = manifest.entries.len() - manifest.ok_count(),
            solids = pieces.iter().map(|p| p.parts.len()).sum::<usize>(),
            "generation finished"
        );
        Ok(AssembledSet { pieces, manifest })
    }

    /// Run the pipeline for one piece on its own.
    ///
    /// Right-hand pieces run their left pipeline and are mirrored.
    ///
    /// # Errors
    ///
    /// Returns the piece's failure, attributed to `kind`.
    pub fn generate_piece(
        &self,
        kind: PieceKind,
        request: &GenerationRequest,
    ) -> Result<AssembledPiece, PieceError> {
        let never = CancelToken::new();
        match self.run_pipeline(kind.source(), request, &never) {
            Ok(source) if kind.is_mirrored() => Ok(source.mirrored(&self.kernel, kind)),
            Ok(source) => Ok(source),
            Err(Halt::Failed(err)) => Err(err.for_piece(kind.name())),
            Err(Halt::Cancelled) => Err(GeometryError::kernel(kind.name(), "cancelled").into()),
        }
    }

    fn run_pipeline(
        &self,
        kind: PieceKind,
        request: &GenerationRequest,
        cancel: &CancelToken,
    ) -> Result<AssembledPiece, Halt> {
        let piece = kind.name();
        let checkpoint = || {
            if cancel.is_cancelled() {
                Err(Halt::Cancelled)
            } else {
                Ok(())
            }
        };

        checkpoint()?;
        let spec = self.library.spec(kind)?;
        let deformed = Deformer::new(&self.kernel)
            .with_params(self.config.deform_params())
            .deform(&spec, request)?;

        checkpoint()?;
        let shelling = ShellingEngine::new(&self.kernel);
        let shell_params = self.config.shell_params(request);
        let shell = shelling.shell(piece, &deformed.mesh, &shell_params)?;
        let openings: Vec<Stencil> = deformed
            .plan
            .openings
            .iter()
            .map(PlanOpening::stencil)
            .collect();
        let mesh = shelling.cut_openings(piece, shell.mesh, &openings, &shell_params)?;

        checkpoint()?;
        let placer = MountPlacer::new(&self.kernel, self.config.mount_params(request));
        let planned = if request.include_mounts() {
            placer.plan(
                piece,
                &spec,
                &deformed.plan,
                &mesh,
                request.measurements(),
            )?
        } else {
            Vec::new()
        };

        checkpoint()?;
        let (parts, split) = if request.split_for_printing() {
            let split = Splitter::new(&self.kernel, self.config.split_params(request)).split(
                piece,
                &mesh,
                &spec.seams,
                &planned,
            )?;
            (split.parts, Some(split.report))
        } else {
            let whole = SubPiece {
                name: piece.to_string(),
                mesh,
            };
            (vec![whole], None)
        };

        checkpoint()?;
        let (parts, mounts, reduced_mounts) = carve_parts(piece, &placer, parts, planned)?;

        info!(
            piece,
            parts = parts.len(),
            mounts = mounts.len(),
            attempts = deformed.attempts,
            "piece finished"
        );
        Ok(AssembledPiece {
            kind,
            parts,
            mounts,
            thickness: shell.report,
            split,
            attempts: deformed.attempts,
            reduced_mounts,
        })
    }
}

/// Carve each planned mount on the part whose exterior is nearest to it.
fn carve_parts<K: GeometryKernel + ?Sized>(
    piece: &str,
    placer: &MountPlacer<'_, K>,
    parts: Vec<SubPiece>,
    planned: Vec<MountPoint>,
) -> Result<(Vec<SubPiece>, Vec<MountPoint>, usize), GeometryError> {
    if planned.is_empty() {
        return Ok((parts, Vec::new(), 0));
    }

    let mut groups: Vec<Vec<MountPoint>> = vec![Vec::new(); parts.len()];
    {
        let meshes: Vec<&SolidMesh> = parts.iter().map(|p| &p.mesh).collect();
        for mount in planned {
            let owner =
                owner_index(&mount, &meshes).ok_or_else(|| GeometryError::mount_cavity(piece))?;
            groups[owner].push(mount);
        }
    }

    let mut carved_parts = Vec::with_capacity(parts.len());
    let mut mounts = Vec::new();
    let mut reduced = 0;
    for (part, group) in parts.into_iter().zip(groups) {
        if group.is_empty() {
            carved_parts.push(part);
            continue;
        }
        let carved = placer
            .carve(&part.name, &part.mesh, &group)
            .map_err(|err| err.for_piece(piece))?;
        reduced += carved.reduced;
        mounts.extend(carved.mounts);
        carved_parts.push(SubPiece {
            name: part.name,
            mesh: carved.mesh,
        });
    }
    Ok((carved_parts, mounts, reduced))
}
