//! Per-family template parameters and their evaluation into loft plans.
//!
//! Every family describes its outer surface as a stack of section rings
//! around a piece axis. Girths come from the measurement profile plus the fit
//! clearance; the wall thickness is added outside, so the inner surface left
//! by shelling clears the body.

use crate::curve::{Bump, RingShape, ring_angles, semi_axes_for_perimeter};
use crate::error::{TemplateError, TemplateResult};
use crate::frame::PieceFrame;
use crate::plan::{LoftPlan, PlanCap, PlanOpening};
use armor_config::{Dimension, GenerationRequest, MeasurementProfile};
use armor_types::{PieceFamily, Point3};
use std::f64::consts::{FRAC_PI_2, PI};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bounded loosening applied on loft retries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Relaxation {
    /// Fraction by which plates extend past the body segment they cover.
    pub overlap: f64,
    /// Multiplier on feature bump heights.
    pub feature_gain: f64,
}

impl Relaxation {
    /// Plate overlap on the first attempt.
    pub const MAX_OVERLAP: f64 = 0.12;
    /// Plate overlap on the last attempt.
    pub const MIN_OVERLAP: f64 = 0.08;
    /// Feature gain on the last attempt.
    pub const MIN_GAIN: f64 = 0.4;

    /// Relaxation for a zero-based attempt out of `attempts`.
    #[must_use]
    pub fn for_attempt(attempt: u32, attempts: u32) -> Self {
        let t = if attempts > 1 {
            (f64::from(attempt) / f64::from(attempts - 1)).min(1.0)
        } else {
            0.0
        };
        Self {
            overlap: Self::MAX_OVERLAP + (Self::MIN_OVERLAP - Self::MAX_OVERLAP) * t,
            feature_gain: 1.0 + (Self::MIN_GAIN - 1.0) * t,
        }
    }
}

impl Default for Relaxation {
    fn default() -> Self {
        Self::for_attempt(0, 1)
    }
}

/// Full-size height of a standard visor slit, millimeters.
const VISOR_HEIGHT: f64 = 12.0;

/// Visor slit width as a fraction of the fitted head width.
const VISOR_WIDTH: f64 = 0.7;

/// Proportions of the horizontal eye slit cut through a helm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum VisorStyle {
    /// Head-width slit of moderate height.
    Standard,
    /// Low slit for a closed look.
    Narrow,
    /// Wider and taller slit for visibility.
    Wide,
}

impl VisorStyle {
    /// Snake-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Narrow => "narrow",
            Self::Wide => "wide",
        }
    }

    /// Slit `(width, height)` before print scaling.
    #[must_use]
    pub fn size(self, head_width: f64) -> (f64, f64) {
        let width = VISOR_WIDTH * head_width;
        match self {
            Self::Standard => (width, VISOR_HEIGHT),
            Self::Narrow => (width, 0.6 * VISOR_HEIGHT),
            Self::Wide => (1.1 * width, 1.5 * VISOR_HEIGHT),
        }
    }
}

/// Full helm: an elliptic dome over a slightly tapered skirt.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HelmetParams {
    /// Head height covered, before plate overlap.
    pub coverage: f64,
    /// Axial fraction where the dome begins.
    pub dome_start: f64,
    /// Inward taper of the skirt towards the neck.
    pub neck_taper: f64,
    /// Brow ridge height, millimeters.
    pub brow_ridge: f64,
    /// Eye slit, or `None` for a closed helm.
    pub visor: Option<VisorStyle>,
    /// Axial fraction of the slit centre.
    pub visor_level: f64,
}

impl Default for HelmetParams {
    fn default() -> Self {
        Self {
            coverage: 0.80,
            dome_start: 0.42,
            neck_taper: 0.06,
            brow_ridge: 6.0,
            visor: Some(VisorStyle::Standard),
            visor_level: 0.38,
        }
    }
}

/// Torso shell with a sternal keel.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CuirassParams {
    /// Depth-to-width ratio of the torso section.
    pub aspect: f64,
    /// Keel height at mid-torso, millimeters.
    pub keel_height: f64,
    /// Keel angular width, radians.
    pub keel_width: f64,
    /// Sample crowding around the keel, `[0, 1)`.
    pub keel_warp: f64,
    /// Girth at the shoulder line relative to the chest.
    pub shoulder_taper: f64,
}

impl Default for CuirassParams {
    fn default() -> Self {
        Self {
            aspect: 0.62,
            keel_height: 20.0,
            keel_width: 0.093,
            keel_warp: 0.75,
            shoulder_taper: 0.9,
        }
    }
}

/// Shoulder cap with a short skirt down the upper arm.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PauldronParams {
    /// Base girth relative to shoulder circumference.
    pub spread: f64,
    /// Depth-to-width ratio of the base ring.
    pub aspect: f64,
    /// Dome height relative to the base semi-axis.
    pub cap_ratio: f64,
    /// Skirt length as a fraction of upper arm length, before overlap.
    pub drop: f64,
    /// Front flange height, millimeters.
    pub flange: f64,
}

impl Default for PauldronParams {
    fn default() -> Self {
        Self {
            spread: 1.3,
            aspect: 0.9,
            cap_ratio: 0.6,
            drop: 0.3,
            flange: 5.0,
        }
    }
}

/// Open tube around a limb segment.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TubeParams {
    /// Segment length covered, before plate overlap.
    pub coverage: f64,
    /// Depth-to-width ratio of the section.
    pub aspect: f64,
    /// Front ridge height, millimeters.
    pub ridge: f64,
    /// Front ridge angular width, radians.
    pub ridge_width: f64,
}

/// Forearm tube.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VambraceParams {
    /// Tube shape.
    pub tube: TubeParams,
    /// Girth flare at the wrist opening.
    pub cuff_flare: f64,
}

impl Default for VambraceParams {
    fn default() -> Self {
        Self {
            tube: TubeParams {
                coverage: 0.85,
                aspect: 0.85,
                ridge: 4.0,
                ridge_width: 0.45,
            },
            cuff_flare: 1.08,
        }
    }
}

/// Mitten closed at the fingertips.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GauntletParams {
    /// Thickness-to-width ratio of the hand section.
    pub aspect: f64,
    /// Girth flare at the cuff.
    pub cuff_flare: f64,
    /// Axial fraction taken by the fingertip dome.
    pub tip_fraction: f64,
    /// Thumb-side ridge height, millimeters.
    pub thumb_ridge: f64,
}

impl Default for GauntletParams {
    fn default() -> Self {
        Self {
            aspect: 0.5,
            cuff_flare: 1.12,
            tip_fraction: 0.35,
            thumb_ridge: 3.0,
        }
    }
}

/// Thigh tube.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CuisseParams {
    /// Tube shape.
    pub tube: TubeParams,
}

impl Default for CuisseParams {
    fn default() -> Self {
        Self {
            tube: TubeParams {
                coverage: 0.75,
                aspect: 0.9,
                ridge: 4.0,
                ridge_width: 0.5,
            },
        }
    }
}

/// Knee cop: a short band with a raised front plate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoleynParams {
    /// Band length relative to the knee diameter, before overlap.
    pub length: f64,
    /// Depth-to-width ratio of the band.
    pub aspect: f64,
    /// Cop height at the kneecap, millimeters.
    pub cop_height: f64,
    /// Cop angular width, radians.
    pub cop_width: f64,
}

impl Default for PoleynParams {
    fn default() -> Self {
        Self {
            length: 0.55,
            aspect: 0.9,
            cop_height: 12.0,
            cop_width: 0.6,
        }
    }
}

/// Shin tube.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GreaveParams {
    /// Tube shape.
    pub tube: TubeParams,
}

impl Default for GreaveParams {
    fn default() -> Self {
        Self {
            tube: TubeParams {
                coverage: 0.85,
                aspect: 0.85,
                ridge: 5.0,
                ridge_width: 0.35,
            },
        }
    }
}

/// Foot shell open at the heel, closed at the toe.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SabatonParams {
    /// Instep height relative to foot length.
    pub instep: f64,
    /// Axial fraction taken by the toe dome.
    pub toe_fraction: f64,
    /// Instep lowering towards the toe.
    pub toe_drop: f64,
    /// Top ridge height, millimeters.
    pub ridge: f64,
}

impl Default for SabatonParams {
    fn default() -> Self {
        Self {
            instep: 0.32,
            toe_fraction: 0.4,
            toe_drop: 0.3,
            ridge: 3.0,
        }
    }
}

/// The shape family of a piece, with its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[allow(missing_docs)]
pub enum TemplateParams {
    Helmet(HelmetParams),
    Cuirass(CuirassParams),
    Pauldron(PauldronParams),
    Vambrace(VambraceParams),
    Gauntlet(GauntletParams),
    Cuisse(CuisseParams),
    Poleyn(PoleynParams),
    Greave(GreaveParams),
    Sabaton(SabatonParams),
}

impl TemplateParams {
    /// Default parameters for a family.
    #[must_use]
    pub fn standard(family: PieceFamily) -> Self {
        match family {
            PieceFamily::Helmet => Self::Helmet(HelmetParams::default()),
            PieceFamily::Cuirass => Self::Cuirass(CuirassParams::default()),
            PieceFamily::Pauldron => Self::Pauldron(PauldronParams::default()),
            PieceFamily::Vambrace => Self::Vambrace(VambraceParams::default()),
            PieceFamily::Gauntlet => Self::Gauntlet(GauntletParams::default()),
            PieceFamily::Cuisse => Self::Cuisse(CuisseParams::default()),
            PieceFamily::Poleyn => Self::Poleyn(PoleynParams::default()),
            PieceFamily::Greave => Self::Greave(GreaveParams::default()),
            PieceFamily::Sabaton => Self::Sabaton(SabatonParams::default()),
        }
    }

    /// The family these parameters describe.
    #[must_use]
    pub const fn family(&self) -> PieceFamily {
        match self {
            Self::Helmet(_) => PieceFamily::Helmet,
            Self::Cuirass(_) => PieceFamily::Cuirass,
            Self::Pauldron(_) => PieceFamily::Pauldron,
            Self::Vambrace(_) => PieceFamily::Vambrace,
            Self::Gauntlet(_) => PieceFamily::Gauntlet,
            Self::Cuisse(_) => PieceFamily::Cuisse,
            Self::Poleyn(_) => PieceFamily::Poleyn,
            Self::Greave(_) => PieceFamily::Greave,
            Self::Sabaton(_) => PieceFamily::Sabaton,
        }
    }

    /// Check parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::InvalidParameter`] naming the first bad value.
    pub fn validate(&self) -> TemplateResult<()> {
        let checks: Vec<(&'static str, f64, f64, f64)> = match self {
            Self::Helmet(p) => vec![
                ("coverage", p.coverage, 0.3, 1.2),
                ("dome_start", p.dome_start, 0.1, 0.9),
                ("neck_taper", p.neck_taper, 0.0, 0.3),
                ("brow_ridge", p.brow_ridge, 0.0, 20.0),
                ("visor_level", p.visor_level, 0.1, 0.8),
            ],
            Self::Cuirass(p) => vec![
                ("aspect", p.aspect, 0.3, 1.0),
                ("keel_height", p.keel_height, 0.0, 40.0),
                ("keel_width", p.keel_width, 0.02, 1.0),
                ("keel_warp", p.keel_warp, 0.0, 0.9),
                ("shoulder_taper", p.shoulder_taper, 0.6, 1.2),
            ],
            Self::Pauldron(p) => vec![
                ("spread", p.spread, 1.0, 2.0),
                ("aspect", p.aspect, 0.3, 1.0),
                ("cap_ratio", p.cap_ratio, 0.3, 1.5),
                ("drop", p.drop, 0.05, 0.8),
                ("flange", p.flange, 0.0, 20.0),
            ],
            Self::Vambrace(p) => {
                let mut v = tube_checks(&p.tube);
                v.push(("cuff_flare", p.cuff_flare, 1.0, 1.5));
                v
            }
            Self::Gauntlet(p) => vec![
                ("aspect", p.aspect, 0.3, 1.0),
                ("cuff_flare", p.cuff_flare, 1.0, 1.5),
                ("tip_fraction", p.tip_fraction, 0.15, 0.6),
                ("thumb_ridge", p.thumb_ridge, 0.0, 10.0),
            ],
            Self::Cuisse(p) => tube_checks(&p.tube),
            Self::Poleyn(p) => vec![
                ("length", p.length, 0.2, 1.2),
                ("aspect", p.aspect, 0.3, 1.0),
                ("cop_height", p.cop_height, 0.0, 30.0),
                ("cop_width", p.cop_width, 0.1, 1.5),
            ],
            Self::Greave(p) => tube_checks(&p.tube),
            Self::Sabaton(p) => vec![
                ("instep", p.instep, 0.15, 0.5),
                ("toe_fraction", p.toe_fraction, 0.15, 0.6),
                ("toe_drop", p.toe_drop, 0.0, 0.6),
                ("ridge", p.ridge, 0.0, 10.0),
            ],
        };
        for (name, value, min, max) in checks {
            if !value.is_finite() || value < min || value > max {
                return Err(TemplateError::InvalidParameter {
                    family: self.family(),
                    name,
                    value,
                });
            }
        }
        Ok(())
    }

    /// Evaluate the template for a request at one relaxation step.
    ///
    /// Shapes are computed at full size and then scaled by the request's
    /// print scale. The detail level only sets sample counts.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::InvalidParameter`] for out-of-range parameters,
    /// or [`TemplateError::Degenerate`] if the measurements collapse a ring.
    pub fn loft_plan(
        &self,
        request: &GenerationRequest,
        relaxation: Relaxation,
    ) -> TemplateResult<LoftPlan> {
        self.validate()?;
        let ctx = Context {
            m: request.measurements(),
            wall: request.wall_thickness(),
            ring_samples: request.detail().ring_samples(),
            stations: request.detail().stations(),
            relax: relaxation,
        };

        let plan = match self {
            Self::Helmet(p) => helmet(p, &ctx),
            Self::Cuirass(p) => cuirass(p, &ctx),
            Self::Pauldron(p) => pauldron(p, &ctx),
            Self::Vambrace(p) => vambrace(p, &ctx),
            Self::Gauntlet(p) => gauntlet(p, &ctx),
            Self::Cuisse(p) => cuisse(p, &ctx),
            Self::Poleyn(p) => poleyn(p, &ctx),
            Self::Greave(p) => greave(p, &ctx),
            Self::Sabaton(p) => sabaton(p, &ctx),
        };

        for (j, ring) in plan.rings.iter().enumerate() {
            let finite = [ring.w, ring.cu, ring.cv, ring.a, ring.b]
                .iter()
                .all(|x| x.is_finite());
            if !finite || ring.a <= 0.0 || ring.b <= 0.0 {
                return Err(TemplateError::Degenerate {
                    family: self.family(),
                    ring: j,
                });
            }
        }

        debug!(
            family = self.family().name(),
            rings = plan.rings.len(),
            samples = plan.angles.len(),
            overlap = relaxation.overlap,
            gain = relaxation.feature_gain,
            "template evaluated"
        );
        Ok(plan.scaled(request.scale()))
    }
}

fn tube_checks(t: &TubeParams) -> Vec<(&'static str, f64, f64, f64)> {
    vec![
        ("coverage", t.coverage, 0.2, 1.2),
        ("aspect", t.aspect, 0.3, 1.0),
        ("ridge", t.ridge, 0.0, 20.0),
        ("ridge_width", t.ridge_width, 0.1, 1.5),
    ]
}

// =============================================================================
// Evaluation helpers
// =============================================================================

struct Context<'a> {
    m: &'a MeasurementProfile,
    wall: f64,
    ring_samples: usize,
    stations: usize,
    relax: Relaxation,
}

impl Context<'_> {
    fn fitted(&self, d: Dimension) -> f64 {
        self.m.fitted(d)
    }

    fn get(&self, d: Dimension) -> f64 {
        self.m.get(d)
    }

    fn gain(&self) -> f64 {
        self.relax.feature_gain
    }

    fn overlap(&self) -> f64 {
        self.relax.overlap
    }

    /// Outer semi-axes `(a, b)` for a fitted girth: the body ellipse plus
    /// the wall.
    fn semi_axes(&self, perimeter: f64, aspect: f64) -> (f64, f64) {
        let (a, b) = semi_axes_for_perimeter(perimeter, aspect);
        (a + self.wall, b + self.wall)
    }

    /// Lateral offset of a limb's axis from the mid-sagittal plane.
    fn arm_x(&self) -> f64 {
        self.get(Dimension::ShoulderWidth) / 2.0
            + self.get(Dimension::UpperArmCircumference) / (2.0 * PI)
    }

    fn leg_x(&self) -> f64 {
        self.get(Dimension::HipCircumference) / (4.0 * PI)
    }

    fn knee_z(&self) -> f64 {
        self.get(Dimension::CalfLength) + 0.04 * self.get(Dimension::Height)
    }

    fn wrist_z(&self) -> f64 {
        0.47 * self.get(Dimension::Height)
    }
}

/// Piecewise smoothstep interpolation through `(s, value)` knots.
fn smooth_knots(knots: &[(f64, f64)], s: f64) -> f64 {
    let Some(&(s0, v0)) = knots.first() else {
        return 0.0;
    };
    if s <= s0 {
        return v0;
    }
    for pair in knots.windows(2) {
        let ((sa, va), (sb, vb)) = (pair[0], pair[1]);
        if s <= sb {
            let t = ((s - sa) / (sb - sa)).clamp(0.0, 1.0);
            let t = t * t * (3.0 - 2.0 * t);
            return va + (vb - va) * t;
        }
    }
    knots.last().map_or(v0, |k| k.1)
}

/// Evenly spaced axial fractions `0..=1`.
#[allow(clippy::cast_precision_loss)]
fn tube_stations(n: usize) -> Vec<f64> {
    let n = n.max(2);
    (0..n).map(|j| j as f64 / (n - 1) as f64).collect()
}

/// Axial fractions and radial scales for a dome-topped piece.
///
/// The skirt `[0, start)` gets evenly spaced stations at full scale; the dome
/// is sampled by latitude so rings crowd towards the apex at `s = 1`, which
/// is not included.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn dome_stations(n: usize, start: f64) -> Vec<(f64, f64)> {
    let skirt = ((n as f64 * start).round() as usize).max(2);
    let dome = n.saturating_sub(skirt).max(4);
    let mut out = Vec::with_capacity(skirt + dome);
    for j in 0..skirt {
        out.push((start * j as f64 / skirt as f64, 1.0));
    }
    for i in 0..dome {
        let phi = FRAC_PI_2 * i as f64 / dome as f64;
        out.push((start + (1.0 - start) * phi.sin(), phi.cos()));
    }
    out
}

fn apex_on_axis(length: f64) -> PlanCap {
    PlanCap::Apex {
        u: 0.0,
        v: 0.0,
        w: length,
    }
}

// =============================================================================
// Families
// =============================================================================

fn helmet(p: &HelmetParams, ctx: &Context<'_>) -> LoftPlan {
    let head_height = ctx.get(Dimension::HeadHeight);
    let a0 = ctx.fitted(Dimension::HeadWidth) / 2.0 + ctx.wall;
    let b0 = ctx.fitted(Dimension::HeadLength) / 2.0 + ctx.wall;
    let length = head_height * (p.coverage + ctx.overlap()) + ctx.m.clearance / 2.0 + ctx.wall;

    let rings = dome_stations(ctx.stations, p.dome_start)
        .into_iter()
        .map(|(s, dome)| {
            let skirt = if s < p.dome_start {
                let d = 1.0 - s / p.dome_start;
                1.0 - p.neck_taper * d * d
            } else {
                1.0
            };
            let k = skirt * dome;
            let brow = p.brow_ridge * ctx.gain() * (-((s - 0.55) / 0.15).powi(2)).exp();
            RingShape::ellipse(s * length, a0 * k, b0 * k)
                .with_bump(Bump::new(FRAC_PI_2, 0.5, brow))
        })
        .collect();

    let mut plan = LoftPlan {
        frame: PieceFrame::upright(Point3::new(
            0.0,
            0.0,
            ctx.get(Dimension::Height) - head_height,
        )),
        rings,
        angles: ring_angles(ctx.ring_samples, None),
        start: PlanCap::Opening,
        end: apex_on_axis(length),
        openings: Vec::new(),
    };
    if let Some(style) = p.visor {
        let (width, height) = style.size(ctx.fitted(Dimension::HeadWidth));
        if let Some(centre) = plan.surface_point(p.visor_level, FRAC_PI_2) {
            plan.openings.push(PlanOpening {
                name: "visor",
                centre,
                facing: plan.frame.radial(FRAC_PI_2),
                across: plan.frame.around(FRAC_PI_2),
                width,
                height,
            });
        }
    }
    plan
}

fn cuirass(p: &CuirassParams, ctx: &Context<'_>) -> LoftPlan {
    let waist = ctx.fitted(Dimension::WaistCircumference);
    let chest = ctx.fitted(Dimension::ChestCircumference);
    let length = ctx.get(Dimension::TorsoLength) * (1.0 + ctx.overlap());
    let knots = [
        (0.0, waist * 1.03),
        (0.3, waist),
        (0.65, chest),
        (0.85, chest),
        (1.0, chest * p.shoulder_taper),
    ];

    let rings = tube_stations(ctx.stations)
        .into_iter()
        .map(|s| {
            let (a, b) = ctx.semi_axes(smooth_knots(&knots, s), p.aspect);
            let keel = p.keel_height * ctx.gain() * (PI * s).sin();
            RingShape::ellipse(s * length, a, b).with_bump(Bump::new(
                FRAC_PI_2,
                p.keel_width,
                keel,
            ))
        })
        .collect();

    let base_z = ctx.get(Dimension::Height)
        - ctx.get(Dimension::HeadHeight)
        - 0.05 * ctx.get(Dimension::Height)
        - ctx.get(Dimension::TorsoLength);

    LoftPlan {
        frame: PieceFrame::upright(Point3::new(0.0, 0.0, base_z)),
        rings,
        angles: ring_angles(ctx.ring_samples, Some((FRAC_PI_2, p.keel_warp))),
        start: PlanCap::Opening,
        end: PlanCap::Opening,
        openings: Vec::new(),
    }
}

fn pauldron(p: &PauldronParams, ctx: &Context<'_>) -> LoftPlan {
    let perimeter = ctx.fitted(Dimension::ShoulderCircumference) * p.spread;
    let (a, b) = ctx.semi_axes(perimeter, p.aspect);
    let skirt = ctx.get(Dimension::UpperArmLength) * (p.drop + ctx.overlap());
    let cap = p.cap_ratio * a;
    let length = skirt + cap;
    let start = skirt / length;

    let rings = dome_stations(ctx.stations, start)
        .into_iter()
        .map(|(s, k)| {
            let flange = p.flange * ctx.gain() * (1.0 - s).max(0.0);
            RingShape::ellipse(s * length, a * k, b * k)
                .with_bump(Bump::new(FRAC_PI_2, 0.5, flange * k))
        })
        .collect();

    let shoulder_z = 0.82 * ctx.get(Dimension::Height);
    LoftPlan {
        frame: PieceFrame::upright(Point3::new(
            ctx.get(Dimension::ShoulderWidth) / 2.0,
            0.0,
            shoulder_z - skirt,
        )),
        rings,
        angles: ring_angles(ctx.ring_samples, None),
        start: PlanCap::Opening,
        end: apex_on_axis(length),
        openings: Vec::new(),
    }
}

/// Shared open tube through smoothed girth knots.
fn tube(
    t: &TubeParams,
    ctx: &Context<'_>,
    frame: PieceFrame,
    length: f64,
    knots: &[(f64, f64)],
) -> LoftPlan {
    let rings = tube_stations(ctx.stations)
        .into_iter()
        .map(|s| {
            let (a, b) = ctx.semi_axes(smooth_knots(knots, s), t.aspect);
            let ridge = t.ridge * ctx.gain() * (PI * s).sin();
            RingShape::ellipse(s * length, a, b).with_bump(Bump::new(
                FRAC_PI_2,
                t.ridge_width,
                ridge,
            ))
        })
        .collect();
    LoftPlan {
        frame,
        rings,
        angles: ring_angles(ctx.ring_samples, None),
        start: PlanCap::Opening,
        end: PlanCap::Opening,
        openings: Vec::new(),
    }
}

fn vambrace(p: &VambraceParams, ctx: &Context<'_>) -> LoftPlan {
    let wrist = ctx.fitted(Dimension::WristCircumference) * p.cuff_flare;
    let forearm = ctx.fitted(Dimension::ForearmCircumference);
    let length = ctx.get(Dimension::ForearmLength) * (p.tube.coverage + ctx.overlap());
    let frame = PieceFrame::upright(Point3::new(ctx.arm_x(), 0.0, ctx.wrist_z()));
    tube(
        &p.tube,
        ctx,
        frame,
        length,
        &[(0.0, wrist), (0.65, forearm), (1.0, forearm * 1.04)],
    )
}

fn gauntlet(p: &GauntletParams, ctx: &Context<'_>) -> LoftPlan {
    let wrist = ctx.fitted(Dimension::WristCircumference) * p.cuff_flare;
    let palm = ctx.fitted(Dimension::PalmCircumference);
    let length = (ctx.get(Dimension::HandLength) + ctx.m.clearance / 2.0)
        * (1.0 + ctx.overlap() / 2.0);
    let start = 1.0 - p.tip_fraction;
    let knots = [(0.0, wrist), (0.4 * start, palm), (start, palm * 0.95)];

    let rings = dome_stations(ctx.stations, start)
        .into_iter()
        .map(|(s, k)| {
            // The hand hangs with its palm inward: width runs front to back.
            let (major, minor) = ctx.semi_axes(smooth_knots(&knots, s), p.aspect);
            let ridge = p.thumb_ridge * ctx.gain() * k;
            RingShape::ellipse(s * length, minor * k, major * k)
                .with_bump(Bump::new(FRAC_PI_2, 0.6, ridge))
        })
        .collect();

    LoftPlan {
        frame: PieceFrame::hanging(Point3::new(ctx.arm_x(), 0.0, ctx.wrist_z() - 10.0)),
        rings,
        angles: ring_angles(ctx.ring_samples, None),
        start: PlanCap::Opening,
        end: apex_on_axis(length),
        openings: Vec::new(),
    }
}

fn cuisse(p: &CuisseParams, ctx: &Context<'_>) -> LoftPlan {
    let knee = ctx.fitted(Dimension::KneeCircumference) * 1.05;
    let thigh = ctx.fitted(Dimension::ThighCircumference);
    let length = ctx.get(Dimension::ThighLength) * (p.tube.coverage + ctx.overlap());
    let base = ctx.knee_z() + 0.3 * ctx.get(Dimension::KneeCircumference) / PI;
    let frame = PieceFrame::upright(Point3::new(ctx.leg_x(), 0.0, base));
    tube(&p.tube, ctx, frame, length, &[(0.0, knee), (0.7, thigh), (1.0, thigh * 1.02)])
}

fn poleyn(p: &PoleynParams, ctx: &Context<'_>) -> LoftPlan {
    let knee = ctx.fitted(Dimension::KneeCircumference) * 1.08;
    let length = ctx.get(Dimension::KneeCircumference) / PI * (p.length + ctx.overlap());
    let (a, b) = ctx.semi_axes(knee, p.aspect);

    let rings = tube_stations(ctx.stations)
        .into_iter()
        .map(|s| {
            let cop = p.cop_height * ctx.gain() * (PI * s).sin();
            RingShape::ellipse(s * length, a, b).with_bump(Bump::new(FRAC_PI_2, p.cop_width, cop))
        })
        .collect();

    LoftPlan {
        frame: PieceFrame::upright(Point3::new(ctx.leg_x(), 0.0, ctx.knee_z() - length / 2.0)),
        rings,
        angles: ring_angles(ctx.ring_samples, None),
        start: PlanCap::Opening,
        end: PlanCap::Opening,
        openings: Vec::new(),
    }
}

fn greave(p: &GreaveParams, ctx: &Context<'_>) -> LoftPlan {
    let ankle = ctx.fitted(Dimension::AnkleCircumference) * 1.1;
    let calf = ctx.fitted(Dimension::CalfCircumference);
    let length = ctx.get(Dimension::CalfLength) * (p.tube.coverage + ctx.overlap());
    let frame = PieceFrame::upright(Point3::new(
        ctx.leg_x(),
        0.0,
        0.05 * ctx.get(Dimension::Height),
    ));
    tube(&p.tube, ctx, frame, length, &[(0.0, ankle), (0.65, calf), (1.0, calf * 0.97)])
}

fn sabaton(p: &SabatonParams, ctx: &Context<'_>) -> LoftPlan {
    let foot = ctx.fitted(Dimension::FootLength);
    let half_width = ctx.fitted(Dimension::FootWidth) / 2.0 + ctx.wall;
    let half_height = p.instep * foot / 2.0 + ctx.wall;
    let length = foot * (1.0 + ctx.overlap() / 4.0);
    let start = 1.0 - p.toe_fraction;

    let rings: Vec<RingShape> = dome_stations(ctx.stations, start)
        .into_iter()
        .map(|(s, k)| {
            let lower = 1.0 - p.toe_drop * (s / start).min(1.0);
            let ridge = p.ridge * ctx.gain() * k;
            RingShape::ellipse(s * length, half_width * k, half_height * lower * k)
                .centered(0.0, half_height)
                .with_bump(Bump::new(FRAC_PI_2, 0.5, ridge))
        })
        .collect();

    LoftPlan {
        frame: PieceFrame::forward(Point3::new(
            ctx.leg_x(),
            -0.25 * ctx.get(Dimension::FootLength),
            0.0,
        )),
        rings,
        angles: ring_angles(ctx.ring_samples, None),
        start: PlanCap::Opening,
        end: PlanCap::Apex {
            u: 0.0,
            v: half_height,
            w: length,
        },
        openings: Vec::new(),
    }
}
