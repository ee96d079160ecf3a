//! Parametric piece templates for Armor Forge.
//!
//! A template describes a piece's outer surface as section rings around a
//! piece axis: elliptic girths driven by the measurement profile, plus
//! Gaussian feature bumps such as ridges or the cuirass keel.
//!
//! - [`TemplateParams`] - One variant per shape family with its parameters
//! - [`LoftPlan`] - A template evaluated for one request, ready to loft
//! - [`ArmorPieceSpec`] - Template, seam planes and anchor rules for a piece
//! - [`TemplateLibrary`] - The standard specs for all 16 pieces
//!
//! Evaluation is pure: the same request and [`Relaxation`] always give the
//! same plan. The detail level changes sample counts, never topology.
//!
//! # Example
//!
//! ```
//! use armor_config::{GenerationRequest, SizeClass};
//! use armor_template::{Relaxation, TemplateLibrary};
//! use armor_types::PieceKind;
//!
//! let request = GenerationRequest::builder().size(SizeClass::L).detail(1).build().unwrap();
//! let spec = TemplateLibrary::standard().spec(PieceKind::Helmet).unwrap();
//! let plan = spec.params.loft_plan(&request, Relaxation::default()).unwrap();
//!
//! assert!(plan.length() > 220.0 && plan.length() < 260.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod anchor;
mod curve;
mod error;
mod frame;
mod library;
mod params;
mod plan;
mod seam;

pub use anchor::{AnchorRule, MountStyle, SeatShape, StrapDir, StrapWidth};
pub use curve::{
    Bump, RingShape, angle_delta, ellipse_perimeter, ellipse_radius, ring_angles,
    semi_axes_for_perimeter,
};
pub use error::{TemplateError, TemplateResult};
pub use frame::PieceFrame;
pub use library::{ArmorPieceSpec, TemplateLibrary};
pub use params::{
    CuirassParams, CuisseParams, GauntletParams, GreaveParams, HelmetParams, PauldronParams,
    PoleynParams, Relaxation, SabatonParams, TemplateParams, TubeParams, VambraceParams,
    VisorStyle,
};
pub use plan::{LoftPlan, PlanCap, PlanOpening};
pub use seam::SeamPlane;
