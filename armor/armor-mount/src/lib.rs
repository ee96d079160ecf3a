//! Strap mount placement for Armor Forge.
//!
//! Mounts are planned on the unsplit shell so the splitter can keep its
//! seams clear of them, then carved on whichever sub-piece owns them:
//!
//! - [`MountPlacer::plan`] - Evaluate anchor rules, project onto the exterior,
//!   add mirrored twins for symmetric rules
//! - [`MountPlacer::carve`] - Cut each seat's hardware: a pocket with buckle,
//!   snap, lace or clip holes, or an interlock groove and tab; pocket floors
//!   must stay clear of the cavity; one retry at reduced size
//! - [`owner_index`] - Which sub-piece a mount lands on
//!
//! A seat that still cannot be cut at reduced size fails the piece with
//! "mount intersects cavity".

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod feature;
mod params;
mod placer;
mod point;

pub use feature::{CutKind, SeatCut, seat_cuts};
pub use params::MountParams;
pub use placer::{CarvedPiece, MountPlacer, owner_index};
pub use point::{MountPoint, SeatFeature, rename_owner, swap_side};
