//! Print-bed splitting for Armor Forge.
//!
//! A shell larger than the print bed is cut along its template seams into
//! sub-pieces that print separately and key back together:
//!
//! - Each cut is a pair of half-space booleans; the low side keeps
//!   protruding tabs and the high side matching recesses
//! - Key sites are spaced along the section loops ([`key_sites`])
//! - Seams move within their allowance to stay clear of planned mounts
//! - [`SplitReport`] records every cut, so the volume contract
//!   `Σ parts − Σ tabs + Σ recesses = original` can be checked
//!
//! # Example
//!
//! ```
//! use armor_kernel::{EndCap, MeshKernel, Section, Tolerance, loft_sections};
//! use armor_split::{SplitParams, Splitter};
//! use armor_template::SeamPlane;
//! use armor_types::{Axis, Point3};
//!
//! let ring = |z: f64| {
//!     Section::new(
//!         (0..24)
//!             .map(|i| {
//!                 let a = std::f64::consts::TAU * f64::from(i) / 24.0;
//!                 Point3::new(30.0 * a.cos(), 30.0 * a.sin(), z)
//!             })
//!             .collect(),
//!     )
//! };
//! let sections = [ring(0.0), ring(150.0)];
//! let post = loft_sections(&sections, &EndCap::Flat, &EndCap::Flat, Tolerance::default()).unwrap();
//!
//! let kernel = MeshKernel::new();
//! let params = SplitParams::new([100.0, 100.0, 100.0], 4.0).with_keys(false);
//! let split = Splitter::new(&kernel, params)
//!     .split("post", &post, &[SeamPlane::new(Axis::Z, 0.5, "base", "top")], &[])
//!     .unwrap();
//! assert_eq!(split.parts.len(), 2);
//! assert!(split.report.volume_error() < 1e-9);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod keys;
mod params;
mod report;
mod splitter;

pub use keys::key_sites;
pub use params::{DEFAULT_KEY_CLEARANCE, DEFAULT_KEY_SPACING, SplitParams};
pub use report::{AppliedSeam, SplitReport};
pub use splitter::{SplitPiece, Splitter, SubPiece};
