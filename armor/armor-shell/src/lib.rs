//! Shelling of armor solids for Armor Forge.
//!
//! [`ShellingEngine`] hollows a closed base solid into a wall:
//!
//! 1. Faces tagged as openings are removed
//! 2. Each exterior vertex gets an inward offset distance, the target
//!    thickness limited by a discrete inscribed-ball test ([`ball_limits`])
//! 3. The distance field is made Lipschitz-smooth ([`lipschitz_smooth`])
//! 4. The surface is offset through the geometry kernel, flipped into the
//!    cavity, and joined to the exterior by rim strips
//!
//! A piece whose curvature cannot hold the minimum wall fails with
//! "wall thickness violation".
//!
//! Windows such as a helmet visor are cut through the finished wall with
//! [`ShellingEngine::cut_openings`].
//!
//! # Example
//!
//! ```
//! use armor_kernel::{EndCap, GeometryKernel, MeshKernel, Section, Tolerance, loft_sections};
//! use armor_shell::{ShellParams, ShellingEngine};
//! use armor_types::Point3;
//!
//! let ring = |z: f64| {
//!     Section::new(
//!         (0..32)
//!             .map(|i| {
//!                 let a = std::f64::consts::TAU * f64::from(i) / 32.0;
//!                 Point3::new(40.0 * a.cos(), 40.0 * a.sin(), z)
//!             })
//!             .collect(),
//!     )
//! };
//! let sections = vec![ring(0.0), ring(20.0), ring(40.0)];
//! let cup = loft_sections(&sections, &EndCap::Open, &EndCap::Flat, Tolerance::default()).unwrap();
//!
//! let kernel = MeshKernel::new();
//! let shell = ShellingEngine::new(&kernel)
//!     .shell("cup", &cup, &ShellParams::new(3.0, 1.5))
//!     .unwrap();
//! assert!(kernel.validate_manifold(&shell.mesh));
//! assert!(shell.report.within(0.05));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod limit;
mod params;
mod shell;

pub use limit::{ball_limits, ball_radius, lipschitz_smooth};
pub use params::{DEFAULT_LIMIT_FRACTION, DEFAULT_LIPSCHITZ, ShellParams};
pub use shell::{ShelledPiece, ShellingEngine, ThicknessReport};
