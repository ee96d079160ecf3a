//! Measurement resolution and generation requests for Armor Forge.
//!
//! Everything a run needs is gathered into one immutable
//! [`GenerationRequest`], validated before any geometry is produced:
//!
//! - [`Dimension`] - The 30 named body measurements with reference values and ranges
//! - [`MeasurementProfile`] - A full set of measurements plus clearance and scale
//! - [`MeasurementResolver`] - Size class, custom profile or overrides to a validated profile
//! - [`GenerationRequest`] - Pieces, detail level, wall thickness, print bed and flags
//!
//! Invalid input is reported as a [`ValidationError`] naming the offending
//! field.
//!
//! # Example
//!
//! ```
//! use armor_config::{Dimension, GenerationRequest, SizeClass};
//!
//! let request = GenerationRequest::builder()
//!     .size(SizeClass::M)
//!     .measurement(Dimension::Height, 1820.0)
//!     .scale(0.5)
//!     .build()
//!     .unwrap();
//!
//! assert!((request.scaled_wall_thickness() - 2.0).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod dimension;
mod error;
mod profile;
mod request;
mod resolver;

pub use dimension::{DIMENSION_COUNT, Dimension};
pub use error::{ConfigResult, ValidationError};
pub use profile::{DEFAULT_CLEARANCE, MAX_CLEARANCE, MeasurementProfile, SizeClass};
pub use request::{DetailLevel, GenerationRequest, GenerationRequestBuilder};
pub use resolver::{MeasurementInput, MeasurementResolver};
