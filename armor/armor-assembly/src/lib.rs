//! Assembly of armor sets for Armor Forge.
//!
//! [`ArmorEngine`] turns one validated [`GenerationRequest`] into every
//! requested solid. Each left or central piece runs an independent pipeline
//! on the rayon pool:
//!
//! 1. Deform the template to the measurements
//! 2. Shell to the wall thickness
//! 3. Plan strap mounts on the whole shell
//! 4. Split for the print bed, keeping seams off the mounts
//! 5. Carve each mount seat on the part that owns it
//!
//! Right-hand pieces mirror their left result. Failures stay with their
//! piece and are listed in the [`Manifest`]; only validation and
//! cancellation fail a whole run.
//!
//! [`GenerationRequest`]: armor_config::GenerationRequest

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod cancel;
mod config;
mod engine;
mod error;
mod manifest;

pub use cancel::CancelToken;
pub use config::EngineConfig;
pub use engine::{ArmorEngine, AssembledPiece, AssembledSet};
pub use error::{EngineError, EngineResult, PieceError};
pub use manifest::{Manifest, ManifestEntry, PieceStatus};
