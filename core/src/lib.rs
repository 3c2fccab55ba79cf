//! Core detector-mode derivation and peak classification for the Rust EMC
//! precompliance platform.
//!
//! The modules mirror the legacy FieldFox capture pipeline while providing
//! typed sweep records, explicit error handling, and well-defined
//! processing stages.

pub mod math;
pub mod prelude;
pub mod processing;
pub mod sa_interface;
pub mod standards;
pub mod telemetry;

pub use prelude::{ProcessingStage, StageConfig, StageError};
