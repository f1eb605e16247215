//! Text preparation ahead of classification
//!
//! - `normalizer`: case-folding, serial-code suppression, noise removal
//! - `gate`: rejects input too short or too symbol-heavy to be language

pub mod gate;
pub mod normalizer;

pub use gate::{GateVerdict, MeaningfulnessGate, RejectionReason};
pub use normalizer::normalize;
