//! # NCR Common Library
//!
//! Shared code for the NCR analysis services including:
//! - Category labels and the prediction triple
//! - NCR record parsing (production CSV layout)
//! - Configuration loading
//! - Error types

pub mod category;
pub mod config;
pub mod error;
pub mod record;

pub use category::{Category, PredictionResult, UNKNOWN_LABEL};
pub use error::{Error, Result};
pub use record::{DefectRecord, NcrRecord};
