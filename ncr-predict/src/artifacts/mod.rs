//! Persisted model artifacts
//!
//! JSON exports of the fitted cascade models plus an optional TOML manifest:
//! - `pipeline`: stage-1 TF-IDF + logistic regression text classifier
//! - `one_hot`: stage-2/3 categorical encoders
//! - `logistic`: stage-2/3 classifiers
//! - `manifest`: file names and SHA-256 digests
//! - `loader`: reads and cross-validates a full artifact directory

pub mod loader;
pub mod logistic;
pub mod manifest;
pub mod one_hot;
pub mod pipeline;
pub mod tfidf;

pub use loader::{load_inference_context, sha256_hex};
pub use logistic::LogisticModel;
pub use manifest::{ArtifactEntry, ArtifactFiles, ArtifactManifest, MANIFEST_FILE};
pub use one_hot::OneHotEncoder;
pub use pipeline::TextPipeline;
pub use tfidf::{Norm, TfidfVectorizer};
