//! Test Helper Utilities
//!
//! Shared utilities for ncr-predict integration tests

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod artifacts;

pub use artifacts::{
    load_test_cascade, stage1_json, stage2_encoder_json, stage2_json, stage3_encoder_json,
    stage3_json, write_artifact_set, write_json, write_manifest, ACTIONS, DEFECTS, ROOT_CAUSES,
};
