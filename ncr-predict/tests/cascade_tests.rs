//! End-to-end cascade tests over loaded artifacts

mod helpers;

use helpers::*;
use ncr_common::PredictionResult;
use ncr_predict::cascade::{CascadeState, UnknownCause};
use ncr_predict::text::RejectionReason;
use ncr_predict::types::PipelineError;
use serde_json::json;
use tempfile::TempDir;

fn cascade_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_artifact_set(dir.path());
    dir
}

#[test]
fn test_dimensional_description_with_serial_code() {
    let dir = cascade_dir();
    let cascade = load_test_cascade(dir.path());

    let trace = cascade
        .run("Part DA2512100009 shows dimensional deviation out of tolerance")
        .unwrap();

    assert_eq!(trace.normalized, "part shows dimensional deviation out of tolerance");
    assert_eq!(trace.terminal, CascadeState::Stage3Done);
    assert_eq!(
        trace.result.as_triple(),
        ("dimensional", "tool wear", "recalibrate tool")
    );
    let confidence = trace.defect_confidence.unwrap();
    assert!((confidence - 0.948).abs() < 0.001, "got {}", confidence);
}

#[test]
fn test_each_defect_follows_its_chain() {
    let dir = cascade_dir();
    let cascade = load_test_cascade(dir.path());

    let cases = [
        ("Deep scratch on sealing face", ("surface", "handling damage", "operator training")),
        ("Laser marking illegible", ("marking", "setup error", "fixture check")),
        ("Oil stain on housing", ("appearance", "handling damage", "operator training")),
        ("Bore diameter oversized", ("dimensional", "tool wear", "recalibrate tool")),
    ];
    for (description, expected) in cases {
        let result = cascade.predict(description).unwrap();
        assert_eq!(result.as_triple(), expected, "for {:?}", description);
    }
}

#[test]
fn test_gate_rejections() {
    let dir = cascade_dir();
    let cascade = load_test_cascade(dir.path());

    let symbols = cascade.run("asdkj 1231 /// ???").unwrap();
    assert_eq!(symbols.result, PredictionResult::unknown());
    assert_eq!(
        symbols.cause,
        Some(UnknownCause::Gate(RejectionReason::LowAlphaRatio))
    );

    let short = cascade.run("ab").unwrap();
    assert_eq!(short.cause, Some(UnknownCause::Gate(RejectionReason::TooShort)));
    assert!(short.defect_confidence.is_none());
}

#[test]
fn test_out_of_vocabulary_text_is_low_confidence() {
    let dir = cascade_dir();
    let cascade = load_test_cascade(dir.path());

    let trace = cascade.run("operator reported an unusual noise").unwrap();
    assert!(trace.result.is_unknown());
    assert_eq!(trace.cause, Some(UnknownCause::LowDefectConfidence));
    assert_eq!(trace.defect_confidence, Some(0.25));
}

#[test]
fn test_batch_preserves_order() {
    let dir = cascade_dir();
    let cascade = load_test_cascade(dir.path());

    let inputs: Vec<String> = (0..64)
        .map(|i| match i % 4 {
            0 => format!("scratch number {}", i),
            1 => "ab".to_string(),
            2 => format!("diameter {} out of tolerance", i),
            _ => "unrelated remark".to_string(),
        })
        .collect();

    let batch = cascade.predict_batch(&inputs).unwrap();
    assert_eq!(batch.len(), inputs.len());
    for (input, result) in inputs.iter().zip(&batch) {
        assert_eq!(result, &cascade.predict(input).unwrap());
    }
}

#[test]
fn test_unencodable_label_fails_batch() {
    let dir = cascade_dir();
    write_json(
        dir.path(),
        helpers::artifacts::STAGE2_ENCODER_FILE,
        &json!({ "categories": [["dimensional", "surface", "marking", "other"]] }),
    );
    let cascade = load_test_cascade(dir.path());

    assert!(matches!(
        cascade.predict("Oil stain on housing"),
        Err(PipelineError::Invariant(_))
    ));
    assert!(cascade
        .predict_batch(&["Deep scratch", "Oil stain on housing"])
        .is_err());
    assert!(cascade.predict("Deep scratch on face").is_ok());
}
