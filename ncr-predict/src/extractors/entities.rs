//! Entity extraction from NCR text
//!
//! Recognized identifiers:
//! - Machines: `EM1782`, `AAAA-02-06`, `BBBB-..`, `CCCC-04-01`, `MARK-..`
//! - NC codes: two capitals + four digits (`CO2910`)
//! - Job orders: `AA1_003884`, `AA2_...`
//! - Operations: `OP7200`
//!
//! Matching is case-sensitive; results are deduplicated and sorted.

use ncr_common::record::NcrRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;

static MACHINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(EM\d+|AAAA-\d+-\d+|BBBB-\d+-\d+|CCCC-\d+-\d+|MARK-\d+-\d+)\b")
        .expect("valid machine pattern")
});

static NC_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z]{2}\d{4}\b").expect("valid NC code pattern"));

static JOB_ORDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bAA[12]_\d+\b").expect("valid job order pattern"));

static OPERATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bOP\d+\b").expect("valid operation pattern"));

/// Identifiers found in one text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedEntities {
    pub machines: Vec<String>,
    pub nc_codes: Vec<String>,
    pub job_orders: Vec<String>,
    pub operations: Vec<String>,
}

impl ExtractedEntities {
    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
            && self.nc_codes.is_empty()
            && self.job_orders.is_empty()
            && self.operations.is_empty()
    }
}

fn find_all(pattern: &Regex, text: &str) -> Vec<String> {
    pattern
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Extract all entity kinds from `text`
///
/// The kinds are matched independently, so `EM1782` and `OP7200` also show
/// up under `nc_codes`.
pub fn extract_entities(text: &str) -> ExtractedEntities {
    ExtractedEntities {
        machines: find_all(&MACHINE, text),
        nc_codes: find_all(&NC_CODE, text),
        job_orders: find_all(&JOB_ORDER, text),
        operations: find_all(&OPERATION, text),
    }
}

/// Extract entities from the free-text columns of a full record
///
/// NC description, defect description, QC comments and root cause are
/// joined with spaces before matching.
pub fn extract_entities_from_record(record: &NcrRecord) -> ExtractedEntities {
    let combined = [
        record.nc_description.as_str(),
        record.defect_desc.as_str(),
        record.qc_comments.as_str(),
        record.root_cause.as_str(),
    ]
    .join(" ");
    extract_entities(&combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ncr_common::record::{parse_ncr_csv_entry, DefectRecord, DEFAULT_DELIMITER};

    #[test]
    fn test_extracts_all_kinds() {
        let text = "CO2910 is non conforming on CCCC-04-01, detected by EM1782 \
                    at OP7200 for job AA1_003884; reworked on AAAA-02-06 after OP7300";
        let entities = extract_entities(text);

        assert_eq!(entities.machines, vec!["AAAA-02-06", "CCCC-04-01", "EM1782"]);
        assert_eq!(entities.nc_codes, vec!["CO2910", "EM1782", "OP7200", "OP7300"]);
        assert_eq!(entities.job_orders, vec!["AA1_003884"]);
        assert_eq!(entities.operations, vec!["OP7200", "OP7300"]);
    }

    #[test]
    fn test_deduplicates() {
        let entities = extract_entities("EM1782 and again EM1782");
        assert_eq!(entities.machines, vec!["EM1782"]);
    }

    #[test]
    fn test_lowercase_is_ignored() {
        assert!(extract_entities("em1782 co2910 op7200").is_empty());
    }

    #[test]
    fn test_machine_and_operation_also_match_nc_code_shape() {
        let entities = extract_entities("EM1782 OP7200 CO2910");
        assert_eq!(entities.nc_codes, vec!["CO2910", "EM1782", "OP7200"]);
        assert_eq!(entities.machines, vec!["EM1782"]);
        assert_eq!(entities.operations, vec!["OP7200"]);
    }

    #[test]
    fn test_nc_code_needs_exactly_four_digits() {
        let entities = extract_entities("DA2512100009 vs CO2910");
        assert_eq!(entities.nc_codes, vec!["CO2910"]);
    }

    #[test]
    fn test_record_entities_include_qc_comments() {
        let line = "AA1;AA1_003884;7200;CO2910 is non conforming;CO2910;120,2;-0,6;0,6;0;OP7200 DA;after OP7300, awaiting QA confirmation whether to conduct a retes, 2025.12.23 DA updated: FCTD see attachment. 2025.12.23;CCCC-04-01;EM1782;12/23/25;1200;2/13/10;AAAA-02-06;12/13/25;NOT DETERMINED YET;Add manual tool calibration";
        let record = parse_ncr_csv_entry(line, DEFAULT_DELIMITER).unwrap();

        let from_record = extract_entities_from_record(&record);
        assert_eq!(from_record.operations, vec!["OP7200", "OP7300"]);
        assert!(from_record.nc_codes.contains(&"CO2910".to_string()));

        // Machine columns are structured fields, not matched text
        assert!(from_record.machines.is_empty());

        let description_only = extract_entities(&DefectRecord::from(&record).description);
        assert_eq!(description_only.operations, vec!["OP7200"]);
    }
}
