//! NCR record model
//!
//! `NcrRecord` mirrors the 20-column semicolon-delimited production export.
//! `DefectRecord` is the reduced unit of work handed to prediction: a free-text
//! description plus optional structured fields.

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Column order of the production NCR export
pub const CSV_COLUMNS: [&str; 20] = [
    "part_type",
    "job_order",
    "operation_detection",
    "nc_description",
    "nc_code",
    "nominal",
    "lower_tolerance",
    "upper_tolerance",
    "measured_value",
    "defect_desc",
    "qc_comments",
    "machine_detection",
    "operator_detection",
    "date_detection",
    "operation_occurrence",
    "operator_machining",
    "machine_occurrence",
    "date_machining",
    "root_cause",
    "corrective_action",
];

/// Default field delimiter of the production export
pub const DEFAULT_DELIMITER: char = ';';

/// Date format used by the export (e.g. `12/23/25`)
pub const DATE_FORMAT: &str = "%m/%d/%y";

/// One row of the production NCR export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NcrRecord {
    pub part_type: String,
    pub job_order: String,
    pub operation_detection: String,
    pub nc_description: String,
    pub nc_code: String,
    pub nominal: String,
    pub lower_tolerance: String,
    pub upper_tolerance: String,
    pub measured_value: String,
    pub defect_desc: String,
    pub qc_comments: String,
    pub machine_detection: String,
    pub operator_detection: String,
    pub date_detection: String,
    pub operation_occurrence: String,
    pub operator_machining: String,
    pub machine_occurrence: String,
    pub date_machining: String,
    pub root_cause: String,
    pub corrective_action: String,
}

/// Parse a single delimited NCR line
///
/// # Errors
/// Returns `Error::Parse` if the column count is not 20.
pub fn parse_ncr_csv_entry(line: &str, delimiter: char) -> Result<NcrRecord> {
    let values: Vec<&str> = line.trim().split(delimiter).collect();
    if values.len() != CSV_COLUMNS.len() {
        return Err(Error::Parse(format!(
            "Expected {} columns, got {}",
            CSV_COLUMNS.len(),
            values.len()
        )));
    }

    let field = |i: usize| values[i].to_string();

    Ok(NcrRecord {
        part_type: field(0),
        job_order: field(1),
        operation_detection: field(2),
        nc_description: field(3),
        nc_code: field(4),
        nominal: field(5),
        lower_tolerance: field(6),
        upper_tolerance: field(7),
        measured_value: field(8),
        defect_desc: field(9),
        qc_comments: field(10),
        machine_detection: field(11),
        operator_detection: field(12),
        date_detection: field(13),
        operation_occurrence: field(14),
        operator_machining: field(15),
        machine_occurrence: field(16),
        date_machining: field(17),
        root_cause: field(18),
        corrective_action: field(19),
    })
}

/// Free-text description plus optional structured fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefectRecord {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_type: Option<String>,
}

impl DefectRecord {
    /// Record with a description only
    pub fn from_description(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }
}

impl From<&NcrRecord> for DefectRecord {
    fn from(ncr: &NcrRecord) -> Self {
        let description = [ncr.nc_description.trim(), ncr.defect_desc.trim()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            description,
            machine: optional_field(&ncr.machine_detection),
            operator: optional_field(&ncr.operator_detection),
            date: parse_date(&ncr.date_detection),
            part_type: optional_field(&ncr.part_type),
        }
    }
}

/// Empty cells and the `/` placeholder mean "not recorded"
fn optional_field(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == "/" {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse an export date, `None` when absent or malformed
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = optional_field(value)?;
    match NaiveDate::parse_from_str(&trimmed, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::debug!("Ignoring malformed date '{}': {}", trimmed, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE_LINE: &str = "AA1;AA1_003884;7200;CO2910 is non conforming;CO2910;120,2;-0,6;0,6;0;OP7200 DA;after OP7300, awaiting QA confirmation whether to conduct a retes, 2025.12.23 DA updated: FCTD see attachment. 2025.12.23;CCCC-04-01;EM1782;12/23/25;1200;2/13/10;AAAA-02-06;12/13/25;NOT DETERMINED YET;Add manual tool calibration";

    #[test]
    fn test_parse_valid_line() {
        let record = parse_ncr_csv_entry(EXAMPLE_LINE, DEFAULT_DELIMITER).unwrap();

        assert_eq!(record.part_type, "AA1");
        assert_eq!(record.job_order, "AA1_003884");
        assert_eq!(record.nc_description, "CO2910 is non conforming");
        assert_eq!(record.nc_code, "CO2910");
        assert_eq!(record.nominal, "120,2");
        assert_eq!(record.measured_value, "0");
        assert_eq!(record.root_cause, "NOT DETERMINED YET");
        assert_eq!(record.corrective_action, "Add manual tool calibration");
    }

    #[test]
    fn test_parse_wrong_column_count() {
        let err = parse_ncr_csv_entry("AA1;AA1_003884;7200", DEFAULT_DELIMITER).unwrap_err();
        assert!(err.to_string().contains("Expected 20 columns, got 3"));
    }

    #[test]
    fn test_parse_trims_trailing_newline() {
        let line = format!("{}\n", EXAMPLE_LINE);
        assert!(parse_ncr_csv_entry(&line, DEFAULT_DELIMITER).is_ok());
    }

    #[test]
    fn test_defect_record_from_ncr() {
        let ncr = parse_ncr_csv_entry(EXAMPLE_LINE, DEFAULT_DELIMITER).unwrap();
        let record = DefectRecord::from(&ncr);

        assert_eq!(record.description, "CO2910 is non conforming OP7200 DA");
        assert_eq!(record.machine.as_deref(), Some("CCCC-04-01"));
        assert_eq!(record.operator.as_deref(), Some("EM1782"));
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 12, 23));
        assert_eq!(record.part_type.as_deref(), Some("AA1"));
    }

    #[test]
    fn test_placeholder_fields_are_none() {
        let ncr = NcrRecord {
            nc_description: "scratch on face".to_string(),
            machine_detection: "/".to_string(),
            date_detection: "not a date".to_string(),
            ..Default::default()
        };
        let record = DefectRecord::from(&ncr);

        assert_eq!(record.description, "scratch on face");
        assert!(record.machine.is_none());
        assert!(record.operator.is_none());
        assert!(record.date.is_none());
    }
}
