//! Batch input reading
//!
//! Two file formats feed the batch command: plain descriptions, one per
//! line, or production NCR CSV rows. Blank lines are skipped in both. CSV
//! rows carry entity enrichment taken from the whole record rather than the
//! description alone.

use crate::extractors::{extract_entities_from_record, ExtractedEntities};
use clap::ValueEnum;
use ncr_common::record::{parse_ncr_csv_entry, DefectRecord, DEFAULT_DELIMITER};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// One description per line
    Lines,
    /// Production NCR CSV lines (20 `;`-separated columns)
    NcrCsv,
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// `line` is 1-based and counts the header
    #[error("{origin}:{line}: {source}")]
    Record {
        origin: String,
        line: usize,
        source: ncr_common::Error,
    },
}

/// One unit of batch work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub description: String,
    /// Record-level entities; `None` means extract from the description
    pub entities: Option<ExtractedEntities>,
}

/// Read and parse a batch input file
pub fn read_batch_input(
    path: &Path,
    format: InputFormat,
    skip_header: bool,
) -> Result<Vec<BatchItem>, InputError> {
    let content = std::fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_batch_input(&content, format, skip_header, &path.display().to_string())
}

/// Parse batch input already in memory; `origin` names it in errors
pub fn parse_batch_input(
    content: &str,
    format: InputFormat,
    skip_header: bool,
    origin: &str,
) -> Result<Vec<BatchItem>, InputError> {
    let lines = content
        .lines()
        .enumerate()
        .skip(usize::from(skip_header))
        .filter(|(_, line)| !line.trim().is_empty());

    match format {
        InputFormat::Lines => Ok(lines
            .map(|(_, line)| BatchItem {
                description: line.to_string(),
                entities: None,
            })
            .collect()),
        InputFormat::NcrCsv => lines
            .map(|(index, line)| {
                let record = parse_ncr_csv_entry(line, DEFAULT_DELIMITER).map_err(|source| {
                    InputError::Record {
                        origin: origin.to_string(),
                        line: index + 1,
                        source,
                    }
                })?;
                Ok(BatchItem {
                    description: DefectRecord::from(&record).description,
                    entities: Some(extract_entities_from_record(&record)),
                })
            })
            .collect(),
    }
}
