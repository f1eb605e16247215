//! NCR free-text extractors
//!
//! Heuristic enrichment reported alongside model predictions. Nothing here
//! feeds the prediction cascade.
//!
//! 1. **entities** - Regex extraction of machines, NC codes, job orders, operations
//! 2. **defect_keywords** - Keyword-family defect typing

pub mod defect_keywords;
pub mod entities;

pub use defect_keywords::{keyword_defect_type, DEFECT_KEYWORDS};
pub use entities::{extract_entities, extract_entities_from_record, ExtractedEntities};
