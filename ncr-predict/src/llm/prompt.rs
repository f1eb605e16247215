//! Prompt construction for root-cause prediction

use ncr_common::NcrRecord;

/// System role message
pub const SYSTEM_PROMPT: &str =
    "You are a manufacturing quality expert specializing in root cause analysis.";

/// Summarize an NCR record for the model
///
/// Includes identification, measurement and machine context. Excludes the
/// recorded root cause and corrective action (the prediction targets).
pub fn build_prediction_prompt(ncr: &NcrRecord) -> String {
    format!(
        "Part: {} | Job: {}\n\
         NC Description: {}\n\
         NC Code: {}\n\
         Nominal: {} | Tolerance: [{}, {}] | Measured: {}\n\
         Defect: {}\n\
         QC Comments: {}\n\
         Machine (detection): {} | Machine (occurrence): {}\n\
         Operation (occurrence): {}",
        ncr.part_type,
        ncr.job_order,
        ncr.nc_description,
        ncr.nc_code,
        ncr.nominal,
        ncr.lower_tolerance,
        ncr.upper_tolerance,
        ncr.measured_value,
        ncr.defect_desc,
        ncr.qc_comments,
        ncr.machine_detection,
        ncr.machine_occurrence,
        ncr.operation_occurrence,
    )
}

/// User message wrapping a description
pub fn build_user_message(description: &str) -> String {
    format!(
        "You are an expert in manufacturing quality analysis.\n\
         Based on the following NCR (Non-Conformance Report) description, predict the most likely root cause.\n\
         Be concise and specific. Focus on the technical root cause.\n\
         \n\
         NCR Description:\n\
         {}\n\
         \n\
         Root Cause:",
        description
    )
}
