//! Defect-description normalizer
//!
//! Produces the canonical form consumed by the stage-1 classifier:
//! lower-case ASCII letters, hyphens and single spaces, with embedded
//! serial/part codes (1-3 letters followed by 4+ digits) removed.

use once_cell::sync::Lazy;
use regex::Regex;

/// Serial/part code token, e.g. `DA2512100009`, `CO2910`
static SERIAL_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[a-z]{1,3}[0-9]{4,}\b").expect("valid serial code pattern"));

/// Anything that is not a lowercase letter, whitespace or hyphen
static NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z\s-]").expect("valid noise pattern"));

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Normalize raw description text
///
/// Total function: never fails, may return an empty string.
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let without_codes = SERIAL_CODE.replace_all(&lowered, " ");
    let letters_only = NOISE.replace_all(&without_codes, "");
    WHITESPACE
        .replace_all(&letters_only, " ")
        .trim()
        .to_string()
}
