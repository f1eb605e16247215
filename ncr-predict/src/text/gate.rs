//! Meaningfulness gate
//!
//! Rejects input that is pure noise (random character strings, numeric-only
//! input, symbol runs) before any model is invoked.

use serde::Serialize;

/// Default minimum character count
pub const MIN_TEXT_LENGTH: usize = 5;

/// Default minimum alphabetic share of all characters
pub const MIN_ALPHA_RATIO: f32 = 0.3;

/// Why an input was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// Fewer characters than the configured minimum
    TooShort,
    /// Alphabetic share below the configured minimum
    LowAlphaRatio,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::TooShort => "too_short",
            RejectionReason::LowAlphaRatio => "low_alpha_ratio",
        }
    }
}

/// Gate decision for one input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVerdict {
    Pass,
    Reject(RejectionReason),
}

impl GateVerdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, GateVerdict::Pass)
    }
}

/// Length and alphabetic-ratio gate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeaningfulnessGate {
    min_text_length: usize,
    min_alpha_ratio: f32,
}

impl Default for MeaningfulnessGate {
    fn default() -> Self {
        Self::new(MIN_TEXT_LENGTH, MIN_ALPHA_RATIO)
    }
}

impl MeaningfulnessGate {
    pub fn new(min_text_length: usize, min_alpha_ratio: f32) -> Self {
        Self {
            min_text_length,
            min_alpha_ratio: min_alpha_ratio.clamp(0.0, 1.0),
        }
    }

    pub fn min_text_length(&self) -> usize {
        self.min_text_length
    }

    pub fn min_alpha_ratio(&self) -> f32 {
        self.min_alpha_ratio
    }

    /// Evaluate one string
    ///
    /// Length is counted in characters. The ratio is alphabetic characters
    /// over all characters, whitespace included.
    pub fn evaluate(&self, text: &str) -> GateVerdict {
        let total = text.chars().count();
        if total < self.min_text_length {
            return GateVerdict::Reject(RejectionReason::TooShort);
        }
        if total == 0 {
            // only reachable with min_text_length == 0
            return GateVerdict::Reject(RejectionReason::LowAlphaRatio);
        }

        let alpha = text.chars().filter(|c| c.is_alphabetic()).count();
        let ratio = alpha as f32 / total as f32;
        if ratio < self.min_alpha_ratio {
            return GateVerdict::Reject(RejectionReason::LowAlphaRatio);
        }

        GateVerdict::Pass
    }

    pub fn is_meaningful(&self, text: &str) -> bool {
        self.evaluate(text).is_pass()
    }

    /// Gate a description in both its raw and normalized forms
    ///
    /// Normalization strips digits and symbols, so the alphabetic ratio is
    /// only informative on the raw text, while the length floor must hold
    /// for what the classifier will actually see. Both must pass. The
    /// normalized form is checked first.
    pub fn evaluate_description(&self, raw: &str, normalized: &str) -> GateVerdict {
        match self.evaluate(normalized) {
            GateVerdict::Pass => self.evaluate(raw.trim()),
            rejected => rejected,
        }
    }
}

/// Default-threshold gate on a single string
pub fn is_meaningful(text: &str) -> bool {
    MeaningfulnessGate::default().is_meaningful(text)
}
