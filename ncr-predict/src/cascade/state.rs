//! Cascade states and fallback causes

use crate::text::RejectionReason;
use serde::{Serialize, Serializer};

/// Orchestrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CascadeState {
    Start,
    Normalized,
    GateChecked,
    Stage1Done,
    Stage2Done,
    /// Terminal: full triple produced
    Stage3Done,
    /// Terminal: fallback triple produced
    Unknown,
}

impl CascadeState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CascadeState::Stage3Done | CascadeState::Unknown)
    }
}

/// Why a run ended in `Unknown`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownCause {
    /// Meaningfulness gate refused the input
    Gate(RejectionReason),
    /// Stage-1 confidence below the unknown threshold
    LowDefectConfidence,
    /// Stage-2 confidence below its optional threshold
    LowRootCauseConfidence,
    /// Stage-3 confidence below its optional threshold
    LowCorrectiveActionConfidence,
}

impl UnknownCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnknownCause::Gate(reason) => reason.as_str(),
            UnknownCause::LowDefectConfidence => "low_defect_confidence",
            UnknownCause::LowRootCauseConfidence => "low_root_cause_confidence",
            UnknownCause::LowCorrectiveActionConfidence => "low_corrective_action_confidence",
        }
    }
}

impl Serialize for UnknownCause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
