//! Gate and escalation policy.

use serde::Deserialize;

/// What happens to a question whose retry budget runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EscalationPolicy {
    /// Record the best response seen so far and flag the deliverable field.
    #[default]
    AcceptBestAvailable,
    /// Stop the stage run and surface the escalation to the caller.
    RequireReview,
}

/// Controls which gate findings block stage advancement.
///
/// Deterministic required-field checks always block regardless of policy;
/// these switches only govern the advisory layers.
#[derive(Debug, Clone, Deserialize)]
pub struct GatePolicy {
    /// When true, advisory reviewer findings block advancement.
    #[serde(default)]
    pub advisory_blocking: bool,

    /// When true, an inconsistent pipeline fails the consistency check
    /// instead of returning an advisory report.
    #[serde(default)]
    pub consistency_blocking: bool,

    /// How escalated questions are resolved.
    #[serde(default)]
    pub escalation: EscalationPolicy,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            advisory_blocking: false,
            consistency_blocking: false,
            escalation: EscalationPolicy::AcceptBestAvailable,
        }
    }
}
