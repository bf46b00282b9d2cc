//! Completeness Reviewer Port - advisory gate opinion.
//!
//! An optional, typically LLM-backed second opinion on whether a stage
//! deliverable is substantively complete. Advisory by default: findings
//! land in the gate outcome's issue list and only block advancement when
//! the gate policy says so.

use async_trait::async_trait;

use crate::domain::foundation::Stage;
use crate::domain::session::StageDeliverable;

/// Port for qualitative deliverable review.
#[async_trait]
pub trait CompletenessReviewer: Send + Sync {
    /// Returns qualitative concerns with a deliverable, empty if none.
    ///
    /// Failures are the implementation's to swallow; a reviewer that cannot
    /// reach its backend should return no findings rather than an error,
    /// because an advisory check must never be able to wedge the gate.
    async fn review(&self, stage: Stage, deliverable: &StageDeliverable) -> Vec<String>;
}
