//! Stage gate validation.
//!
//! The gate between stages runs two layers: deterministic required-field
//! checks that always block, and an optional advisory reviewer whose
//! findings block only when policy says so.

use std::sync::Arc;

use crate::config::GatePolicy;
use crate::domain::foundation::Stage;
use crate::domain::session::StageDeliverable;
use crate::ports::CompletenessReviewer;

/// Verdict of a stage gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateOutcome {
    passed: bool,
    missing_fields: Vec<String>,
    issues: Vec<String>,
}

impl GateOutcome {
    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Required fields absent or blank in the deliverable.
    pub fn missing_fields(&self) -> &[String] {
        &self.missing_fields
    }

    /// Advisory findings; blocking only under `advisory_blocking`.
    pub fn issues(&self) -> &[String] {
        &self.issues
    }
}

/// Validates a stage deliverable before advancement.
pub struct StageGateValidator {
    reviewer: Option<Arc<dyn CompletenessReviewer>>,
    policy: GatePolicy,
}

impl StageGateValidator {
    /// Creates a validator with deterministic checks only.
    pub fn new(policy: GatePolicy) -> Self {
        Self {
            reviewer: None,
            policy,
        }
    }

    /// Adds an advisory completeness reviewer.
    pub fn with_reviewer(mut self, reviewer: Arc<dyn CompletenessReviewer>) -> Self {
        self.reviewer = Some(reviewer);
        self
    }

    /// Checks a stage's deliverable against its gate.
    ///
    /// A missing deliverable fails with every required field reported
    /// missing. Reviewer findings land in `issues` and only affect
    /// `passed` when the policy marks them blocking.
    pub async fn validate(
        &self,
        stage: Stage,
        deliverable: Option<&StageDeliverable>,
    ) -> GateOutcome {
        let missing_fields = match deliverable {
            None => stage
                .required_fields()
                .iter()
                .map(|f| f.to_string())
                .collect::<Vec<_>>(),
            Some(deliverable) => stage
                .required_fields()
                .iter()
                .copied()
                .filter(|&f| {
                    deliverable
                        .field_text(f)
                        .map_or(deliverable.field(f).is_none(), |s| s.trim().is_empty())
                })
                .map(|f| f.to_string())
                .collect(),
        };

        let issues = match (deliverable, &self.reviewer) {
            (Some(deliverable), Some(reviewer)) => reviewer.review(stage, deliverable).await,
            _ => Vec::new(),
        };

        let passed =
            missing_fields.is_empty() && (issues.is_empty() || !self.policy.advisory_blocking);

        if !passed {
            tracing::info!(
                stage = ?stage,
                missing = missing_fields.len(),
                issues = issues.len(),
                "stage gate rejected advancement"
            );
        }

        GateOutcome {
            passed,
            missing_fields,
            issues,
        }
    }
}
