//! QualityAssessment value object.
//!
//! Produced once per validation call by the external evaluator; never
//! mutated after creation.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Lowest score the evaluator may return.
pub const MIN_SCORE: f32 = 0.0;

/// Highest score the evaluator may return.
pub const MAX_SCORE: f32 = 10.0;

/// Default acceptance threshold.
pub const DEFAULT_THRESHOLD: f32 = 7.0;

/// Scored verdict on one response.
///
/// # Invariants
///
/// - `score` lies in `[0.0, 10.0]`
/// - `is_acceptable` holds iff `score >= threshold`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityAssessment {
    score: f32,
    threshold: f32,
    is_acceptable: bool,
    issues: Vec<String>,
    suggested_followups: Vec<String>,
}

impl QualityAssessment {
    /// Creates an assessment, rejecting scores outside `[0, 10]`.
    pub fn new(
        score: f32,
        threshold: f32,
        issues: Vec<String>,
        suggested_followups: Vec<String>,
    ) -> Result<Self, ValidationError> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&score) || score.is_nan() {
            return Err(ValidationError::out_of_range(
                "score",
                MIN_SCORE as f64,
                MAX_SCORE as f64,
                score as f64,
            ));
        }
        Ok(Self {
            score,
            threshold,
            is_acceptable: score >= threshold,
            issues,
            suggested_followups,
        })
    }

    /// Creates an assessment against the default threshold.
    pub fn with_default_threshold(
        score: f32,
        issues: Vec<String>,
        suggested_followups: Vec<String>,
    ) -> Result<Self, ValidationError> {
        Self::new(score, DEFAULT_THRESHOLD, issues, suggested_followups)
    }

    /// Re-judges the score against a different threshold.
    ///
    /// The engine applies the configured acceptance threshold through this,
    /// overriding whatever threshold the evaluator judged against.
    pub fn against_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self.is_acceptable = self.score >= threshold;
        self
    }

    /// Returns the evaluator's score.
    pub fn score(&self) -> f32 {
        self.score
    }

    /// Returns the threshold the score was judged against.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Returns true if the response clears the threshold.
    pub fn is_acceptable(&self) -> bool {
        self.is_acceptable
    }

    /// Returns the issues the evaluator found.
    pub fn issues(&self) -> &[String] {
        &self.issues
    }

    /// Returns suggested follow-up angles.
    pub fn suggested_followups(&self) -> &[String] {
        &self.suggested_followups
    }
}
