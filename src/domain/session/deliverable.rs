//! Stage deliverables: the structured output each completed stage yields.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::conversation::Message;
use crate::domain::foundation::{Stage, Timestamp, ValidationError};

/// All deliverables accumulated so far, keyed by stage.
///
/// A BTreeMap so serialized snapshots have a stable field order, which the
/// checkpoint checksum depends on.
pub type StageData = BTreeMap<Stage, StageDeliverable>;

/// The structured output of one completed stage.
///
/// Fields map the stage's required field names to the accepted answers.
/// Fields filled under the accept-best-available escalation policy are
/// listed in `escalated_fields` so downstream review knows which answers
/// never cleared the quality bar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageDeliverable {
    stage: Stage,
    fields: BTreeMap<String, serde_json::Value>,
    escalated_fields: BTreeSet<String>,
    transcript: Vec<Message>,
    completed_at: Timestamp,
}

impl StageDeliverable {
    /// Creates a deliverable for a stage.
    ///
    /// Every required field of the stage must be present and non-empty.
    pub fn new(
        stage: Stage,
        fields: BTreeMap<String, serde_json::Value>,
        escalated_fields: BTreeSet<String>,
        transcript: Vec<Message>,
    ) -> Result<Self, ValidationError> {
        for required in stage.required_fields() {
            match fields.get(*required) {
                Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {}
                Some(serde_json::Value::String(_)) | None => {
                    return Err(ValidationError::empty_field(*required));
                }
                Some(_) => {}
            }
        }
        Ok(Self {
            stage,
            fields,
            escalated_fields,
            transcript,
            completed_at: Timestamp::now(),
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn fields(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.fields
    }

    /// The answer recorded for a field, if any.
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.fields.get(name)
    }

    /// The answer for a field as text, if it is a string.
    pub fn field_text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_str())
    }

    /// Fields whose answers never cleared the quality bar.
    pub fn escalated_fields(&self) -> &BTreeSet<String> {
        &self.escalated_fields
    }

    /// True when at least one field was filled via escalation.
    pub fn has_escalations(&self) -> bool {
        !self.escalated_fields.is_empty()
    }

    /// The conversation that produced this deliverable.
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn completed_at(&self) -> Timestamp {
        self.completed_at
    }
}
