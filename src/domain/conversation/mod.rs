//! Conversation module: one question's quality-controlled exchange.
//!
//! A `ConversationContext` is created per question, driven by the
//! `ConversationEngine` through a bounded retry loop, and discarded once the
//! question is accepted or escalated (its history folds into the owning
//! stage deliverable).

pub mod context;
pub mod engine;
pub mod message;
pub mod quality;
pub mod sanitizer;

pub use context::{ConversationContext, TurnState};
pub use engine::{ConversationEngine, EngineError, TurnOutcome};
pub use message::{Message, MessageRole};
pub use quality::QualityAssessment;
pub use sanitizer::{sanitize_response, SanitizedInput};
