//! Scripted provider adapters.

mod scripted;

pub use scripted::{ScriptedEvaluator, ScriptedGenerator, ScriptedRespondent};
