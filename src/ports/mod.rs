//! Ports: interfaces the engine consumes, implemented by adapters.

mod checkpoint_store;
mod completeness_reviewer;
mod quality_evaluator;
mod response_generator;
mod session_repository;
mod stage_agent;

pub use checkpoint_store::{CheckpointStore, CheckpointStoreError};
pub use completeness_reviewer::CompletenessReviewer;
pub use quality_evaluator::{EvaluatorError, QualityEvaluator};
pub use response_generator::{GeneratorError, ResponseGenerator};
pub use session_repository::SessionRepository;
pub use stage_agent::{Respondent, RespondentError, StageQuestion, StageQuestionProvider};
