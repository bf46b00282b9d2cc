//! Application layer - session orchestration and per-session concurrency.

mod locks;
mod orchestrator;
mod stage_runner;

pub use locks::{SessionGuard, SessionLocks};
pub use orchestrator::{AdvanceOutcome, OrchestratorError, SessionOrchestrator};
pub use stage_runner::{StageError, StageRunner};
