//! Stage gates: completeness validation and cross-stage consistency.

mod consistency;
mod validator;

pub use consistency::{ConsistencyChecker, ConsistencyReport};
pub use validator::{GateOutcome, StageGateValidator};
