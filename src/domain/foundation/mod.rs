//! Foundation types shared across the domain.

mod errors;
mod ids;
mod session_status;
mod stage;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{CheckpointId, MessageId, SessionId, UserId};
pub use session_status::SessionStatus;
pub use stage::Stage;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
