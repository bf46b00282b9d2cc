//! Session domain: the interview aggregate and its durable snapshots.

mod aggregate;
mod checkpoint;
mod deliverable;
mod errors;

pub use aggregate::Session;
pub use checkpoint::Checkpoint;
pub use deliverable::{StageData, StageDeliverable};
pub use errors::SessionError;
