//! Domain layer: pure interview-workflow logic, no I/O.

pub mod conversation;
pub mod foundation;
pub mod gate;
pub mod session;
