//! Adapters layer - implementations of the ports.

pub mod ai;
pub mod interview;
pub mod persistence;
pub mod storage;
