//! Checkpoint storage adapters.

mod file_checkpoint_store;
mod in_memory_checkpoint_store;

pub use file_checkpoint_store::FileCheckpointStore;
pub use in_memory_checkpoint_store::InMemoryCheckpointStore;
