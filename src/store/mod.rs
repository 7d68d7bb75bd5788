pub mod base;
pub mod memory_store;
pub mod mongodb_store;
pub mod unavailable_store;

// Re-export the primary store items so code outside can do
// "use crate::store::{ItemStore, create_store};"
pub use base::{create_store, seed_if_empty, ItemStore, SeedOutcome, StoreError};
pub use memory_store::MemoryItemStore;
pub use unavailable_store::UnavailableStore;
