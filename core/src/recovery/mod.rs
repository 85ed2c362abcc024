//! Durable log of content that was closed without being saved.

pub mod durable;
pub mod entry;
pub mod store;

pub use durable::{DurableStore, MemoryStore};
pub use entry::RecoveryEntry;
pub use store::RecoveryStore;
