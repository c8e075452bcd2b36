//! Process-local lookaside cache for embeddings.

pub mod store;
pub mod types;

#[cfg(test)]
mod store_tests;

pub use store::{CacheStore, CacheStoreHandle};
pub use types::{CacheEntry, CacheFault, CacheStats};
