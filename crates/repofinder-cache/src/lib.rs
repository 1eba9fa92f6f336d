// Local key-value persistence
// Survives restarts so the last search can be filtered again without a refetch

pub mod cache;
pub mod memory;

pub use cache::{CacheError, CacheManager, KeyValueStore};
pub use memory::MemoryStore;
