// In-process store for `--no-cache` runs and tests
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::cache::{CacheError, KeyValueStore, Result};

/// HashMap-backed store. Clones share the same map, which lets a test
/// "reload" by building a fresh consumer over the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Poisoned)?
            .clear();
        Ok(())
    }
}
