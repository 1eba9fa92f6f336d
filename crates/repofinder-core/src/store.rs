// The base set: last successful search, kept in memory and mirrored to disk
use repofinder_cache::KeyValueStore;
use tracing::{debug, warn};

use crate::{models::RepositoryRecord, Result};

/// Key holding the JSON array of the base set
pub const BASE_SET_KEY: &str = "repositories";

/// Holds the unfiltered, unsorted records of the most recent search
///
/// `replace` is the only way to change the contents. Filtering and sorting
/// read from here and never write back.
pub struct ResultStore<S> {
    kv: S,
    records: Vec<RepositoryRecord>,
}

impl<S: KeyValueStore> ResultStore<S> {
    /// Open over a key-value store, seeding memory from whatever was persisted
    pub fn open(kv: S) -> Self {
        let mut store = Self {
            kv,
            records: Vec::new(),
        };
        store.records = store.load_persisted();
        debug!("Result store opened with {} persisted records", store.records.len());
        store
    }

    /// Swap in a new batch and mirror it
    ///
    /// A mirror write failure is logged; the in-memory batch is still replaced.
    pub fn replace(&mut self, records: Vec<RepositoryRecord>) {
        if let Err(e) = self.persist(&records) {
            warn!("Could not persist {} records: {}", records.len(), e);
        }
        self.records = records;
    }

    /// Read the mirror. Missing or corrupt data reads as an empty list.
    pub fn load_persisted(&self) -> Vec<RepositoryRecord> {
        let raw = match self.kv.get(BASE_SET_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Could not read persisted results: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!("Ignoring malformed persisted results: {}", e);
                Vec::new()
            }
        }
    }

    pub fn base_set(&self) -> &[RepositoryRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop both the mirror and the in-memory copy
    pub fn clear(&mut self) -> Result<()> {
        self.kv.clear()?;
        self.records.clear();
        Ok(())
    }

    fn persist(&self, records: &[RepositoryRecord]) -> Result<()> {
        let json = serde_json::to_string(records)?;
        self.kv.set(BASE_SET_KEY, &json)?;
        Ok(())
    }
}
