use std::error::Error;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::storage::{KeyValueStore, SharedStore, load_json, save_json};
use crate::core::logging::error;

/// An append-only list of entities stored as a single JSON array. Every
/// mutation rewrites the full list so storage always mirrors memory.
pub struct PersistentCanvasState<T> {
    key: &'static str,
    storage: SharedStore,
    entries: Vec<T>,
}

impl<T> PersistentCanvasState<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn load(storage: SharedStore, key: &'static str) -> Self {
        let entries = load_entries(storage.as_ref(), key);
        Self {
            key,
            storage,
            entries,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry is kept in memory even if the write fails
    pub fn append(&mut self, entry: T) {
        self.entries.push(entry);
        self.flush();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.flush();
    }

    fn flush(&self) {
        if let Err(e) = self.try_flush() {
            error!("Unable to persist {}: {}", self.key, e);
        }
    }

    fn try_flush(&self) -> Result<(), Box<dyn Error>> {
        save_json(self.storage.as_ref(), self.key, &self.entries)
    }
}

/// Missing or structurally incompatible lists load as empty
pub fn load_entries<T: DeserializeOwned>(
    storage: &dyn KeyValueStore,
    key: &str,
) -> Vec<T> {
    load_json::<Vec<T>>(storage, key).unwrap_or_default()
}
