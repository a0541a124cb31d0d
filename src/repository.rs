//! Repository pattern for data access
//!
//! Each collection is loaded once into an id index and written back as a
//! JSON list under its storage key, so lookups never rescan the stored
//! list while the persisted layout stays the one the front end expects.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Result, TeaCalError};
use crate::models::{ConsumptionRecord, UserProfile};
use crate::storage::{self, KeyValueStore};

/// An entity with a stable string id
pub trait Entity: Clone + Serialize + DeserializeOwned {
    /// Unique id of this entity
    fn id(&self) -> &str;
}

impl Entity for UserProfile {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for ConsumptionRecord {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Keyed access to a collection of entities
pub trait Repository<T: Entity> {
    /// Entity by id
    fn get(&self, id: &str) -> Option<&T>;
    /// Insert or replace an entity and persist the collection
    fn put(&mut self, entity: T) -> Result<()>;
    /// Every entity in insertion order
    fn list(&self) -> &[T];
}

/// Repository persisted as a JSON list under one storage key
pub struct JsonListRepository<T: Entity> {
    store: Arc<dyn KeyValueStore>,
    key: &'static str,
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T: Entity> JsonListRepository<T> {
    /// Load the collection stored under `key`.
    ///
    /// A value that is present but cannot be decoded is reported as
    /// [`TeaCalError::IncompatibleStoredData`].
    pub fn load(store: Arc<dyn KeyValueStore>, key: &'static str) -> Result<Self> {
        let items: Vec<T> = match storage::get_json(store.as_ref(), key) {
            Ok(items) => items.unwrap_or_default(),
            Err(TeaCalError::Serialization(e)) => {
                return Err(TeaCalError::IncompatibleStoredData(format!("{key}: {e}")));
            },
            Err(e) => return Err(e),
        };
        let mut repo = Self {
            store,
            key,
            items: Vec::with_capacity(items.len()),
            index: HashMap::with_capacity(items.len()),
        };
        let stored = items.len();
        // A repeated id keeps its first position and its last value
        for item in items {
            if let Some(&i) = repo.index.get(item.id()) {
                repo.items[i] = item;
            } else {
                repo.index.insert(item.id().to_string(), repo.items.len());
                repo.items.push(item);
            }
        }
        if repo.items.len() != stored {
            warn!(key, dropped = stored - repo.items.len(), "Dropped duplicate ids");
        }
        debug!(key, count = repo.items.len(), "Loaded collection");
        Ok(repo)
    }

    /// Number of entities
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the collection is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop every entity and remove the storage key
    pub fn clear(&mut self) -> Result<()> {
        self.items.clear();
        self.index.clear();
        self.store.remove(self.key)
    }

    fn persist(&self) -> Result<()> {
        storage::set_json(self.store.as_ref(), self.key, &self.items)
    }
}

impl<T: Entity> Repository<T> for JsonListRepository<T> {
    fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    fn put(&mut self, entity: T) -> Result<()> {
        let previous = if let Some(&i) = self.index.get(entity.id()) {
            Some(std::mem::replace(&mut self.items[i], entity))
        } else {
            self.index.insert(entity.id().to_string(), self.items.len());
            self.items.push(entity);
            None
        };

        if let Err(e) = self.persist() {
            // Keep memory consistent with storage
            match previous {
                Some(old) => {
                    let i = self.index[old.id()];
                    self.items[i] = old;
                },
                None => {
                    if let Some(added) = self.items.pop() {
                        self.index.remove(added.id());
                    }
                },
            }
            return Err(e);
        }
        Ok(())
    }

    fn list(&self) -> &[T] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DrinkRef, Mood};
    use crate::storage::{keys, MemoryStore, MockKeyValueStore};
    use chrono::Utc;

    fn record(id: &str) -> ConsumptionRecord {
        ConsumptionRecord {
            id: id.to_string(),
            drink_ref: DrinkRef {
                name: "烤奶".to_string(),
                brand: "益禾堂".to_string(),
                calories: 350.0,
            },
            cup_size: None,
            sugar_level: None,
            mood: Mood::Relaxed,
            notes: String::new(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_put_then_reload() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut repo: JsonListRepository<ConsumptionRecord> =
            JsonListRepository::load(Arc::clone(&store), keys::RECORDS).unwrap();
        repo.put(record("a")).unwrap();
        repo.put(record("b")).unwrap();

        let reloaded: JsonListRepository<ConsumptionRecord> =
            JsonListRepository::load(store, keys::RECORDS).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get("b").map(|r| r.id.as_str()), Some("b"));
        assert_eq!(reloaded.list()[0].id, "a");
    }

    #[test]
    fn test_put_replaces_same_id() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut repo: JsonListRepository<ConsumptionRecord> =
            JsonListRepository::load(store, keys::RECORDS).unwrap();
        repo.put(record("a")).unwrap();
        let mut changed = record("a");
        changed.notes = "second".to_string();
        repo.put(changed).unwrap();
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.list()[0].notes, "second");
    }

    #[test]
    fn test_duplicate_ids_collapse_on_load() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut later = record("a");
        later.notes = "later".to_string();
        storage::set_json(store.as_ref(), keys::RECORDS, &vec![record("a"), record("b"), later])
            .unwrap();

        let mut repo: JsonListRepository<ConsumptionRecord> =
            JsonListRepository::load(Arc::clone(&store), keys::RECORDS).unwrap();
        assert_eq!(repo.len(), 2);
        assert_eq!(repo.list()[0].notes, "later");
        assert_eq!(repo.list()[1].id, "b");

        let mut changed = record("a");
        changed.notes = "edited".to_string();
        repo.put(changed).unwrap();
        let stored: Vec<ConsumptionRecord> = storage::get_json(store.as_ref(), keys::RECORDS)
            .unwrap()
            .unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().filter(|r| r.id == "a").all(|r| r.notes == "edited"));
    }

    #[test]
    fn test_undecodable_collection_is_incompatible() {
        let store = MemoryStore::new();
        store.set(keys::RECORDS, "{\"legacy\":true}").unwrap();
        let result: Result<JsonListRepository<ConsumptionRecord>> =
            JsonListRepository::load(Arc::new(store), keys::RECORDS);
        assert!(matches!(result, Err(TeaCalError::IncompatibleStoredData(_))));
    }

    #[test]
    fn test_failed_write_rolls_back_memory() {
        let mut mock = MockKeyValueStore::new();
        mock.expect_get().returning(|_| Ok(None));
        mock.expect_set()
            .returning(|_, _| Err(TeaCalError::Storage("disk full".to_string())));

        let mut repo: JsonListRepository<ConsumptionRecord> =
            JsonListRepository::load(Arc::new(mock), keys::RECORDS).unwrap();
        assert!(repo.put(record("a")).is_err());
        assert!(repo.is_empty());
        assert!(repo.get("a").is_none());
    }
}
