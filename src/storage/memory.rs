use std::collections::BTreeMap;

use super::{KeyValueStore, StorageError, validate_key};

/// In-memory store. Counts writes so callers can observe persistence traffic.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `set` calls so far.
    pub const fn writes(&self) -> usize {
        self.writes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let mut store = MemoryStore::new();
        store.set("settings", "{}").unwrap();
        assert_eq!(store.get("settings").unwrap().as_deref(), Some("{}"));
        assert_eq!(store.writes(), 1);

        store.remove("settings").unwrap();
        assert_eq!(store.get("settings").unwrap(), None);
        store.remove("settings").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_invalid_key_is_not_written() {
        let mut store = MemoryStore::new();
        assert!(store.set("bad key", "x").is_err());
        assert_eq!(store.writes(), 0);
    }
}
