//! Handoff store: one serialized JSON value per key, last write wins.
//!
//! The submission step writes the raw service response into the slot for
//! its domain; the result page reads it back on mount. Reading does not
//! consume the slot, so a later mount sees the same payload until the next
//! submission overwrites it.

mod sqlite;

pub use sqlite::SqliteStore;

use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;

use crate::logging::{log_slot_clear, log_slot_read, log_slot_write};

pub trait HandoffStore {
    /// Serialize `value` and replace whatever `key` held.
    fn put(&mut self, key: &str, value: &Value) -> Result<()>;
    /// Serialized text last written under `key`, `None` if never written
    /// or cleared.
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn clear(&mut self, key: &str) -> Result<()>;
}

/// Process-local store. Used by tests and by callers that keep the page
/// and the submission in one process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw text as-is, bypassing serialization. Lets callers plant
    /// payloads that are not valid JSON.
    pub fn put_raw(&mut self, key: &str, text: impl Into<String>) {
        self.slots.insert(key.to_string(), text.into());
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl HandoffStore for MemoryStore {
    fn put(&mut self, key: &str, value: &Value) -> Result<()> {
        let text = serde_json::to_string(value)?;
        log_slot_write(key, &text);
        self.slots.insert(key.to_string(), text);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let text = self.slots.get(key).cloned();
        log_slot_read(key, text.as_deref());
        Ok(text)
    }

    fn clear(&mut self, key: &str) -> Result<()> {
        self.slots.remove(key);
        log_slot_clear(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_key_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("geo_prediction").unwrap(), None);
    }

    #[test]
    fn test_put_overwrites() {
        let mut store = MemoryStore::new();
        store.put("k", &json!({"prediction": [1]})).unwrap();
        store.put("k", &json!({"error": "second"})).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("{\"error\":\"second\"}"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_does_not_consume() {
        let mut store = MemoryStore::new();
        store.put("k", &json!(1)).unwrap();
        assert!(store.get("k").unwrap().is_some());
        assert!(store.get("k").unwrap().is_some());
    }

    #[test]
    fn test_clear_and_independent_slots() {
        let mut store = MemoryStore::new();
        store.put("geo_prediction", &json!("g")).unwrap();
        store.put("meo_prediction", &json!("m")).unwrap();
        store.clear("geo_prediction").unwrap();
        assert_eq!(store.get("geo_prediction").unwrap(), None);
        assert_eq!(store.get("meo_prediction").unwrap().as_deref(), Some("\"m\""));
        store.clear("never_written").unwrap();
    }
}
