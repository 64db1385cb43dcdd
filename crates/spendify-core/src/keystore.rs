//! Small on-device key/value store holding the session, cached categories
//! and the offline expense queue.

use std::{collections::BTreeMap, sync::Mutex};

use serde::{de::DeserializeOwned, Serialize};

use crate::CoreError;

pub const USER_ID_KEY: &str = "user_id";
pub const USER_EMAIL_KEY: &str = "user_email";
pub const CATEGORIES_KEY: &str = "categories";
pub const OFFLINE_QUEUE_KEY: &str = "expense";

/// String key/value storage provided by the device.
pub trait SecureStore: Send + Sync {
    fn save(&self, key: &str, value: &str) -> Result<(), CoreError>;
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;
    fn delete(&self, key: &str) -> Result<(), CoreError>;
}

/// Serializes `value` as JSON and stores it under `key`.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn SecureStore,
    key: &str,
    value: &T,
) -> Result<(), CoreError> {
    let json = serde_json::to_string(value)?;
    store.save(key, &json)
}

/// Loads and deserializes the JSON stored under `key`, if any.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn SecureStore,
    key: &str,
) -> Result<Option<T>, CoreError> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

#[derive(Debug, Default)]
pub struct MemorySecureStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemorySecureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl SecureStore for MemorySecureStore {
    fn save(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CoreError::Storage("secure store lock poisoned".into()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| CoreError::Storage("secure store lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn delete(&self, key: &str) -> Result<(), CoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CoreError::Storage("secure store lock poisoned".into()))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_helpers_round_trip_through_store() {
        let store = MemorySecureStore::new();
        save_json(&store, CATEGORIES_KEY, &vec!["Food", "Rent"]).unwrap();
        let loaded: Option<Vec<String>> = load_json(&store, CATEGORIES_KEY).unwrap();
        assert_eq!(loaded, Some(vec!["Food".to_string(), "Rent".to_string()]));

        store.delete(CATEGORIES_KEY).unwrap();
        let missing: Option<Vec<String>> = load_json(&store, CATEGORIES_KEY).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn corrupt_json_surfaces_as_error() {
        let store = MemorySecureStore::new();
        store.save(OFFLINE_QUEUE_KEY, "not json").unwrap();
        let result: Result<Option<Vec<String>>, _> = load_json(&store, OFFLINE_QUEUE_KEY);
        assert!(matches!(result, Err(CoreError::Serde(_))));
    }
}
