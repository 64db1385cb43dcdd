use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use spendify_core::{CoreError, SecureStore};

use crate::{tmp_path, write_atomic};

/// Device key store persisted as a flat JSON object.
pub struct JsonSecureStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonSecureStore {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update(
        &self,
        change: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<(), CoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CoreError::Storage("secure store lock poisoned".into()))?;
        let mut next = entries.clone();
        change(&mut next);
        let json = serde_json::to_string_pretty(&next)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        *entries = next;
        Ok(())
    }
}

impl SecureStore for JsonSecureStore {
    fn save(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| CoreError::Storage("secure store lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn delete(&self, key: &str) -> Result<(), CoreError> {
        let present = self.get(key)?.is_some();
        if !present {
            return Ok(());
        }
        self.update(|entries| {
            entries.remove(key);
        })
    }
}
