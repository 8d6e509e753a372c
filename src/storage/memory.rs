use std::collections::HashMap;

use super::KeyValueStore;
use crate::error::StorageError;

/// In-memory [`KeyValueStore`] with an optional size quota.
///
/// The quota counts key plus value bytes across all entries; a write that
/// would exceed it fails with [`StorageError::QuotaExceeded`], the way
/// browser storage reports a full origin.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota: Option<usize>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota: Some(quota_bytes),
            ..Self::default()
        }
    }

    /// A store whose every operation fails, as when storage is blocked.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Read a value directly, bypassing availability checks.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Write a value directly, bypassing quota and availability checks.
    pub fn insert_raw(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        if let Some(quota) = self.quota {
            if self.used_bytes_without(key) + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded(key.to_string()));
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_rejects_oversized_write() {
        let mut store = MemoryStore::with_quota(10);
        assert!(store.set("k", "12345").is_ok());
        assert_eq!(
            store.set("j", "123456"),
            Err(StorageError::QuotaExceeded("j".to_string()))
        );
        // Overwriting an existing key only counts the new value.
        assert!(store.set("k", "123456789").is_ok());
    }

    #[test]
    fn unavailable_store_fails_everything() {
        let mut store = MemoryStore::unavailable();
        assert_eq!(store.get("k"), Err(StorageError::Unavailable));
        assert_eq!(store.set("k", "v"), Err(StorageError::Unavailable));
        assert_eq!(store.remove("k"), Err(StorageError::Unavailable));
    }
}
