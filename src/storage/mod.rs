//! Persistence of slots and voice preferences.
//!
//! The reader persists through any flat string key-value store that
//! implements [`KeyValueStore`] (browser local storage, a file, a map).
//! Storage is optional and may fail at any time: the first failure turns
//! persistence off for the rest of the session and every later save is
//! skipped silently.
//!
//! # Keys
//!
//! | Key | Value |
//! |---|---|
//! | `<prefix>:slots` | JSON array of slots: `[{"text": "...", "progress": 0, "playStatus": "stopped"}]` |
//! | `<prefix>:activeSlot` | 1-based active slot number, e.g. `"2"` |
//! | `<prefix>:voicePrefs` | JSON object, base language to voice key |

mod memory;
mod prefs;
mod slot;
mod slots;

pub use memory::MemoryStore;
pub use prefs::VoicePreferences;
pub use slot::{deserialize_slot, serialize_slot, Slot};
pub use slots::SlotStore;

use crate::error::StorageError;

/// A flat string key-value store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Storage key written and removed once at startup to check the store works.
pub const PROBE_KEY: &str = "__speech_app_test__";

/// Fully qualified storage keys for one key prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub slots: String,
    pub active_slot: String,
    pub voice_prefs: String,
    /// Single-document keys from before slots existed; removed on load.
    pub legacy_text: String,
    pub legacy_progress: String,
}

impl StorageKeys {
    pub fn new(prefix: &str) -> Self {
        Self {
            slots: format!("{prefix}:slots"),
            active_slot: format!("{prefix}:activeSlot"),
            voice_prefs: format!("{prefix}:voicePrefs"),
            legacy_text: format!("{prefix}:text"),
            legacy_progress: format!("{prefix}:progress"),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::new("speechApp")
    }
}
