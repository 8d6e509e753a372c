use log::{debug, warn};

use super::slot::{parse_slot_array, serialize_slot_array};
use super::{KeyValueStore, Slot, StorageKeys, VoicePreferences, PROBE_KEY};
use crate::error::StorageError;
use crate::playback::PlayState;

/// The slot collection and the active slot, mirrored to a store.
///
/// Slots live in memory whether or not a store is attached. Every write goes
/// through one guard: once any store operation fails, persistence is off for
/// the rest of the session and later writes are skipped.
#[derive(Debug)]
pub struct SlotStore<S> {
    store: Option<S>,
    enabled: bool,
    keys: StorageKeys,
    slots: Vec<Slot>,
    active: usize,
}

impl<S: KeyValueStore> SlotStore<S> {
    /// Probe the store, load the slots and the active slot, and drop legacy
    /// single-document keys.
    pub fn open(store: Option<S>, prefix: &str, slot_count: usize) -> Self {
        let slot_count = slot_count.max(1);
        let mut this = Self {
            enabled: store.is_some(),
            store,
            keys: StorageKeys::new(prefix),
            slots: vec![Slot::default(); slot_count],
            active: 1,
        };
        if this.enabled {
            this.probe();
        }
        if this.enabled {
            this.load(slot_count);
            this.cleanup_legacy();
        }
        this
    }

    fn probe(&mut self) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        let result = store
            .set(PROBE_KEY, "1")
            .and_then(|()| store.remove(PROBE_KEY));
        if let Err(e) = result {
            warn!("Storage probe failed, persistence disabled: {}", e);
            self.enabled = false;
        }
    }

    fn load(&mut self, slot_count: usize) {
        let slots_key = self.keys.slots.clone();
        let raw = self.read(&slots_key);
        let parsed = raw.as_deref().map(parse_slot_array);
        let mut slots = match parsed {
            Some(Ok(slots)) => slots,
            Some(Err(e)) => {
                warn!("Discarding unreadable slots: {}", e);
                Vec::new()
            }
            None => Vec::new(),
        };
        slots.resize_with(slot_count, Slot::default);
        self.slots = slots;
        self.save_slots();

        let active_key = self.keys.active_slot.clone();
        let stored_active = self.read(&active_key);
        self.active = stored_active
            .as_deref()
            .map(|raw| self.parse_slot_number(raw))
            .unwrap_or(1);
        self.save_active();
        debug!(
            "Loaded {} slots, active slot {}",
            self.slots.len(),
            self.active
        );
    }

    fn cleanup_legacy(&mut self) {
        let slots_key = self.keys.slots.clone();
        if self.read(&slots_key).is_none() {
            return;
        }
        for key in [self.keys.legacy_text.clone(), self.keys.legacy_progress.clone()] {
            self.guard(|store| store.remove(&key));
        }
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// False when no store is attached or a store operation has failed.
    pub fn storage_enabled(&self) -> bool {
        self.enabled
    }

    pub fn store(&self) -> Option<&S> {
        self.store.as_ref()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Slot by 1-based number.
    pub fn slot(&self, number: usize) -> Option<&Slot> {
        number.checked_sub(1).and_then(|i| self.slots.get(i))
    }

    pub fn active_number(&self) -> usize {
        self.active
    }

    pub fn active_slot(&self) -> &Slot {
        &self.slots[self.active - 1]
    }

    /// Clamp a slot number into `1..=slot_count`; anything outside is 1.
    pub fn normalize_slot_number(&self, number: usize) -> usize {
        if (1..=self.slots.len()).contains(&number) {
            number
        } else {
            1
        }
    }

    fn parse_slot_number(&self, raw: &str) -> usize {
        raw.trim()
            .parse::<usize>()
            .map(|n| self.normalize_slot_number(n))
            .unwrap_or(1)
    }

    /// Write the whole active slot in one save.
    pub fn persist_active(&mut self, text: &str, progress: usize, status: PlayState) {
        let slot = Slot::new(text, progress, status);
        let index = self.active - 1;
        if self.slots[index] == slot {
            return;
        }
        self.slots[index] = slot;
        self.save_slots();
    }

    /// Make `number` (normalized) the active slot and persist the choice.
    pub fn set_active(&mut self, number: usize) -> usize {
        self.active = self.normalize_slot_number(number);
        self.save_active();
        self.active
    }

    pub fn load_voice_preferences(&mut self) -> VoicePreferences {
        let key = self.keys.voice_prefs.clone();
        self.read(&key)
            .and_then(|raw| VoicePreferences::from_json(&raw))
            .unwrap_or_default()
    }

    pub fn save_voice_preferences(&mut self, prefs: &VoicePreferences) {
        let key = self.keys.voice_prefs.clone();
        match prefs.to_json() {
            Ok(value) => {
                self.guard(|store| store.set(&key, &value));
            }
            Err(e) => warn!("Voice preferences not saved: {}", e),
        }
    }

    fn save_slots(&mut self) {
        let key = self.keys.slots.clone();
        match serialize_slot_array(&self.slots) {
            Ok(value) => {
                self.guard(|store| store.set(&key, &value));
            }
            Err(e) => warn!("Slots not saved: {}", e),
        }
    }

    fn save_active(&mut self) {
        let key = self.keys.active_slot.clone();
        let value = self.active.to_string();
        self.guard(|store| store.set(&key, &value));
    }

    fn read(&mut self, key: &str) -> Option<String> {
        self.guard(|store| store.get(key)).flatten()
    }

    fn guard<T>(&mut self, op: impl FnOnce(&mut S) -> Result<T, StorageError>) -> Option<T> {
        if !self.enabled {
            return None;
        }
        let store = self.store.as_mut()?;
        match op(store) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Storage failed, persistence disabled for this session: {}", e);
                self.enabled = false;
                None
            }
        }
    }
}
