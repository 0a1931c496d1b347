//! Per-slot operations on top of a [`SlotStore`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use tale_core::SlotIndex;
use tracing::{debug, warn};

use super::envelope::{SaveEnvelope, StoredSave};
use super::store::SlotStore;
use crate::config::SessionConfig;
use crate::error::StoreError;

/// Presence and metadata of one slot, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotSummary {
    /// The slot.
    pub slot: SlotIndex,
    /// Whether a save is stored.
    pub occupied: bool,
    /// When the save was written, if recorded.
    pub saved_at: Option<DateTime<Utc>>,
    /// Whether the save predates the envelope format.
    pub legacy: bool,
    /// Whether this is the last slot written.
    pub active: bool,
}

/// Maps slot indices to store keys and absorbs store failures.
///
/// Reads that fail are logged and treated as an empty slot. Writes report
/// failure to the caller so it can keep playing in memory.
#[derive(Debug)]
pub struct SlotAdapter<St> {
    store: St,
    slot_keys: Vec<String>,
    active_key: String,
}

impl<St: SlotStore> SlotAdapter<St> {
    /// Wrap a store using the keys named by `config`.
    pub fn new(store: St, config: &SessionConfig) -> Self {
        Self {
            store,
            slot_keys: (0..config.slot_count).map(|i| config.slot_key(i)).collect(),
            active_key: config.active_slot_key(),
        }
    }

    /// Number of slots.
    pub fn slot_count(&self) -> usize {
        self.slot_keys.len()
    }

    /// The underlying store.
    pub fn store(&self) -> &St {
        &self.store
    }

    /// The underlying store, mutably.
    pub fn store_mut(&mut self) -> &mut St {
        &mut self.store
    }

    /// Whether a save is stored in `slot`.
    pub fn has_save(&self, slot: SlotIndex) -> bool {
        self.read_raw(slot).is_some()
    }

    /// Read the save stored in `slot`.
    pub fn read_save(&self, slot: SlotIndex) -> Option<StoredSave> {
        self.read_raw(slot).map(|raw| StoredSave::parse(&raw))
    }

    /// Write a complete interpreter state to `slot` and mark it active.
    pub fn write_save(&mut self, slot: SlotIndex, state: &str) -> Result<(), StoreError> {
        let key = self.key(slot)?;
        let json = SaveEnvelope::new(state)
            .to_json()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        self.store.set(&key, &json)?;

        if let Err(e) = self.store.set(&self.active_key, &slot.get().to_string()) {
            warn!(slot = slot.number(), error = %e, "Failed to record active slot");
        }
        debug!(slot = slot.number(), bytes = json.len(), "Wrote save");
        Ok(())
    }

    /// Clear `slot`. The active-slot pointer is left as it is.
    pub fn delete_save(&mut self, slot: SlotIndex) {
        let result = self.key(slot).and_then(|key| self.store.remove(&key));
        match result {
            Ok(()) => debug!(slot = slot.number(), "Deleted save"),
            Err(e) => warn!(slot = slot.number(), error = %e, "Failed to delete save"),
        }
    }

    /// The slot written most recently, or the first slot when unknown.
    pub fn last_active_slot(&self) -> SlotIndex {
        let raw = match self.store.get(&self.active_key) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Failed to read active slot");
                None
            }
        };
        raw.and_then(|s| s.trim().parse::<usize>().ok())
            .and_then(|i| SlotIndex::new(i, self.slot_count()))
            .unwrap_or(SlotIndex::FIRST)
    }

    /// Presence of a save in every slot, in order.
    pub fn presence(&self) -> Vec<bool> {
        SlotIndex::all(self.slot_count())
            .map(|slot| self.has_save(slot))
            .collect()
    }

    /// Listing information for one slot.
    pub fn summary(&self, slot: SlotIndex) -> SlotSummary {
        let stored = self.read_save(slot);
        SlotSummary {
            slot,
            occupied: stored.is_some(),
            saved_at: stored.as_ref().and_then(StoredSave::saved_at),
            legacy: stored.as_ref().is_some_and(StoredSave::is_legacy),
            active: self.last_active_slot() == slot,
        }
    }

    /// Listing information for every slot.
    pub fn summaries(&self) -> Vec<SlotSummary> {
        SlotIndex::all(self.slot_count())
            .map(|slot| self.summary(slot))
            .collect()
    }

    fn key(&self, slot: SlotIndex) -> Result<String, StoreError> {
        self.slot_keys
            .get(slot.get())
            .cloned()
            .ok_or_else(|| StoreError::Unavailable(format!("no key for {slot}")))
    }

    fn read_raw(&self, slot: SlotIndex) -> Option<String> {
        let key = self.key(slot).ok()?;
        match self.store.get(&key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(slot = slot.number(), error = %e, "Failed to read save");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::store::MemoryStore;

    fn adapter() -> SlotAdapter<MemoryStore> {
        SlotAdapter::new(MemoryStore::new(), &SessionConfig::default())
    }

    fn slot(i: usize) -> SlotIndex {
        SlotIndex::new(i, 3).unwrap()
    }

    /// A store whose writes always fail, like a full or disabled backend.
    struct FullStore;

    impl SlotStore for FullStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("disabled".to_string()))
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("quota exceeded".to_string()))
        }
        fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disabled".to_string()))
        }
    }

    #[test]
    fn empty_slots() {
        let a = adapter();
        assert!(!a.has_save(slot(0)));
        assert!(a.read_save(slot(1)).is_none());
        assert_eq!(a.presence(), vec![false, false, false]);
        assert_eq!(a.last_active_slot(), SlotIndex::FIRST);
    }

    #[test]
    fn write_marks_active() {
        let mut a = adapter();
        a.write_save(slot(2), "state-b").unwrap();

        assert!(a.has_save(slot(2)));
        assert_eq!(a.read_save(slot(2)).unwrap().state(), "state-b");
        assert_eq!(a.last_active_slot(), slot(2));
        assert_eq!(a.presence(), vec![false, false, true]);
        assert_eq!(
            a.store().get("tale_active_slot").unwrap().as_deref(),
            Some("2")
        );
    }

    #[test]
    fn delete_leaves_pointer_stale() {
        let mut a = adapter();
        a.write_save(slot(1), "state").unwrap();
        a.delete_save(slot(1));
        a.delete_save(slot(1));

        assert!(!a.has_save(slot(1)));
        assert_eq!(a.last_active_slot(), slot(1));
    }

    #[test]
    fn bad_pointer_defaults_to_first() {
        let mut a = adapter();
        a.store_mut().set("tale_active_slot", "seven").unwrap();
        assert_eq!(a.last_active_slot(), SlotIndex::FIRST);
        a.store_mut().set("tale_active_slot", "9").unwrap();
        assert_eq!(a.last_active_slot(), SlotIndex::FIRST);
    }

    #[test]
    fn empty_value_is_no_save() {
        let mut a = adapter();
        a.store_mut().set("tale_save_1", "").unwrap();
        assert!(!a.has_save(slot(0)));
    }

    #[test]
    fn summaries() {
        let mut a = adapter();
        a.write_save(slot(0), "state").unwrap();
        a.store_mut().set("tale_save_2", "raw-state").unwrap();

        let list = a.summaries();
        assert_eq!(list.len(), 3);
        assert!(list[0].occupied && list[0].active && list[0].saved_at.is_some());
        assert!(list[1].occupied && list[1].legacy && !list[1].active);
        assert!(!list[2].occupied);
    }

    #[test]
    fn failing_store_is_absorbed() {
        let mut a = SlotAdapter::new(FullStore, &SessionConfig::default());
        assert!(!a.has_save(slot(0)));
        assert!(a.write_save(slot(0), "state").is_err());
        a.delete_save(slot(0));
        assert_eq!(a.last_active_slot(), SlotIndex::FIRST);
    }
}
