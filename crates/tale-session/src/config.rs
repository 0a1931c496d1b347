//! Configuration for a narrative session controller.

use serde::{Deserialize, Serialize};

/// A tracked inventory flag and the label shown when it is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Interpreter variable holding the flag.
    pub flag: String,
    /// Display label.
    pub label: String,
}

impl InventoryItem {
    /// Create an inventory mapping.
    pub fn new(flag: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            flag: flag.into(),
            label: label.into(),
        }
    }
}

/// Configuration for the session controller.
///
/// Deserializes with defaults for any missing field, so a config file only
/// needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of save slots.
    pub slot_count: usize,
    /// Prefix of the slot-store keys.
    pub key_prefix: String,
    /// Character attributes, in display order.
    pub attributes: Vec<String>,
    /// Points that must be distributed exactly.
    pub stat_pool: u32,
    /// Starting value of every attribute.
    pub stat_default: u32,
    /// Maximum value of a single attribute.
    pub stat_max: u32,
    /// Interpreter variable published as the coin counter.
    pub coin_variable: String,
    /// Tracked inventory flags, in display order.
    pub inventory: Vec<InventoryItem>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            slot_count: 3,
            key_prefix: "tale".to_string(),
            attributes: vec!["STR".to_string(), "CHA".to_string(), "WIT".to_string()],
            stat_pool: 15,
            stat_default: 5,
            stat_max: 20,
            coin_variable: "coins".to_string(),
            inventory: vec![
                InventoryItem::new("inv_rusty_sword", "Rusty Sword"),
                InventoryItem::new("inv_old_sack", "Old Sack"),
            ],
        }
    }
}

impl SessionConfig {
    /// Set the number of save slots (at least one).
    pub fn with_slot_count(mut self, slot_count: usize) -> Self {
        self.slot_count = slot_count.max(1);
        self
    }

    /// Set the slot-store key prefix.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Set the attribute point pool.
    pub fn with_stat_pool(mut self, pool: u32) -> Self {
        self.stat_pool = pool;
        self
    }

    /// Add a tracked inventory flag after the existing ones.
    pub fn with_item(mut self, flag: impl Into<String>, label: impl Into<String>) -> Self {
        self.inventory.push(InventoryItem::new(flag, label));
        self
    }

    /// Store key holding the given slot's contents (slots are zero-based,
    /// keys one-based).
    pub fn slot_key(&self, slot: usize) -> String {
        format!("{}_save_{}", self.key_prefix, slot + 1)
    }

    /// Store key holding the active-slot pointer.
    pub fn active_slot_key(&self) -> String {
        format!("{}_active_slot", self.key_prefix)
    }

    /// Load a config from JSON, filling unspecified fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Self = serde_json::from_str(json)?;
        let slot_count = config.slot_count;
        Ok(config.with_slot_count(slot_count))
    }
}
