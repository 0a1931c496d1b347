//! The on-disk wrapper around an interpreter state blob.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current save envelope version.
pub const SAVE_VERSION: u32 = 1;

/// A saved interpreter state with metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaveEnvelope {
    /// Envelope format version.
    pub version: u32,
    /// When the save was written.
    pub saved_at: DateTime<Utc>,
    /// The interpreter's opaque state.
    pub state: String,
}

impl SaveEnvelope {
    /// Wrap an interpreter state, stamped with the current time.
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            version: SAVE_VERSION,
            saved_at: Utc::now(),
            state: state.into(),
        }
    }

    /// Serialize to the stored form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A slot's contents as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredSave {
    /// A current-format envelope.
    Current(SaveEnvelope),
    /// A bare interpreter state from before envelopes, or anything else
    /// that is not a current envelope. The interpreter decides whether it
    /// restores.
    Legacy(String),
}

impl StoredSave {
    /// Classify a raw stored value.
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<SaveEnvelope>(raw) {
            Ok(envelope) if envelope.version == SAVE_VERSION => StoredSave::Current(envelope),
            _ => StoredSave::Legacy(raw.to_string()),
        }
    }

    /// The interpreter state to restore.
    pub fn state(&self) -> &str {
        match self {
            StoredSave::Current(envelope) => &envelope.state,
            StoredSave::Legacy(raw) => raw,
        }
    }

    /// When the save was written, if known.
    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        match self {
            StoredSave::Current(envelope) => Some(envelope.saved_at),
            StoredSave::Legacy(_) => None,
        }
    }

    /// Whether the value predates the envelope format.
    pub fn is_legacy(&self) -> bool {
        matches!(self, StoredSave::Legacy(_))
    }
}
