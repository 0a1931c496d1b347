//! Save slot persistence.
//!
//! A [`SlotStore`] is a plain key-value facility; the [`SlotAdapter`] maps
//! slot indices onto its keys, wraps interpreter state in a
//! [`SaveEnvelope`], and keeps the active-slot pointer.

mod adapter;
mod envelope;
mod store;

pub use adapter::{SlotAdapter, SlotSummary};
pub use envelope::{SAVE_VERSION, SaveEnvelope, StoredSave};
pub use store::{DirStore, MemoryStore, SlotStore};
