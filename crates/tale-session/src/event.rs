//! Diagnostic events recorded by the controller.

use serde::Serialize;
use tale_core::SlotIndex;

/// Something noteworthy that happened during an operation.
///
/// Events never change what an operation returns; they let a presentation
/// layer surface diagnostics such as a discarded corrupt save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A new game began in a slot.
    Started {
        /// The slot played.
        slot: SlotIndex,
    },
    /// A saved game was restored.
    Loaded {
        /// The slot restored.
        slot: SlotIndex,
    },
    /// A save could not be restored and was deleted.
    CorruptSaveDiscarded {
        /// The slot cleared.
        slot: SlotIndex,
        /// Why restoring failed.
        reason: String,
    },
    /// Progress could not be written; play continues in memory.
    SaveFailed {
        /// The slot that was not written.
        slot: SlotIndex,
        /// What went wrong.
        reason: String,
    },
    /// A slot was cleared on request.
    Deleted {
        /// The slot cleared.
        slot: SlotIndex,
    },
    /// The live session was discarded.
    ReturnedToMenu,
}
