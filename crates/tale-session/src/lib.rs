//! Narrative session controller.
//!
//! Drives a [`tale_core::Story`] interpreter through its continue/choice
//! cycle, keeps the transcript, republishes derived state (coins,
//! inventory) from interpreter variables, and manages multi-slot
//! save/load/delete with corruption recovery. Presentation layers talk to
//! [`SessionController`].

pub mod advance;
pub mod allocation;
pub mod config;
pub mod controller;
pub mod derived;
pub mod error;
pub mod event;
pub mod lifecycle;
pub mod slot;
pub mod transcript;

pub use advance::AdvanceMode;
pub use allocation::CharacterAllocation;
pub use config::{InventoryItem, SessionConfig};
pub use controller::{SessionController, SessionView};
pub use derived::DerivedState;
pub use error::{SessionError, SessionResult, StoreError};
pub use event::SessionEvent;
pub use lifecycle::{ActiveSession, LoadOutcome, Mode, ModeKind, SessionManager};
pub use slot::{DirStore, MemoryStore, SlotAdapter, SlotStore, SlotSummary};
pub use transcript::Transcript;
