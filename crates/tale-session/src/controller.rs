//! The single entry point for presentation layers.

use serde::Serialize;
use tale_core::{ChoiceView, SlotIndex, Story};

use crate::allocation::CharacterAllocation;
use crate::config::SessionConfig;
use crate::derived::DerivedState;
use crate::error::{SessionError, SessionResult};
use crate::event::SessionEvent;
use crate::lifecycle::{LoadOutcome, Mode, ModeKind, SessionManager};
use crate::slot::{SlotStore, SlotSummary};

/// Everything a presentation layer renders, in one serializable snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    /// Current mode.
    pub mode: ModeKind,
    /// Slot being created or played.
    pub slot: Option<SlotIndex>,
    /// Narrative text shown so far.
    pub transcript: Vec<String>,
    /// Choices on offer.
    pub choices: Vec<ChoiceView>,
    /// Counters and inventory.
    pub derived: DerivedState,
    /// Attribute allocation while creating a character.
    pub allocation: Option<CharacterAllocation>,
    /// Whether each slot holds a save.
    pub slot_presence: Vec<bool>,
    /// The slot the menu points at.
    pub highlighted_slot: SlotIndex,
    /// Whether the story reached a terminal point.
    pub finished: bool,
}

/// Routes presentation requests to the session manager.
///
/// Slots are addressed by plain zero-based indices; indices at or beyond
/// the configured slot count are rejected with
/// [`SessionError::SlotOutOfRange`].
pub struct SessionController<S: Story, St> {
    manager: SessionManager<S, St>,
}

impl<S: Story, St: SlotStore> SessionController<S, St> {
    /// Create an idle controller.
    pub fn new(script: S::Script, store: St, config: SessionConfig) -> Self {
        Self {
            manager: SessionManager::new(script, store, config),
        }
    }

    /// The underlying manager.
    pub fn manager(&self) -> &SessionManager<S, St> {
        &self.manager
    }

    /// Start creating a character for `slot`.
    pub fn begin_new_game(&mut self, slot: usize) -> SessionResult<()> {
        let slot = self.slot(slot)?;
        self.manager.begin_new_game(slot);
        Ok(())
    }

    /// Set an attribute during character creation.
    pub fn set_attribute(&mut self, name: &str, value: u32) -> SessionResult<u32> {
        self.manager.allocation_mut()?.set(name, value)
    }

    /// Move an attribute by `delta` during character creation.
    pub fn adjust_attribute(&mut self, name: &str, delta: i32) -> SessionResult<u32> {
        self.manager.allocation_mut()?.adjust(name, delta)
    }

    /// Abandon character creation.
    pub fn cancel_creation(&mut self) -> SessionResult<()> {
        self.manager.cancel_creation()
    }

    /// Whether confirmation is currently available.
    pub fn can_confirm(&self) -> bool {
        self.manager
            .allocation()
            .is_some_and(CharacterAllocation::is_complete)
    }

    /// Confirm the character and start playing.
    pub fn confirm_character(&mut self) -> SessionResult<()> {
        self.manager.confirm_character()
    }

    /// Restore the save in `slot`.
    pub fn load_game(&mut self, slot: usize) -> SessionResult<LoadOutcome> {
        let slot = self.slot(slot)?;
        self.manager.load_game(slot)
    }

    /// Clear `slot`.
    pub fn delete_save(&mut self, slot: usize) -> SessionResult<()> {
        let slot = self.slot(slot)?;
        self.manager.delete_save(slot);
        Ok(())
    }

    /// Take a choice by its index.
    pub fn choose(&mut self, index: usize) -> SessionResult<()> {
        self.manager.choose(index)
    }

    /// Discard the live session.
    pub fn return_to_menu(&mut self) -> SessionResult<()> {
        self.manager.return_to_menu()
    }

    /// The current mode.
    pub fn mode(&self) -> ModeKind {
        self.manager.mode().kind()
    }

    /// The slot being created or played.
    pub fn active_slot(&self) -> Option<SlotIndex> {
        match self.manager.mode() {
            Mode::Idle => None,
            Mode::CreatingCharacter { slot, .. } => Some(*slot),
            Mode::Active(session) => Some(session.slot()),
        }
    }

    /// Transcript lines; empty unless playing.
    pub fn transcript(&self) -> &[String] {
        self.manager
            .active()
            .map(|s| s.transcript().lines())
            .unwrap_or_default()
    }

    /// Choices on offer; empty unless playing.
    pub fn choices(&self) -> &[ChoiceView] {
        self.manager
            .active()
            .map(|s| s.choices())
            .unwrap_or_default()
    }

    /// Derived state; defaults unless playing.
    pub fn derived(&self) -> DerivedState {
        self.manager
            .active()
            .map(|s| s.derived().clone())
            .unwrap_or_default()
    }

    /// The allocation being edited.
    pub fn allocation(&self) -> Option<&CharacterAllocation> {
        self.manager.allocation()
    }

    /// Whether each slot holds a save.
    pub fn slot_presence(&self) -> &[bool] {
        self.manager.slot_presence()
    }

    /// The slot the menu points at.
    pub fn highlighted_slot(&self) -> SlotIndex {
        self.manager.highlighted_slot()
    }

    /// Whether the live story reached a terminal point.
    pub fn is_finished(&self) -> bool {
        self.manager.active().is_some_and(|s| s.is_finished())
    }

    /// Listing information for every slot.
    pub fn summaries(&self) -> Vec<SlotSummary> {
        self.manager.slots().summaries()
    }

    /// Drain diagnostic events.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        self.manager.take_events()
    }

    /// Snapshot of everything shown to the player.
    pub fn view(&self) -> SessionView {
        SessionView {
            mode: self.mode(),
            slot: self.active_slot(),
            transcript: self.transcript().to_vec(),
            choices: self.choices().to_vec(),
            derived: self.derived(),
            allocation: self.allocation().cloned(),
            slot_presence: self.slot_presence().to_vec(),
            highlighted_slot: self.highlighted_slot(),
            finished: self.is_finished(),
        }
    }

    fn slot(&self, index: usize) -> SessionResult<SlotIndex> {
        SlotIndex::new(index, self.manager.slots().slot_count())
            .ok_or(SessionError::SlotOutOfRange(index))
    }
}
