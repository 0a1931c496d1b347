//! The session state machine: idle, creating a character, or playing.
//!
//! `SessionManager` owns the single live interpreter instance. Entering the
//! active mode always replaces whatever session existed before, so at most
//! one instance is alive at a time.

use serde::Serialize;
use tale_core::{ChoiceView, SlotIndex, Story, VarValue};
use tracing::{debug, info, warn};

use crate::advance::{self, AdvanceMode};
use crate::allocation::CharacterAllocation;
use crate::config::SessionConfig;
use crate::derived::DerivedState;
use crate::error::{SessionError, SessionResult};
use crate::event::SessionEvent;
use crate::slot::{SlotAdapter, SlotStore};
use crate::transcript::Transcript;

/// The live binding between one interpreter instance and a slot.
#[derive(Debug)]
pub struct ActiveSession<S> {
    slot: SlotIndex,
    story: S,
    transcript: Transcript,
    choices: Vec<ChoiceView>,
    derived: DerivedState,
}

impl<S: Story> ActiveSession<S> {
    /// The slot this session saves to.
    pub fn slot(&self) -> SlotIndex {
        self.slot
    }

    /// The interpreter instance.
    pub fn story(&self) -> &S {
        &self.story
    }

    /// Text shown since the session started or was reloaded.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The interpreter's current choices.
    pub fn choices(&self) -> &[ChoiceView] {
        &self.choices
    }

    /// Counters and inventory read after the last advancement.
    pub fn derived(&self) -> &DerivedState {
        &self.derived
    }

    /// Whether the story reached a terminal point.
    pub fn is_finished(&self) -> bool {
        self.choices.is_empty() && !self.story.can_continue()
    }

    fn sync_derived(&mut self, config: &SessionConfig) {
        self.derived = DerivedState::from_story(&self.story, config);
    }
}

/// The controller's current mode.
#[derive(Debug)]
pub enum Mode<S> {
    /// At the slot menu; no interpreter instance exists.
    Idle,
    /// Distributing attribute points for a new game in `slot`.
    CreatingCharacter {
        /// The slot the new game will save to.
        slot: SlotIndex,
        /// The allocation being edited.
        allocation: CharacterAllocation,
    },
    /// Playing a story.
    Active(ActiveSession<S>),
}

impl<S> Mode<S> {
    /// The mode without its payload.
    pub fn kind(&self) -> ModeKind {
        match self {
            Self::Idle => ModeKind::Idle,
            Self::CreatingCharacter { .. } => ModeKind::CreatingCharacter,
            Self::Active(_) => ModeKind::Active,
        }
    }
}

/// Payload-free mode tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    /// At the slot menu.
    Idle,
    /// Creating a character.
    CreatingCharacter,
    /// Playing a story.
    Active,
}

impl ModeKind {
    /// Human-readable description used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CreatingCharacter => "creating a character",
            Self::Active => "playing",
        }
    }
}

/// Result of [`SessionManager::load_game`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOutcome {
    /// The save was restored and the session is active.
    Loaded,
    /// The slot holds no save; nothing changed.
    Empty,
    /// The save could not be restored and was deleted; still idle.
    Corrupt,
}

/// Owns the mode, the slot adapter and the live session.
pub struct SessionManager<S: Story, St> {
    script: S::Script,
    config: SessionConfig,
    slots: SlotAdapter<St>,
    mode: Mode<S>,
    presence: Vec<bool>,
    highlighted: SlotIndex,
    events: Vec<SessionEvent>,
}

impl<S: Story, St: SlotStore> SessionManager<S, St> {
    /// Create an idle manager over a compiled script and a slot store.
    pub fn new(script: S::Script, store: St, config: SessionConfig) -> Self {
        let slots = SlotAdapter::new(store, &config);
        let presence = slots.presence();
        let highlighted = slots.last_active_slot();
        Self {
            script,
            config,
            slots,
            mode: Mode::Idle,
            presence,
            highlighted,
            events: Vec::new(),
        }
    }

    /// The configuration in use.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The compiled script new sessions are built from.
    pub fn script(&self) -> &S::Script {
        &self.script
    }

    /// The slot adapter.
    pub fn slots(&self) -> &SlotAdapter<St> {
        &self.slots
    }

    /// The current mode.
    pub fn mode(&self) -> &Mode<S> {
        &self.mode
    }

    /// The live session, if playing.
    pub fn active(&self) -> Option<&ActiveSession<S>> {
        match &self.mode {
            Mode::Active(session) => Some(session),
            _ => None,
        }
    }

    /// The allocation being edited, if creating a character.
    pub fn allocation(&self) -> Option<&CharacterAllocation> {
        match &self.mode {
            Mode::CreatingCharacter { allocation, .. } => Some(allocation),
            _ => None,
        }
    }

    /// The allocation being edited, mutably.
    pub fn allocation_mut(&mut self) -> SessionResult<&mut CharacterAllocation> {
        let mode = self.mode.kind();
        match &mut self.mode {
            Mode::CreatingCharacter { allocation, .. } => Ok(allocation),
            _ => Err(invalid("edit attributes", mode)),
        }
    }

    /// Cached save presence per slot, refreshed after every slot change.
    pub fn slot_presence(&self) -> &[bool] {
        &self.presence
    }

    /// The slot the menu points at: the last slot played or written.
    pub fn highlighted_slot(&self) -> SlotIndex {
        self.highlighted
    }

    /// Drain the diagnostic events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start creating a character for `slot`, discarding any live session
    /// and resetting the allocation to defaults.
    #[tracing::instrument(skip(self, slot), fields(slot = slot.number()))]
    pub fn begin_new_game(&mut self, slot: SlotIndex) {
        if matches!(self.mode, Mode::Active(_)) {
            debug!("Discarding live session");
        }
        self.mode = Mode::CreatingCharacter {
            slot,
            allocation: CharacterAllocation::new(&self.config),
        };
        self.highlighted = slot;
    }

    /// Abandon character creation and return to the menu.
    pub fn cancel_creation(&mut self) -> SessionResult<()> {
        match self.mode {
            Mode::CreatingCharacter { .. } => {
                self.mode = Mode::Idle;
                Ok(())
            }
            _ => Err(invalid("cancel creation", self.mode.kind())),
        }
    }

    /// Build a fresh interpreter seeded with the allocation and start
    /// playing.
    ///
    /// Attributes are assigned before the first continuation step.
    #[tracing::instrument(skip(self))]
    pub fn confirm_character(&mut self) -> SessionResult<()> {
        let Mode::CreatingCharacter { slot, allocation } = &self.mode else {
            return Err(invalid("confirm a character", self.mode.kind()));
        };
        allocation.validate()?;
        let slot = *slot;

        let mut story = S::from_script(&self.script)?;
        for (name, value) in allocation.iter() {
            story.set_variable(name, VarValue::from(value))?;
        }

        let mut transcript = Transcript::new();
        let choices = advance::advance(&mut story, &mut transcript, AdvanceMode::Replace)?;
        info!(
            slot = slot.number(),
            lines = transcript.len(),
            choices = choices.len(),
            "Started new game"
        );

        let derived = DerivedState::from_story(&story, &self.config);
        self.mode = Mode::Active(ActiveSession {
            slot,
            story,
            transcript,
            choices,
            derived,
        });
        self.persist();
        self.events.push(SessionEvent::Started { slot });
        self.refresh_presence();
        Ok(())
    }

    /// Restore the save in `slot` and start playing it.
    ///
    /// An empty slot changes nothing. A save that fails to restore is
    /// deleted and the manager stays idle. A restored save is written back
    /// immediately, which upgrades legacy blobs to the current envelope.
    #[tracing::instrument(skip(self, slot), fields(slot = slot.number()))]
    pub fn load_game(&mut self, slot: SlotIndex) -> SessionResult<LoadOutcome> {
        if !matches!(self.mode, Mode::Idle) {
            return Err(invalid("load a game", self.mode.kind()));
        }

        let Some(stored) = self.slots.read_save(slot) else {
            debug!("Slot is empty");
            self.refresh_presence();
            return Ok(LoadOutcome::Empty);
        };

        let mut story = S::from_script(&self.script)?;
        if let Err(e) = story.load_state(stored.state()) {
            warn!(error = %e, "Discarding corrupt save");
            self.slots.delete_save(slot);
            self.events.push(SessionEvent::CorruptSaveDiscarded {
                slot,
                reason: e.to_string(),
            });
            self.refresh_presence();
            return Ok(LoadOutcome::Corrupt);
        }

        let mut transcript = Transcript::new();
        let choices = advance::advance(&mut story, &mut transcript, AdvanceMode::Replace)?;
        info!(
            legacy = stored.is_legacy(),
            lines = transcript.len(),
            choices = choices.len(),
            "Loaded game"
        );

        let derived = DerivedState::from_story(&story, &self.config);
        self.mode = Mode::Active(ActiveSession {
            slot,
            story,
            transcript,
            choices,
            derived,
        });
        self.highlighted = slot;
        self.persist();
        self.events.push(SessionEvent::Loaded { slot });
        self.refresh_presence();
        Ok(LoadOutcome::Loaded)
    }

    /// Take the choice with `index`, append the resulting text, save, and
    /// refresh derived state.
    #[tracing::instrument(skip(self))]
    pub fn choose(&mut self, index: usize) -> SessionResult<()> {
        let mode = self.mode.kind();
        let Mode::Active(session) = &mut self.mode else {
            return Err(invalid("choose", mode));
        };

        let taken = advance::choose(
            &mut session.story,
            &mut session.transcript,
            &session.choices,
            index,
        );
        session.choices = match taken {
            Ok(choices) => choices,
            Err(e) => {
                // The story may already have moved past the choice point.
                session.choices = session.story.current_choices();
                return Err(e);
            }
        };
        debug!(
            lines = session.transcript.len(),
            choices = session.choices.len(),
            "Took choice"
        );

        self.persist();
        if let Mode::Active(session) = &mut self.mode {
            session.sync_derived(&self.config);
        }
        self.refresh_presence();
        Ok(())
    }

    /// Clear `slot`. Allowed in any mode; a live session keeps running and
    /// will write the slot again on its next save.
    #[tracing::instrument(skip(self, slot), fields(slot = slot.number()))]
    pub fn delete_save(&mut self, slot: SlotIndex) {
        self.slots.delete_save(slot);
        self.events.push(SessionEvent::Deleted { slot });
        self.refresh_presence();
    }

    /// Discard the live session and return to the menu.
    #[tracing::instrument(skip(self))]
    pub fn return_to_menu(&mut self) -> SessionResult<()> {
        if !matches!(self.mode, Mode::Active(_)) {
            return Err(invalid("return to the menu", self.mode.kind()));
        }
        self.mode = Mode::Idle;
        self.events.push(SessionEvent::ReturnedToMenu);
        self.refresh_presence();
        info!("Returned to menu");
        Ok(())
    }

    /// Write the live session to its slot. Failures are recorded and play
    /// continues in memory.
    fn persist(&mut self) {
        let Mode::Active(session) = &self.mode else {
            return;
        };
        let slot = session.slot;

        let result = match session.story.save_state() {
            Ok(state) => self
                .slots
                .write_save(slot, &state)
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match result {
            Ok(()) => self.highlighted = slot,
            Err(reason) => {
                warn!(slot = slot.number(), %reason, "Progress not saved");
                self.events.push(SessionEvent::SaveFailed { slot, reason });
            }
        }
    }

    fn refresh_presence(&mut self) {
        self.presence = self.slots.presence();
    }
}

fn invalid(operation: &'static str, mode: ModeKind) -> SessionError {
    SessionError::InvalidState {
        operation,
        mode: mode.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::MemoryStore;
    use tale_script::{CompiledScript, DEMO_SCRIPT, ScriptStory};

    type Manager = SessionManager<ScriptStory, MemoryStore>;

    fn manager() -> Manager {
        let script = CompiledScript::from_json(DEMO_SCRIPT).unwrap();
        SessionManager::new(script, MemoryStore::new(), SessionConfig::default())
    }

    fn slot(i: usize) -> SlotIndex {
        SlotIndex::new(i, 3).unwrap()
    }

    fn start(m: &mut Manager, s: usize, stats: [u32; 3]) {
        m.begin_new_game(slot(s));
        let alloc = m.allocation_mut().unwrap();
        for (name, value) in ["STR", "CHA", "WIT"].into_iter().zip(stats) {
            alloc.set(name, value).unwrap();
        }
        m.confirm_character().unwrap();
    }

    #[test]
    fn starts_idle() {
        let m = manager();
        assert_eq!(m.mode().kind(), ModeKind::Idle);
        assert_eq!(m.slot_presence(), [false, false, false]);
        assert_eq!(m.highlighted_slot(), SlotIndex::FIRST);
        assert!(m.active().is_none());
    }

    #[test]
    fn seeds_before_first_line() {
        let mut m = manager();
        start(&mut m, 0, [7, 4, 4]);

        let session = m.active().unwrap();
        assert!(
            session
                .transcript()
                .lines()
                .iter()
                .any(|l| l.contains("bend iron bars"))
        );
        assert_eq!(session.story().variable("STR"), Some(VarValue::Int(7)));
        assert_eq!(m.slot_presence(), [true, false, false]);
    }

    #[test]
    fn confirm_rejects_incomplete_allocation() {
        let mut m = manager();
        m.begin_new_game(slot(1));
        m.allocation_mut().unwrap().adjust("STR", -2).unwrap();

        let err = m.confirm_character().unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidAllocation { total: 13, pool: 15 }
        ));
        assert_eq!(m.mode().kind(), ModeKind::CreatingCharacter);
        assert!(!m.slots().has_save(slot(1)));
    }

    #[test]
    fn operations_check_mode() {
        let mut m = manager();
        assert!(matches!(
            m.choose(0),
            Err(SessionError::InvalidState { operation: "choose", mode: "idle" })
        ));
        assert!(m.confirm_character().is_err());
        assert!(m.return_to_menu().is_err());
        assert!(m.cancel_creation().is_err());
        assert!(m.allocation_mut().is_err());

        start(&mut m, 0, [5, 5, 5]);
        assert!(matches!(
            m.load_game(slot(0)),
            Err(SessionError::InvalidState { mode: "playing", .. })
        ));
    }

    #[test]
    fn cancel_discards_allocation() {
        let mut m = manager();
        m.begin_new_game(slot(2));
        m.allocation_mut().unwrap().set("WIT", 0).unwrap();
        m.cancel_creation().unwrap();

        assert_eq!(m.mode().kind(), ModeKind::Idle);
        m.begin_new_game(slot(2));
        assert_eq!(m.allocation().unwrap().get("WIT"), Some(5));
    }

    #[test]
    fn begin_replaces_live_session() {
        let mut m = manager();
        start(&mut m, 0, [5, 5, 5]);
        m.begin_new_game(slot(1));

        assert!(m.active().is_none());
        assert_eq!(m.highlighted_slot(), slot(1));
        assert!(m.slots().has_save(slot(0)));
    }

    #[test]
    fn events_are_drained() {
        let mut m = manager();
        start(&mut m, 1, [5, 5, 5]);
        m.return_to_menu().unwrap();
        m.delete_save(slot(1));

        assert_eq!(
            m.take_events(),
            vec![
                SessionEvent::Started { slot: slot(1) },
                SessionEvent::ReturnedToMenu,
                SessionEvent::Deleted { slot: slot(1) },
            ]
        );
        assert!(m.take_events().is_empty());
        assert_eq!(m.slot_presence(), [false, false, false]);
    }

    #[test]
    fn empty_slot_load_is_noop() {
        let mut m = manager();
        assert_eq!(m.load_game(slot(2)).unwrap(), LoadOutcome::Empty);
        assert_eq!(m.mode().kind(), ModeKind::Idle);
        assert!(m.take_events().is_empty());
    }
}
