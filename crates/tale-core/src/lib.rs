//! Core types for Tale: interpreter variables, choices, save slots, and the
//! story capability trait.
//!
//! This crate defines the vocabulary shared between a story interpreter and
//! the session controller that drives it. It performs no I/O; any interpreter
//! that implements [`Story`] can be driven by `tale-session`.

/// Choices presented by an interpreter.
pub mod choice;
/// Error types for story interpreters.
pub mod error;
/// Save slot identifiers.
pub mod slot;
/// The story interpreter capability trait.
pub mod story;
/// Untyped interpreter variable values.
pub mod value;

/// Re-export the choice view type.
pub use choice::ChoiceView;
/// Re-export error types.
pub use error::{StoryError, StoryResult};
/// Re-export the slot index type.
pub use slot::SlotIndex;
/// Re-export the story trait.
pub use story::Story;
/// Re-export the variable value type.
pub use value::VarValue;
