//! Reference interpreter for Tale compiled story scripts.
//!
//! Loads a JSON compiled-script payload ([`CompiledScript`]), validates its
//! knot and variable references, and runs it through the
//! [`tale_core::Story`] continue/choice protocol ([`ScriptStory`]). State
//! serializes to JSON and restores deterministically.

/// Conditions guarding lines and choices.
pub mod condition;
/// Error types for script loading.
pub mod error;
/// Compiled-script data model and validation.
pub mod script;
/// Serializable interpreter state.
pub mod state;
/// The story interpreter.
pub mod story;

pub use condition::{Comparison, Condition};
pub use error::{ScriptError, ScriptResult};
pub use script::{CompiledScript, Knot, ScriptChoice, ScriptData, Step};
pub use state::{STATE_VERSION, StoryState};
pub use story::ScriptStory;

/// A small bundled story exercising attributes, coins, and inventory flags.
pub const DEMO_SCRIPT: &str = include_str!("../stories/cellar.json");
