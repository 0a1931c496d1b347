use crate::choice::ChoiceView;
use crate::error::StoryResult;
use crate::value::VarValue;

/// A narrative-script interpreter instance.
///
/// The session controller treats implementations as a black box driven
/// through a continue/choice cycle: call [`Story::continue_step`] while
/// [`Story::can_continue`] holds, then present [`Story::current_choices`]
/// and feed the player's pick back through [`Story::choose`].
pub trait Story: Sized {
    /// The compiled script an instance is constructed from.
    type Script;

    /// Construct a fresh instance positioned at the start of the script.
    fn from_script(script: &Self::Script) -> StoryResult<Self>;

    /// Read a named variable.
    fn variable(&self, name: &str) -> Option<VarValue>;

    /// Assign a named variable.
    fn set_variable(&mut self, name: &str, value: VarValue) -> StoryResult<()>;

    /// Whether more content is pending before the next choice point.
    fn can_continue(&self) -> bool;

    /// Advance one content step and return its text, trimmed.
    ///
    /// The text may be empty when the step only ran logic.
    fn continue_step(&mut self) -> StoryResult<String>;

    /// The current ordered choice list. Empty while content is pending or
    /// once the story has ended.
    fn current_choices(&self) -> Vec<ChoiceView>;

    /// Take the choice with the given index.
    fn choose(&mut self, index: usize) -> StoryResult<()>;

    /// Serialize the full interpreter state to an opaque string.
    fn save_state(&self) -> StoryResult<String>;

    /// Restore the full interpreter state from [`Story::save_state`] output.
    ///
    /// Must fail with an error, leaving no partially restored state that a
    /// caller would keep using, when the input is malformed.
    fn load_state(&mut self, state: &str) -> StoryResult<()>;
}
