/// Alias for `Result<T, StoryError>`.
pub type StoryResult<T> = Result<T, StoryError>;

/// Errors reported by a story interpreter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoryError {
    /// The variable is not declared by the script.
    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    /// The choice index is not in the current choice list.
    #[error("choice {index} out of range ({available} available)")]
    ChoiceOutOfRange {
        /// The rejected index.
        index: usize,
        /// Number of choices currently available.
        available: usize,
    },

    /// A continuation step was requested with no content pending.
    #[error("story cannot continue")]
    CannotContinue,

    /// A serialized state could not be restored.
    #[error("malformed story state: {0}")]
    MalformedState(String),

    /// The compiled script is unusable.
    #[error("invalid script: {0}")]
    InvalidScript(String),
}
