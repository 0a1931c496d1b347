use serde::{Deserialize, Serialize};

/// One entry of an interpreter's current choice list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceView {
    /// The index the interpreter expects when this choice is taken.
    pub index: usize,
    /// Display text, exactly as the interpreter produced it.
    pub text: String,
}

impl ChoiceView {
    /// Create a new choice view.
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}
