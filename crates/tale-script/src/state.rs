//! Serializable interpreter state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tale_core::VarValue;

use crate::script::{CompiledScript, Step};

/// Current save-state format version.
pub const STATE_VERSION: u32 = 1;

/// Position of the next content step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Knot being executed.
    pub knot: String,
    /// Choice branch inside the knot, or `None` for the knot's own content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<usize>,
    /// Index of the next step.
    pub step: usize,
}

impl Cursor {
    /// A cursor at the start of a knot's content.
    pub fn knot_start(knot: impl Into<String>) -> Self {
        Self {
            knot: knot.into(),
            branch: None,
            step: 0,
        }
    }

    /// The step list this cursor walks, if the knot and branch exist.
    pub fn steps<'s>(&self, script: &'s CompiledScript) -> Option<&'s [Step]> {
        let knot = script.knot(&self.knot)?;
        match self.branch {
            None => Some(&knot.content),
            Some(i) => knot.choices.get(i).map(|c| c.then.as_slice()),
        }
    }
}

/// A choice that is currently on offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingChoice {
    /// Knot declaring the choice.
    pub knot: String,
    /// Index of the choice within the knot's declared choices.
    pub source: usize,
    /// Display text.
    pub text: String,
}

/// The complete interpreter state, as written by `save_state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoryState {
    /// Format version.
    pub version: u32,
    /// Next step, or `None` when waiting on a choice or ended.
    pub cursor: Option<Cursor>,
    /// Current variable values.
    pub variables: BTreeMap<String, VarValue>,
    /// Choices on offer.
    pub choices: Vec<PendingChoice>,
    /// Number of choices taken so far.
    pub turns: u32,
}

impl StoryState {
    /// The state of a fresh story.
    pub fn fresh(script: &CompiledScript) -> Self {
        Self {
            version: STATE_VERSION,
            cursor: Some(Cursor::knot_start(script.start())),
            variables: script.variables().clone(),
            choices: Vec::new(),
            turns: 0,
        }
    }

    /// Check that the state refers only to things the script defines.
    ///
    /// Variables the script declares but the state lacks are filled in with
    /// their initial values.
    pub fn reconcile(&mut self, script: &CompiledScript) -> Result<(), String> {
        if self.version != STATE_VERSION {
            return Err(format!(
                "unsupported state version {} (expected {STATE_VERSION})",
                self.version
            ));
        }

        if let Some(cursor) = &self.cursor {
            let steps = cursor
                .steps(script)
                .ok_or_else(|| format!("unknown position {}", cursor.knot))?;
            if cursor.step > steps.len() {
                return Err(format!("step {} past end of {}", cursor.step, cursor.knot));
            }
            if !self.choices.is_empty() {
                return Err("choices on offer while content is pending".to_string());
            }
        }

        for choice in &self.choices {
            let declared = script
                .knot(&choice.knot)
                .and_then(|k| k.choices.get(choice.source));
            if declared.is_none() {
                return Err(format!(
                    "unknown choice {} in {}",
                    choice.source, choice.knot
                ));
            }
        }

        if let Some(name) = self.variables.keys().find(|name| !script.declares(name)) {
            return Err(format!("undeclared variable {name}"));
        }
        for (name, initial) in script.variables() {
            self.variables
                .entry(name.clone())
                .or_insert_with(|| initial.clone());
        }

        Ok(())
    }
}
