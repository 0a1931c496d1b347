//! Compiled-script data model and validation.
//!
//! A compiled script is a JSON document of named knots. Each knot holds a
//! list of content steps followed by the choices offered once the content
//! runs out:
//!
//! ```json
//! {
//!   "title": "The Cellar",
//!   "start": "cellar",
//!   "variables": { "coins": 0, "inv_old_sack": false },
//!   "knots": {
//!     "cellar": {
//!       "content": [ { "op": "text", "text": "You wake in a cellar." } ],
//!       "choices": [
//!         { "text": "Search", "then": [ { "op": "set", "var": "inv_old_sack", "value": true } ] }
//!       ]
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tale_core::VarValue;

use crate::condition::Condition;
use crate::error::{ScriptError, ScriptResult};

/// A single content step inside a knot or choice branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Emit a line of text, optionally guarded by a condition.
    Text {
        /// The line. `{name}` is replaced by the variable's value.
        text: String,
        /// Guard; the line is skipped when it evaluates false.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        when: Option<Condition>,
    },
    /// Assign a variable.
    Set {
        /// Variable name.
        var: String,
        /// New value.
        value: VarValue,
    },
    /// Add to a numeric variable.
    Add {
        /// Variable name.
        var: String,
        /// Amount to add (may be negative).
        amount: i64,
    },
    /// Jump to the start of another knot.
    Divert {
        /// Target knot name.
        to: String,
    },
    /// End the story.
    End,
}

/// A choice offered at the end of a knot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptChoice {
    /// Display text.
    pub text: String,
    /// Guard; the choice is hidden when it evaluates false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<Condition>,
    /// Steps run after the choice is taken. A branch that runs out without
    /// a divert ends the story.
    #[serde(default)]
    pub then: Vec<Step>,
}

/// A named section of the script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Knot {
    /// Content steps, run in order.
    #[serde(default)]
    pub content: Vec<Step>,
    /// Choices offered when the content runs out.
    #[serde(default)]
    pub choices: Vec<ScriptChoice>,
}

/// The raw compiled-script document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptData {
    /// Human-readable title.
    #[serde(default)]
    pub title: String,
    /// Name of the knot a fresh story starts in.
    pub start: String,
    /// Declared global variables and their initial values.
    #[serde(default)]
    pub variables: BTreeMap<String, VarValue>,
    /// Knots by name.
    pub knots: BTreeMap<String, Knot>,
}

/// A validated compiled script, cheap to clone and share between story
/// instances.
#[derive(Debug, Clone)]
pub struct CompiledScript {
    data: Arc<ScriptData>,
}

impl CompiledScript {
    /// Parse and validate a compiled-script JSON payload.
    pub fn from_json(json: &str) -> ScriptResult<Self> {
        let data: ScriptData = serde_json::from_str(json)?;
        Self::from_data(data)
    }

    /// Validate an already-parsed script document.
    pub fn from_data(data: ScriptData) -> ScriptResult<Self> {
        validate(&data)?;
        Ok(Self {
            data: Arc::new(data),
        })
    }

    /// The script title.
    pub fn title(&self) -> &str {
        &self.data.title
    }

    /// The start knot name.
    pub fn start(&self) -> &str {
        &self.data.start
    }

    /// Declared variables with their initial values.
    pub fn variables(&self) -> &BTreeMap<String, VarValue> {
        &self.data.variables
    }

    /// Look up a knot by name.
    pub fn knot(&self, name: &str) -> Option<&Knot> {
        self.data.knots.get(name)
    }

    /// Number of knots.
    pub fn knot_count(&self) -> usize {
        self.data.knots.len()
    }

    /// Whether a variable is declared.
    pub fn declares(&self, name: &str) -> bool {
        self.data.variables.contains_key(name)
    }
}

fn validate(data: &ScriptData) -> ScriptResult<()> {
    if !data.knots.contains_key(&data.start) {
        return Err(ScriptError::MissingStart(data.start.clone()));
    }

    for (name, knot) in &data.knots {
        validate_steps(data, name, &knot.content)?;
        for choice in &knot.choices {
            if let Some(cond) = &choice.when {
                validate_condition(data, name, cond)?;
            }
            validate_steps(data, name, &choice.then)?;
        }
    }

    Ok(())
}

fn validate_steps(data: &ScriptData, knot: &str, steps: &[Step]) -> ScriptResult<()> {
    for step in steps {
        match step {
            Step::Text { when, .. } => {
                if let Some(cond) = when {
                    validate_condition(data, knot, cond)?;
                }
            }
            Step::Set { var, .. } | Step::Add { var, .. } => {
                if !data.variables.contains_key(var) {
                    return Err(ScriptError::UndeclaredVariable {
                        knot: knot.to_string(),
                        var: var.clone(),
                    });
                }
            }
            Step::Divert { to } => {
                if !data.knots.contains_key(to) {
                    return Err(ScriptError::UnknownKnot {
                        from: knot.to_string(),
                        to: to.clone(),
                    });
                }
            }
            Step::End => {}
        }
    }
    Ok(())
}

fn validate_condition(data: &ScriptData, knot: &str, cond: &Condition) -> ScriptResult<()> {
    match cond
        .variables()
        .into_iter()
        .find(|var| !data.variables.contains_key(*var))
    {
        Some(var) => Err(ScriptError::UndeclaredVariable {
            knot: knot.to_string(),
            var: var.to_string(),
        }),
        None => Ok(()),
    }
}
