//! Conditions guarding lines and choices.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tale_core::VarValue;

/// A comparison operator for numeric conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
}

impl Comparison {
    fn holds(self, left: i64, right: i64) -> bool {
        match self {
            Comparison::Eq => left == right,
            Comparison::Ne => left != right,
            Comparison::Lt => left < right,
            Comparison::Lte => left <= right,
            Comparison::Gt => left > right,
            Comparison::Gte => left >= right,
        }
    }
}

/// A condition evaluated against the story's variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Always true.
    #[default]
    Always,
    /// True when the variable is truthy.
    Truthy(String),
    /// Compare a variable, read as a number, against a constant.
    Compare {
        /// Variable name.
        var: String,
        /// Comparison operator.
        op: Comparison,
        /// Right-hand constant.
        value: i64,
    },
    /// Logical NOT.
    Not(Box<Condition>),
    /// Logical AND.
    All(Vec<Condition>),
    /// Logical OR.
    Any(Vec<Condition>),
}

impl Condition {
    /// Evaluate the condition. Missing variables read as false / zero.
    pub fn evaluate(&self, variables: &BTreeMap<String, VarValue>) -> bool {
        match self {
            Condition::Always => true,
            Condition::Truthy(var) => variables.get(var).is_some_and(VarValue::is_truthy),
            Condition::Compare { var, op, value } => {
                let left = variables.get(var).map(numeric).unwrap_or(0);
                op.holds(left, *value)
            }
            Condition::Not(inner) => !inner.evaluate(variables),
            Condition::All(conditions) => conditions.iter().all(|c| c.evaluate(variables)),
            Condition::Any(conditions) => conditions.iter().any(|c| c.evaluate(variables)),
        }
    }

    /// Every variable name the condition reads.
    pub fn variables(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Condition::Always => {}
            Condition::Truthy(var) | Condition::Compare { var, .. } => out.push(var),
            Condition::Not(inner) => inner.collect_variables(out),
            Condition::All(conditions) | Condition::Any(conditions) => {
                for c in conditions {
                    c.collect_variables(out);
                }
            }
        }
    }
}

/// Read a variable as a number for comparisons and arithmetic.
pub(crate) fn numeric(value: &VarValue) -> i64 {
    match value {
        VarValue::Bool(b) => i64::from(*b),
        VarValue::Str(s) => s.trim().parse().unwrap_or(0),
        other => other.as_i64().unwrap_or(0),
    }
}
