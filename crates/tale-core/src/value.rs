use std::fmt;

use serde::{Deserialize, Serialize};

/// A value stored in an interpreter's untyped variable storage.
///
/// Serialized untagged, so compiled scripts and save states carry plain JSON
/// scalars (`0`, `2.5`, `true`, `"text"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VarValue {
    /// A 64-bit signed integer value.
    Int(i64),
    /// A 64-bit floating-point value.
    Float(f64),
    /// A boolean value.
    Bool(bool),
    /// A text value.
    Str(String),
}

impl VarValue {
    /// Whether the value counts as "set" when used as a flag.
    ///
    /// Non-zero numbers, `true`, and non-empty strings are truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Int(n) => *n != 0,
            Self::Float(n) => *n != 0.0 && !n.is_nan(),
            Self::Bool(b) => *b,
            Self::Str(s) => !s.is_empty(),
        }
    }

    /// The value as an integer, if it is numeric. Floats are truncated.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Float(n) if n.is_finite() => Some(n.trunc() as i64),
            _ => None,
        }
    }

    /// A short name of the value's type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Str(_) => "string",
        }
    }
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for VarValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<u32> for VarValue {
    fn from(n: u32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<bool> for VarValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for VarValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for VarValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}
