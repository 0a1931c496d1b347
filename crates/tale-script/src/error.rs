//! Error types for compiled-script loading.

use thiserror::Error;

/// Result type for script loading.
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Errors found while loading or validating a compiled script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The payload is not valid compiled-script JSON.
    #[error("cannot parse script: {0}")]
    Parse(#[from] serde_json::Error),

    /// The start knot is not defined.
    #[error("start knot \"{0}\" is not defined")]
    MissingStart(String),

    /// A divert targets a knot that does not exist.
    #[error("knot \"{from}\" diverts to unknown knot \"{to}\"")]
    UnknownKnot {
        /// Knot containing the divert.
        from: String,
        /// Missing target.
        to: String,
    },

    /// A step or condition references an undeclared variable.
    #[error("knot \"{knot}\" uses undeclared variable \"{var}\"")]
    UndeclaredVariable {
        /// Knot containing the reference.
        knot: String,
        /// The undeclared variable name.
        var: String,
    },
}
