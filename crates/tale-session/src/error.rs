//! Error types for the session controller.

use tale_core::StoryError;
use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors returned by session operations.
///
/// A corrupt save is deliberately not an error: loading it reports
/// [`crate::LoadOutcome::Corrupt`] and leaves the controller idle.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The operation is not valid in the current mode.
    #[error("cannot {operation} while {mode}")]
    InvalidState {
        /// The rejected operation.
        operation: &'static str,
        /// The mode the controller was in.
        mode: &'static str,
    },

    /// Attribute points do not add up to the pool.
    #[error("allocation totals {total}, expected exactly {pool}")]
    InvalidAllocation {
        /// Points allocated.
        total: u32,
        /// Points required.
        pool: u32,
    },

    /// The attribute is not part of the configured set.
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    /// The slot index is not below the configured slot count.
    #[error("slot {0} out of range")]
    SlotOutOfRange(usize),

    /// The choice index is not among the available choices.
    #[error("invalid choice: {0}")]
    InvalidChoice(usize),

    /// The story interpreter failed.
    #[error("story error: {0}")]
    Story(#[from] StoryError),
}

/// Errors raised by a slot store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend refused the operation (quota, disabled storage).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
