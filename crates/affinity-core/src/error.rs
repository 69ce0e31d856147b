//! Error vocabulary shared by every Affinity crate.

use thiserror::Error;

/// Semantic failures raised by the in-memory structures.
///
/// There is no I/O in this crate, so every variant describes a broken
/// precondition rather than a transient fault.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// An operation referenced an identity that is not present.
    #[error("not found: {0}")]
    NotFound(String),

    /// A low-level insert collided with an existing identity.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// A weight or structural invariant would be broken.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// `pop`/`peek` on an empty queue or result.
    #[error("collection is empty")]
    EmptyCollection,

    /// A traversal observed its cancellation token.
    #[error("operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;
