//! Repository error taxonomy
//!
//! Engine operations return `anyhow::Result` like the rest of the crate. Failures
//! that are the user's business (bad arguments, missing commits or files, an
//! operation that is illegal in the current state) are raised as a
//! [`RepositoryError`] so the command layer can recover their [`ErrorKind`].
//! Everything else (I/O, corrupt objects) stays a plain `anyhow` error.
//!
//! Merge conflicts are not errors: they are reported per path in
//! [`MergeOutcome`](crate::commands::porcelain::merge::MergeOutcome) and the
//! merge still completes.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or empty arguments
    Validation,
    /// Missing commit, branch, file or object
    NotFound,
    /// Operation illegal in the current repository state
    State,
}

impl ErrorKind {
    /// Recover the kind of a repository error wrapped in an `anyhow::Error`
    pub fn of(error: &anyhow::Error) -> Option<ErrorKind> {
        error
            .downcast_ref::<RepositoryError>()
            .map(RepositoryError::kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    State(String),
}

impl RepositoryError {
    pub fn validation(message: impl Into<String>) -> Self {
        RepositoryError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        RepositoryError::NotFound(message.into())
    }

    pub fn state(message: impl Into<String>) -> Self {
        RepositoryError::State(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RepositoryError::Validation(_) => ErrorKind::Validation,
            RepositoryError::NotFound(_) => ErrorKind::NotFound,
            RepositoryError::State(_) => ErrorKind::State,
        }
    }
}
