use crate::errors::RepositoryError;
use std::collections::BTreeSet;
use std::path::PathBuf;

pub const UNTRACKED_OVERWRITTEN_MESSAGE: &str =
    "There is an untracked file in the way; delete it, or add and commit it first.";

/// Untracked working files that a migration would overwrite
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UntrackedConflict {
    paths: BTreeSet<PathBuf>,
}

impl UntrackedConflict {
    pub fn insert(&mut self, path: PathBuf) {
        self.paths.insert(path);
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &BTreeSet<PathBuf> {
        &self.paths
    }

    /// Result of the check: `Ok` when nothing is in the way
    pub fn into_result(self) -> Result<(), RepositoryError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(RepositoryError::state(self.to_string()))
        }
    }
}

impl std::fmt::Display for UntrackedConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", UNTRACKED_OVERWRITTEN_MESSAGE)?;
        for path in &self.paths {
            write!(f, "\n    {}", path.display())?;
        }
        Ok(())
    }
}
