//! Checkout migration
//!
//! A migration is planned in full before it is applied:
//!
//! 1. Record every path to write (with the blob it should contain) and every
//!    path to delete
//! 2. Check the planned writes against the working directory: a file that the
//!    current commit does not track must not be overwritten with different
//!    content, nor be replaced by (or sit in the way of) a directory
//! 3. Apply deletions, then writes
//!
//! Nothing is written if step 2 finds a conflict.

use crate::areas::repository::Repository;
use crate::artifacts::checkout::conflict::UntrackedConflict;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Snapshot;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;
use std::path::{Path, PathBuf};

/// File system action planned for a single path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Make the file contain the given blob
    Write(ObjectId),
    /// Remove the file
    Delete,
}

pub struct Migration<'r> {
    repository: &'r Repository,
    /// Snapshot of the commit the working directory currently reflects
    tracked: &'r Snapshot,
    actions: BTreeMap<PathBuf, Action>,
}

impl<'r> Migration<'r> {
    pub fn new(repository: &'r Repository, tracked: &'r Snapshot) -> Self {
        Self {
            repository,
            tracked,
            actions: BTreeMap::new(),
        }
    }

    /// Plan the move from the `current` snapshot to `target`
    ///
    /// Tracked files missing from the target are deleted; every target file
    /// whose working copy differs (or is missing) is written.
    pub fn between(
        repository: &'r Repository,
        current: &'r Snapshot,
        target: &Snapshot,
    ) -> anyhow::Result<Self> {
        let mut migration = Self::new(repository, current);

        for path in current.keys() {
            if !target.contains_key(path) {
                migration.delete(path.clone());
            }
        }

        for (path, oid) in target {
            if migration.working_oid(path)?.as_ref() != Some(oid) {
                migration.write(path.clone(), oid.clone());
            }
        }

        Ok(migration)
    }

    pub fn write(&mut self, path: PathBuf, oid: ObjectId) {
        self.actions.insert(path, Action::Write(oid));
    }

    pub fn delete(&mut self, path: PathBuf) {
        self.actions.insert(path, Action::Delete);
    }

    pub fn actions(&self) -> &BTreeMap<PathBuf, Action> {
        &self.actions
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Fail with a `State` error naming every untracked file in the way
    pub fn check_untracked(&self) -> anyhow::Result<()> {
        let untracked = self
            .repository
            .workspace()
            .list_files()?
            .into_iter()
            .filter(|path| !self.tracked.contains_key(path))
            .collect::<BTreeSet<_>>();

        let mut conflict = UntrackedConflict::default();

        for (path, action) in &self.actions {
            let Action::Write(oid) = action else {
                continue;
            };

            if untracked.contains(path) && self.working_oid(path)?.as_ref() != Some(oid) {
                conflict.insert(path.clone());
            }

            // an untracked file where a directory has to go
            for ancestor in path.ancestors().skip(1) {
                if untracked.contains(ancestor) {
                    conflict.insert(ancestor.to_path_buf());
                }
            }

            // untracked files inside a directory that has to become a file
            let under_path = (Bound::Included(path.as_path()), Bound::Unbounded);
            for untracked_path in untracked.range::<Path, _>(under_path) {
                if !untracked_path.starts_with(path) {
                    break;
                }
                if untracked_path != path {
                    conflict.insert(untracked_path.clone());
                }
            }
        }

        Ok(conflict.into_result()?)
    }

    /// Check for untracked conflicts, then update the working directory
    pub fn apply_changes(&self) -> anyhow::Result<()> {
        self.check_untracked()?;
        self.repository.workspace().apply_migration(self)
    }

    pub fn load_blob(&self, oid: &ObjectId) -> anyhow::Result<Blob> {
        self.repository.database().load_blob(oid)
    }

    fn working_oid(&self, path: &Path) -> anyhow::Result<Option<ObjectId>> {
        self.repository.working_oid(path)
    }
}
