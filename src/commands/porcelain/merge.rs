use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::merge::resolution::{MergeContext, Resolution, conflict_content};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use colored::Colorize;
use std::io::Write;
use std::path::PathBuf;

/// What a merge did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The given branch was already part of the current history
    AlreadyMerged,
    /// The current branch moved forward to the given tip
    FastForward(ObjectId),
    /// A merge commit was created; `conflicts` lists the files that got
    /// conflict markers
    Merged {
        oid: ObjectId,
        conflicts: Vec<PathBuf>,
    },
}

impl Repository {
    pub async fn merge(&mut self, name: &str) -> anyhow::Result<MergeOutcome> {
        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let no_such_branch =
            || RepositoryError::not_found("A branch with that name does not exist.");
        let given_branch = BranchName::try_parse(name).map_err(|_| no_such_branch())?;
        let given_oid = self
            .refs()
            .read_branch(&given_branch)?
            .ok_or_else(no_such_branch)?;

        if !index.is_empty() {
            return Err(RepositoryError::state("You have uncommitted changes.").into());
        }

        let current_branch = self.refs().current_branch()?;
        if current_branch == given_branch {
            return Err(RepositoryError::state("Cannot merge a branch with itself.").into());
        }

        let current_oid = self.head_oid()?;
        let split_oid = self.split_point(&current_oid, &given_oid)?;

        if split_oid == given_oid {
            writeln!(
                self.writer(),
                "Given branch is an ancestor of the current branch."
            )?;
            return Ok(MergeOutcome::AlreadyMerged);
        }

        if split_oid == current_oid {
            self.migrate_to(&given_oid)?;
            self.refs().update_head(&given_oid)?;

            index.clear();
            index.write_updates()?;

            writeln!(self.writer(), "Current branch fast-forwarded.")?;
            return Ok(MergeOutcome::FastForward(given_oid));
        }

        let context = MergeContext::new(
            self.load_commit(&split_oid)?.into_snapshot(),
            self.load_commit(&current_oid)?.into_snapshot(),
            self.load_commit(&given_oid)?.into_snapshot(),
        );

        let mut migration = Migration::new(self, context.current());
        let mut conflict_blobs = Vec::new();
        let mut conflicts = Vec::new();

        for (path, resolution) in context.resolutions() {
            match resolution {
                Resolution::KeepCurrent => {}
                Resolution::TakeGiven(oid) => {
                    migration.write(path.clone(), oid.clone());
                    index.stage_addition(path, oid);
                }
                Resolution::RemoveGiven => {
                    migration.delete(path.clone());
                    index.stage_removal(path);
                }
                Resolution::Conflict { current, given } => {
                    let blob = Blob::new(conflict_content(
                        self.blob_content(current.as_ref())?.as_deref(),
                        self.blob_content(given.as_ref())?.as_deref(),
                    ));
                    let oid = blob.object_id()?;

                    debug_log!("Conflict in {}: staged as {}", path.display(), oid);

                    migration.write(path.clone(), oid.clone());
                    index.stage_addition(path.clone(), oid);
                    conflict_blobs.push(blob);
                    conflicts.push(path);
                }
            }
        }

        // nothing is stored or written unless the working directory is safe
        migration.check_untracked()?;
        for blob in &conflict_blobs {
            self.database().store(blob)?;
        }
        self.workspace().apply_migration(&migration)?;

        let message = format!("Merged {} into {}.", given_branch, current_branch);
        let merge_oid = self.write_commit(&mut index, &message, vec![given_oid])?;

        if !conflicts.is_empty() {
            writeln!(self.writer(), "{}", "Encountered a merge conflict.".yellow())?;
        }

        Ok(MergeOutcome::Merged {
            oid: merge_oid,
            conflicts,
        })
    }

    fn blob_content(&self, oid: Option<&ObjectId>) -> anyhow::Result<Option<Vec<u8>>> {
        oid.map(|oid| {
            self.database()
                .load_blob(oid)
                .map(|blob| blob.content().to_vec())
        })
        .transpose()
    }
}
