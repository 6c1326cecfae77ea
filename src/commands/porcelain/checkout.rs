use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;

impl Repository {
    /// Restore a file to its version in the head commit
    pub async fn checkout_file(&mut self, path: &str) -> anyhow::Result<()> {
        let head_oid = self.head_oid()?;
        self.restore_file(&head_oid, path)
    }

    /// Restore a file to its version in the given (possibly abbreviated) commit
    pub async fn checkout_commit_file(&mut self, revision: &str, path: &str) -> anyhow::Result<()> {
        let commit_oid = self.resolve_commit(revision)?;
        self.restore_file(&commit_oid, path)
    }

    /// Switch to another branch, replacing the working directory with its
    /// tip's snapshot
    pub async fn checkout_branch(&mut self, name: &str) -> anyhow::Result<()> {
        let no_such_branch = || RepositoryError::not_found("No such branch exists.");

        let branch_name = BranchName::try_parse(name).map_err(|_| no_such_branch())?;
        let target_oid = self
            .refs()
            .read_branch(&branch_name)?
            .ok_or_else(no_such_branch)?;

        if self.refs().is_current_branch(&branch_name)? {
            return Err(RepositoryError::state("No need to checkout the current branch.").into());
        }

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        self.migrate_to(&target_oid)?;
        self.refs().set_head(&branch_name)?;

        index.clear();
        index.write_updates()?;

        Ok(())
    }

    /// Materialize the snapshot of `target_oid` over the head commit's one
    pub(crate) fn migrate_to(&self, target_oid: &ObjectId) -> anyhow::Result<()> {
        let current = self.head_commit()?.into_snapshot();
        let target = self.load_commit(target_oid)?.into_snapshot();

        Migration::between(self, &current, &target)?.apply_changes()
    }

    fn restore_file(&self, commit_oid: &ObjectId, path: &str) -> anyhow::Result<()> {
        let path = self.workspace().normalize_path(path)?;
        let commit = self.load_commit(commit_oid)?;

        let blob_oid = commit.entry(&path).ok_or_else(|| {
            RepositoryError::not_found("File does not exist in that commit.")
        })?;
        let blob = self.database().load_blob(blob_oid)?;

        self.workspace().write_file(&path, blob.content())
    }
}
