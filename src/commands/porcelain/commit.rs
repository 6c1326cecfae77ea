use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use std::io::Write;

impl Repository {
    pub async fn commit(&mut self, message: &str) -> anyhow::Result<ObjectId> {
        let index = self.index();
        let mut index = index.lock().await;

        // Load the index file from the disk
        index.rehydrate()?;

        let commit_oid = self.write_commit(&mut index, message, Vec::new())?;

        writeln!(
            self.writer(),
            "[{} {}] {}",
            self.refs().current_branch()?,
            commit_oid.to_short_oid(),
            message
        )?;

        Ok(commit_oid)
    }

    /// Commit the staged changes on top of HEAD and advance the current branch
    ///
    /// Prints nothing; `commit` reports the new commit itself.
    ///
    /// `extra_parents` follow HEAD in the parent list; a merge passes the tip
    /// it merged in. Without extra parents the staging area must not be empty.
    pub(crate) fn write_commit(
        &self,
        index: &mut Index,
        message: &str,
        extra_parents: Vec<ObjectId>,
    ) -> anyhow::Result<ObjectId> {
        if message.trim().is_empty() {
            return Err(RepositoryError::validation("Please enter a commit message.").into());
        }
        if index.is_empty() && extra_parents.is_empty() {
            return Err(RepositoryError::state("No changes added to the commit.").into());
        }

        let head_oid = self.head_oid()?;
        let head = self.load_commit(&head_oid)?;

        let snapshot = index.apply_to(head.snapshot());
        let parents = std::iter::once(head_oid).chain(extra_parents).collect();

        let (commit_oid, _) = self.create_commit(message, snapshot, parents)?;
        self.refs().update_head(&commit_oid)?;

        index.clear();
        index.write_updates()?;

        Ok(commit_oid)
    }
}
