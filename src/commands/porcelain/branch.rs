use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::errors::RepositoryError;

impl Repository {
    /// Create a branch pointing at the head commit; HEAD does not move
    pub async fn branch(&mut self, name: &str) -> anyhow::Result<()> {
        let branch_name = BranchName::try_parse(name)?;
        let head_oid = self.head_oid()?;

        self.refs().create_branch(&branch_name, &head_oid)
    }

    /// Delete a branch pointer; its commits stay in the database
    pub async fn rm_branch(&mut self, name: &str) -> anyhow::Result<()> {
        let branch_name = BranchName::try_parse(name).map_err(|_| {
            RepositoryError::not_found("A branch with that name does not exist.")
        })?;

        if !self.refs().branch_exists(&branch_name) {
            return Err(
                RepositoryError::not_found("A branch with that name does not exist.").into(),
            );
        }
        if self.refs().is_current_branch(&branch_name)? {
            return Err(RepositoryError::state("Cannot remove the current branch.").into());
        }

        self.refs().delete_branch(&branch_name)?;

        Ok(())
    }
}
