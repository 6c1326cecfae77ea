use crate::areas::repository::Repository;
use crate::artifacts::branch::DEFAULT_BRANCH;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::commit::Commit;
use crate::errors::RepositoryError;
use anyhow::Context;
use std::fs;
use std::io::Write;

pub const INITIAL_COMMIT_MESSAGE: &str = "initial commit";

impl Repository {
    pub async fn init(&mut self) -> anyhow::Result<()> {
        if self.is_initialized() {
            return Err(RepositoryError::state(
                "A twig version-control system already exists in the current directory.",
            )
            .into());
        }

        fs::create_dir_all(self.database().objects_path())
            .context("Failed to create .twig/objects directory")?;

        fs::create_dir_all(self.refs().heads_path())
            .context("Failed to create .twig/refs/heads directory")?;

        let root_oid = self
            .database()
            .store(&Commit::root(INITIAL_COMMIT_MESSAGE))
            .context("Failed to store the initial commit")?;

        let default_branch = BranchName::try_parse(DEFAULT_BRANCH)?;
        self.refs()
            .update_branch(&default_branch, &root_oid)
            .context("Failed to create the default branch")?;
        self.refs()
            .set_head(&default_branch)
            .context("Failed to create initial HEAD reference")?;

        let index = self.index();
        let mut index = index.lock().await;
        index.clear();
        index
            .write_updates()
            .context("Failed to create .twig/index file")?;

        writeln!(
            self.writer(),
            "Initialized empty twig repository in {}",
            self.path().display()
        )?;

        Ok(())
    }
}
