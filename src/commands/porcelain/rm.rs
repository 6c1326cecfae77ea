use crate::areas::repository::Repository;
use crate::errors::RepositoryError;

impl Repository {
    /// Unstage a file, or stage the removal of a tracked one and delete its
    /// working copy
    pub async fn rm(&mut self, path: &str) -> anyhow::Result<()> {
        let path = self.workspace().normalize_path(path)?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        if index.is_staged_for_addition(&path) {
            index.unstage(&path);
        } else if self.head_commit()?.tracks(&path) {
            self.workspace().delete_file(&path)?;
            index.stage_removal(path);
        } else {
            return Err(RepositoryError::state("No reason to remove the file.").into());
        }

        index.write_updates()?;

        Ok(())
    }
}
