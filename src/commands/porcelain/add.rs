use crate::areas::repository::Repository;
use crate::artifacts::objects::object::Object;
use crate::errors::RepositoryError;

impl Repository {
    /// Stage the working copy of a file
    ///
    /// A file identical to the head commit's version is unstaged instead, which
    /// also cancels a pending removal.
    pub async fn add(&mut self, path: &str) -> anyhow::Result<()> {
        let path = self.workspace().normalize_path(path)?;

        if !self.workspace().file_exists(&path) {
            return Err(RepositoryError::not_found("File does not exist.").into());
        }

        let index = self.index();
        let mut index = index.lock().await;

        // Load the index file from the disk
        index.rehydrate()?;

        let blob = self.workspace().parse_blob(&path)?;
        let blob_id = blob.object_id()?;
        let head = self.head_commit()?;

        if head.entry(&path) == Some(&blob_id) {
            index.unstage(&path);
        } else {
            self.database().store(&blob)?;
            index.stage_addition(path, blob_id);
        }

        if index.is_changed() {
            index.write_updates()?;
        }

        Ok(())
    }
}
