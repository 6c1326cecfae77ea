use crate::areas::repository::Repository;

impl Repository {
    /// Move the current branch to an arbitrary commit and check it out
    pub async fn reset(&mut self, revision: &str) -> anyhow::Result<()> {
        let target_oid = self.resolve_commit(revision)?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        self.migrate_to(&target_oid)?;
        self.refs().update_head(&target_oid)?;

        index.clear();
        index.write_updates()?;

        Ok(())
    }
}
