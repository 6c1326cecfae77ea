use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

impl Repository {
    /// History of the current branch, following first parents
    pub async fn log(&mut self) -> anyhow::Result<()> {
        let head_oid = self.head_oid()?;

        for (commit_oid, commit) in self.first_parent_history(&head_oid)? {
            self.show_commit(&commit_oid, &commit)?;
        }

        Ok(())
    }

    /// Every commit ever made, in object ID order
    pub async fn global_log(&mut self) -> anyhow::Result<()> {
        for commit_oid in self.all_commits()? {
            let commit = self.load_commit(&commit_oid)?;
            self.show_commit(&commit_oid, &commit)?;
        }

        Ok(())
    }

    pub fn show_commit(&self, commit_oid: &ObjectId, commit: &Commit) -> anyhow::Result<()> {
        let mut writer = self.writer();

        writeln!(writer, "===")?;
        writeln!(writer, "commit {}", commit_oid)?;
        if let [first, second] = commit.parents() {
            writeln!(
                writer,
                "Merge: {} {}",
                first.to_short_oid(),
                second.to_short_oid()
            )?;
        }
        writeln!(writer, "Date: {}", commit.readable_timestamp())?;
        writeln!(writer, "{}", commit.message())?;
        writeln!(writer)?;

        Ok(())
    }
}
