use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use std::io::Write;

impl Repository {
    /// IDs of all commits with exactly the given message
    pub async fn find(&mut self, message: &str) -> anyhow::Result<Vec<ObjectId>> {
        let mut found = Vec::new();

        for commit_oid in self.all_commits()? {
            if self.load_commit(&commit_oid)?.message() == message {
                found.push(commit_oid);
            }
        }

        if found.is_empty() {
            return Err(RepositoryError::not_found("Found no commit with that message.").into());
        }

        for commit_oid in &found {
            writeln!(self.writer(), "{}", commit_oid)?;
        }

        Ok(found)
    }
}
