use crate::areas::database::{CommitCache, Database};
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::{METADATA_DIR, Workspace};
use crate::artifacts::merge::split_point::SplitPointFinder;
use crate::artifacts::objects::commit::{Commit, MAX_PARENTS, Snapshot};
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::errors::RepositoryError;
use anyhow::Context;
use chrono::{DateTime, FixedOffset};
use std::cell::{RefCell, RefMut};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Overrides the timestamp of new commits
pub const COMMIT_DATE_ENV: &str = "TWIG_COMMIT_DATE";

const COMMIT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    index: Arc<Mutex<Index>>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
    commit_cache: CommitCache,
}

impl Repository {
    pub fn new(path: impl AsRef<Path>, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            std::fs::create_dir_all(path)?;
        }
        let path = path
            .canonicalize()
            .with_context(|| format!("Unable to resolve repository path {:?}", path))?;

        let metadata_path = path.join(METADATA_DIR);
        let index = Index::new(metadata_path.join("index").into_boxed_path());
        let database = Database::new(metadata_path.join("objects").into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());
        let refs = Refs::new(metadata_path.into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            index: Arc::new(Mutex::new(index)),
            database,
            workspace,
            refs,
            commit_cache: CommitCache::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&self) -> Arc<Mutex<Index>> {
        self.index.clone()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn is_initialized(&self) -> bool {
        self.refs.head_path().is_file()
    }

    pub fn ensure_initialized(&self) -> anyhow::Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(RepositoryError::state("Not in an initialized twig directory.").into())
        }
    }

    pub fn head_oid(&self) -> anyhow::Result<ObjectId> {
        self.refs.read_head()
    }

    pub fn head_commit(&self) -> anyhow::Result<Commit> {
        self.load_commit(&self.head_oid()?)
    }

    pub fn load_commit(&self, oid: &ObjectId) -> anyhow::Result<Commit> {
        self.database.load_commit(oid)
    }

    /// Build, store and return a new commit
    ///
    /// The timestamp is the current time unless `TWIG_COMMIT_DATE` is set.
    pub fn create_commit(
        &self,
        message: &str,
        snapshot: Snapshot,
        parents: Vec<ObjectId>,
    ) -> anyhow::Result<(ObjectId, Commit)> {
        if message.trim().is_empty() {
            return Err(RepositoryError::validation("Please enter a commit message.").into());
        }
        if parents.len() > MAX_PARENTS {
            return Err(RepositoryError::validation(format!(
                "A commit has at most {} parents, got {}.",
                MAX_PARENTS,
                parents.len()
            ))
            .into());
        }

        let commit = Commit::new(
            message.to_string(),
            Self::commit_timestamp()?,
            parents,
            snapshot,
        );
        let oid = self.database.store(&commit)?;

        Ok((oid, commit))
    }

    fn commit_timestamp() -> anyhow::Result<DateTime<FixedOffset>> {
        match std::env::var(COMMIT_DATE_ENV) {
            Ok(date) => DateTime::parse_from_rfc2822(&date)
                .or_else(|_| DateTime::parse_from_str(&date, COMMIT_DATE_FORMAT))
                .with_context(|| format!("Invalid {} value: {:?}", COMMIT_DATE_ENV, date)),
            Err(_) => Ok(chrono::Local::now().fixed_offset()),
        }
    }

    /// Commits reachable by following first parents from `oid`, newest first
    pub fn first_parent_history(&self, oid: &ObjectId) -> anyhow::Result<Vec<(ObjectId, Commit)>> {
        let mut history = Vec::new();
        let mut next = Some(oid.clone());

        while let Some(oid) = next {
            let commit = self.load_commit(&oid)?;
            next = commit.parent().cloned();
            history.push((oid, commit));
        }

        Ok(history)
    }

    /// Every stored commit, sorted by ID
    pub fn all_commits(&self) -> anyhow::Result<Vec<ObjectId>> {
        let mut commits = Vec::new();

        for oid in self.database.list_objects()? {
            if self.database.object_type(&oid)? == ObjectType::Commit {
                commits.push(oid);
            }
        }

        Ok(commits)
    }

    /// Resolve a full or abbreviated commit ID
    pub fn resolve_commit(&self, prefix: &str) -> anyhow::Result<ObjectId> {
        let prefix = prefix.trim().to_ascii_lowercase();

        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(
                RepositoryError::validation(format!("Invalid commit id: {:?}", prefix)).into(),
            );
        }
        if prefix.len() > OBJECT_ID_LENGTH {
            return Err(RepositoryError::not_found("No commit with that id exists.").into());
        }

        let mut candidates = Vec::new();
        for oid in self.database.find_objects_by_prefix(&prefix)? {
            if self.database.object_type(&oid)? == ObjectType::Commit {
                candidates.push(oid);
            }
        }

        match candidates.len() {
            0 => Err(RepositoryError::not_found("No commit with that id exists.").into()),
            1 => Ok(candidates.remove(0)),
            _ => Err(RepositoryError::validation(format!(
                "Commit id {} is ambiguous: {}",
                prefix,
                candidates
                    .iter()
                    .map(ObjectId::to_short_oid)
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
            .into()),
        }
    }

    /// Closest common ancestor of two commits
    pub fn split_point(&self, current: &ObjectId, given: &ObjectId) -> anyhow::Result<ObjectId> {
        let finder = SplitPointFinder::new(|oid| {
            self.commit_cache
                .get_or_load_slim_commit(&self.database, oid)
        });

        finder
            .find_split_point(current, given)?
            .with_context(|| format!("Commits {} and {} share no history", current, given))
    }

    /// Blob ID a snapshot entry would get for the working copy of `path`
    pub fn working_oid(&self, path: &Path) -> anyhow::Result<Option<ObjectId>> {
        self.workspace
            .try_parse_blob(path)?
            .map(|blob| blob.object_id())
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn repository_dir() -> TempDir {
        TempDir::new().expect("Failed to create temp dir")
    }

    fn repository(dir: &TempDir) -> anyhow::Result<Repository> {
        Repository::new(dir.path(), Box::new(std::io::sink()))
    }

    fn store_commit(
        repository: &Repository,
        message: &str,
        parents: Vec<ObjectId>,
    ) -> anyhow::Result<ObjectId> {
        let timestamp = Commit::root("initial commit").timestamp();
        repository
            .database()
            .store(&Commit::new(message.to_string(), timestamp, parents, Snapshot::new()))
    }

    #[rstest]
    fn uninitialized_repository_is_a_state_error(repository_dir: TempDir) -> anyhow::Result<()> {
        let repository = repository(&repository_dir)?;

        let error = repository.ensure_initialized().unwrap_err();
        assert_eq!(ErrorKind::of(&error), Some(ErrorKind::State));
        assert_eq!(error.to_string(), "Not in an initialized twig directory.");

        Ok(())
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn empty_commit_message_is_rejected(
        repository_dir: TempDir,
        #[case] message: &str,
    ) -> anyhow::Result<()> {
        let repository = repository(&repository_dir)?;

        let error = repository
            .create_commit(message, Snapshot::new(), Vec::new())
            .unwrap_err();
        assert_eq!(ErrorKind::of(&error), Some(ErrorKind::Validation));

        Ok(())
    }

    #[rstest]
    fn three_parents_are_rejected(repository_dir: TempDir) -> anyhow::Result<()> {
        let repository = repository(&repository_dir)?;
        let root = store_commit(&repository, "initial commit", Vec::new())?;

        let error = repository
            .create_commit("octopus", Snapshot::new(), vec![root.clone(), root.clone(), root])
            .unwrap_err();
        assert_eq!(ErrorKind::of(&error), Some(ErrorKind::Validation));

        Ok(())
    }

    #[rstest]
    fn first_parent_history_ends_at_the_root(repository_dir: TempDir) -> anyhow::Result<()> {
        let repository = repository(&repository_dir)?;
        let root = store_commit(&repository, "initial commit", Vec::new())?;
        let side = store_commit(&repository, "side", vec![root.clone()])?;
        let main = store_commit(&repository, "main", vec![root.clone()])?;
        let merge = store_commit(&repository, "merge", vec![main.clone(), side])?;

        let history = repository
            .first_parent_history(&merge)?
            .into_iter()
            .map(|(oid, _)| oid)
            .collect::<Vec<_>>();

        assert_eq!(history, vec![merge, main, root]);

        Ok(())
    }

    #[rstest]
    fn resolves_full_and_abbreviated_ids(repository_dir: TempDir) -> anyhow::Result<()> {
        let repository = repository(&repository_dir)?;
        let oid = store_commit(&repository, "initial commit", Vec::new())?;

        assert_eq!(repository.resolve_commit(oid.as_ref())?, oid);
        assert_eq!(repository.resolve_commit(&oid.to_short_oid())?, oid);
        assert_eq!(
            repository.resolve_commit(&oid.to_short_oid().to_uppercase())?,
            oid
        );

        Ok(())
    }

    #[rstest]
    fn resolve_rejects_bad_and_unknown_ids(repository_dir: TempDir) -> anyhow::Result<()> {
        let repository = repository(&repository_dir)?;
        let blob = repository
            .database()
            .store(&crate::artifacts::objects::blob::Blob::from("not a commit"))?;

        let kind = |prefix: &str| ErrorKind::of(&repository.resolve_commit(prefix).unwrap_err());

        assert_eq!(kind("xyz"), Some(ErrorKind::Validation));
        assert_eq!(kind(""), Some(ErrorKind::Validation));
        assert_eq!(kind(&"0".repeat(40)), Some(ErrorKind::NotFound));
        assert_eq!(kind(blob.as_ref()), Some(ErrorKind::NotFound));

        Ok(())
    }

    #[rstest]
    fn ambiguous_prefix_is_a_validation_error(repository_dir: TempDir) -> anyhow::Result<()> {
        let repository = repository(&repository_dir)?;
        let oids = (0..40)
            .map(|n| store_commit(&repository, &format!("commit {}", n), Vec::new()))
            .collect::<anyhow::Result<Vec<_>>>()?;

        // with 40 commits, at least two share their first hex digit
        let shared = oids
            .iter()
            .map(|oid| &oid.as_ref()[..1])
            .find(|first| oids.iter().filter(|oid| oid.starts_with(first)).count() > 1)
            .expect("pigeonhole");

        let error = repository.resolve_commit(shared).unwrap_err();
        assert_eq!(ErrorKind::of(&error), Some(ErrorKind::Validation));

        Ok(())
    }

    #[rstest]
    fn all_commits_skips_blobs(repository_dir: TempDir) -> anyhow::Result<()> {
        let repository = repository(&repository_dir)?;
        let first = store_commit(&repository, "one", Vec::new())?;
        let second = store_commit(&repository, "two", Vec::new())?;
        repository
            .database()
            .store(&crate::artifacts::objects::blob::Blob::from("blob"))?;

        let mut expected = vec![first, second];
        expected.sort();
        assert_eq!(repository.all_commits()?, expected);

        Ok(())
    }

    #[rstest]
    fn split_point_follows_merge_parents(repository_dir: TempDir) -> anyhow::Result<()> {
        let repository = repository(&repository_dir)?;
        let root = store_commit(&repository, "initial commit", Vec::new())?;
        let main = store_commit(&repository, "main", vec![root.clone()])?;
        let side = store_commit(&repository, "side", vec![root.clone()])?;
        let merge = store_commit(&repository, "merge", vec![main, side.clone()])?;
        let side_next = store_commit(&repository, "side next", vec![side.clone()])?;

        assert_eq!(repository.split_point(&merge, &side_next)?, side);

        Ok(())
    }
}
