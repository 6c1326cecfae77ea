//! Branch references and HEAD
//!
//! Every branch is a file under `refs/heads/` holding the 40-character ID of
//! its tip commit. Branch names may contain `/`, in which case the file lives
//! in nested directories.
//!
//! `HEAD` always holds a symbolic reference `ref: refs/heads/<name>` to the
//! current branch. There is no detached state.

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use anyhow::Context;
use derive_new::new;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the repository metadata directory (`.twig`)
    path: Box<Path>,
}

impl Refs {
    /// The branch `HEAD` points to
    pub fn current_branch(&self) -> anyhow::Result<BranchName> {
        let head_path = self.head_path();
        let content = std::fs::read_to_string(&head_path)
            .with_context(|| format!("failed to read HEAD at {:?}", head_path))?;

        let symref_match = regex::Regex::new(SYMREF_REGEX)?
            .captures(content.trim())
            .with_context(|| format!("HEAD is not a symbolic reference: {:?}", content.trim()))?;

        BranchName::try_parse_ref_path(&symref_match[1])
    }

    pub fn is_current_branch(&self, branch_name: &BranchName) -> anyhow::Result<bool> {
        Ok(&self.current_branch()? == branch_name)
    }

    /// Point `HEAD` at another branch
    pub fn set_head(&self, branch_name: &BranchName) -> anyhow::Result<()> {
        self.update_ref_file(
            self.head_path(),
            format!("ref: {}", branch_name.to_ref_path()),
        )
    }

    /// Tip of the current branch
    pub fn read_head(&self) -> anyhow::Result<ObjectId> {
        let current_branch = self.current_branch()?;

        self.read_branch(&current_branch)?
            .with_context(|| format!("current branch {} has no commit", current_branch))
    }

    /// Move the current branch to a new commit
    pub fn update_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        self.update_branch(&self.current_branch()?, oid)
    }

    pub fn branch_exists(&self, branch_name: &BranchName) -> bool {
        self.branch_path(branch_name).is_file()
    }

    pub fn read_branch(&self, branch_name: &BranchName) -> anyhow::Result<Option<ObjectId>> {
        let branch_path = self.branch_path(branch_name);

        if !branch_path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&branch_path)
            .with_context(|| format!("failed to read ref file at {:?}", branch_path))?;

        Ok(Some(ObjectId::try_parse(content.trim().to_string())?))
    }

    pub fn update_branch(&self, branch_name: &BranchName, oid: &ObjectId) -> anyhow::Result<()> {
        self.update_ref_file(self.branch_path(branch_name), oid.to_string())
    }

    pub fn create_branch(&self, branch_name: &BranchName, source_oid: &ObjectId) -> anyhow::Result<()> {
        if self.branch_exists(branch_name) {
            return Err(
                RepositoryError::state("A branch with that name already exists.").into(),
            );
        }

        if let Some(clash) = self.clashing_ref(branch_name) {
            return Err(RepositoryError::state(format!(
                "Cannot create branch {}: it clashes with refs/heads/{}.",
                branch_name,
                clash.display()
            ))
            .into());
        }

        self.update_branch(branch_name, source_oid)
    }

    // a branch that is a parent directory of the new one, or nested under it
    fn clashing_ref(&self, branch_name: &BranchName) -> Option<PathBuf> {
        let heads_path = self.heads_path();
        let branch_path = self.branch_path(branch_name);

        if branch_path.is_dir() {
            return WalkDir::new(&branch_path)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .find(|entry| entry.file_type().is_file())
                .and_then(|entry| {
                    entry
                        .path()
                        .strip_prefix(&*heads_path)
                        .ok()
                        .map(Path::to_path_buf)
                });
        }

        branch_path
            .ancestors()
            .skip(1)
            .take_while(|ancestor| ancestor.starts_with(&*heads_path) && *ancestor != &*heads_path)
            .find(|ancestor| ancestor.is_file())
            .and_then(|ancestor| ancestor.strip_prefix(&*heads_path).ok())
            .map(Path::to_path_buf)
    }

    /// Remove a branch pointer, returning the commit it pointed to
    pub fn delete_branch(&self, branch_name: &BranchName) -> anyhow::Result<ObjectId> {
        let oid = self.read_branch(branch_name)?.ok_or_else(|| {
            RepositoryError::not_found("A branch with that name does not exist.")
        })?;

        let branch_path = self.branch_path(branch_name);
        std::fs::remove_file(&branch_path)
            .with_context(|| format!("failed to delete ref file at {:?}", branch_path))?;
        self.prune_branch_empty_parent_dirs(&branch_path)?;

        Ok(oid)
    }

    /// All branches, sorted by name
    pub fn list_branches(&self) -> anyhow::Result<Vec<BranchName>> {
        let heads_path = self.heads_path();

        if !heads_path.exists() {
            return Ok(Vec::new());
        }

        let mut branches = WalkDir::new(&heads_path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| {
                let relative = entry.path().strip_prefix(&*heads_path)?;
                let name = relative
                    .components()
                    .map(|component| component.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                BranchName::try_parse(name)
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        branches.sort();

        Ok(branches)
    }

    fn update_ref_file(&self, path: Box<Path>, raw_ref: String) -> anyhow::Result<()> {
        // create all the parent directories if they don't exist
        std::fs::create_dir_all(path.parent().with_context(|| {
            format!(
                "failed to create parent directories for ref file at {:?}",
                path
            )
        })?)?;

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("failed to open ref file at {:?}", path))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(raw_ref.as_bytes())?;

        Ok(())
    }

    fn prune_branch_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        let heads_path = self.heads_path();
        let mut parent = path.parent();

        while let Some(dir) = parent {
            if dir == &*heads_path || std::fs::read_dir(dir)?.next().is_some() {
                break;
            }
            std::fs::remove_dir(dir)?;
            parent = dir.parent();
        }

        Ok(())
    }

    fn branch_path(&self, branch_name: &BranchName) -> Box<Path> {
        self.heads_path().join(branch_name.to_path()).into_boxed_path()
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn refs_path(&self) -> Box<Path> {
        self.path.join("refs").into_boxed_path()
    }

    pub fn heads_path(&self) -> Box<Path> {
        self.refs_path().join("heads").into_boxed_path()
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
    fn refs_dir() -> TempDir {
        TempDir::new().expect("Failed to create temp dir")
    }

    fn oid(digit: char) -> ObjectId {
        ObjectId::try_parse(digit.to_string().repeat(40)).unwrap()
    }

    fn branch(name: &str) -> BranchName {
        BranchName::try_parse(name).unwrap()
    }

    fn init_refs(dir: &TempDir) -> anyhow::Result<Refs> {
        let refs = Refs::new(dir.path().to_path_buf().into_boxed_path());
        refs.update_branch(&branch("master"), &oid('a'))?;
        refs.set_head(&branch("master"))?;
        Ok(refs)
    }

    #[rstest]
    fn head_follows_the_current_branch(refs_dir: TempDir) -> anyhow::Result<()> {
        let refs = init_refs(&refs_dir)?;

        assert_eq!(refs.current_branch()?, branch("master"));
        assert_eq!(refs.read_head()?, oid('a'));

        refs.update_head(&oid('b'))?;
        assert_eq!(refs.read_branch(&branch("master"))?, Some(oid('b')));
        assert_eq!(
            std::fs::read_to_string(refs.head_path())?,
            "ref: refs/heads/master"
        );

        Ok(())
    }

    #[rstest]
    fn branches_are_listed_sorted_including_nested(refs_dir: TempDir) -> anyhow::Result<()> {
        let refs = init_refs(&refs_dir)?;
        refs.create_branch(&branch("feature/b"), &oid('b'))?;
        refs.create_branch(&branch("develop"), &oid('c'))?;

        assert_eq!(
            refs.list_branches()?,
            vec![branch("develop"), branch("feature/b"), branch("master")]
        );

        Ok(())
    }

    #[rstest]
    fn duplicate_branch_is_a_state_error(refs_dir: TempDir) -> anyhow::Result<()> {
        let refs = init_refs(&refs_dir)?;

        let error = refs.create_branch(&branch("master"), &oid('b')).unwrap_err();
        assert_eq!(ErrorKind::of(&error), Some(ErrorKind::State));
        assert_eq!(refs.read_head()?, oid('a'));

        Ok(())
    }

    #[rstest]
    #[case("topic", "topic/one", "topic")]
    #[case("topic/one", "topic", "topic/one")]
    fn nested_and_parent_branch_names_clash(
        refs_dir: TempDir,
        #[case] existing: &str,
        #[case] new: &str,
        #[case] reported: &str,
    ) -> anyhow::Result<()> {
        let refs = init_refs(&refs_dir)?;
        refs.create_branch(&branch(existing), &oid('b'))?;

        let error = refs.create_branch(&branch(new), &oid('c')).unwrap_err();
        assert_eq!(ErrorKind::of(&error), Some(ErrorKind::State));
        assert!(error.to_string().contains(&format!("refs/heads/{}", reported)));
        assert_eq!(refs.read_branch(&branch(existing))?, Some(oid('b')));

        Ok(())
    }

    #[rstest]
    fn deleting_prunes_empty_directories(refs_dir: TempDir) -> anyhow::Result<()> {
        let refs = init_refs(&refs_dir)?;
        refs.create_branch(&branch("feature/deep/b"), &oid('b'))?;

        assert_eq!(refs.delete_branch(&branch("feature/deep/b"))?, oid('b'));
        assert!(!refs.heads_path().join("feature").exists());
        assert!(refs.heads_path().exists());

        let error = refs.delete_branch(&branch("feature/deep/b")).unwrap_err();
        assert_eq!(ErrorKind::of(&error), Some(ErrorKind::NotFound));

        Ok(())
    }
}
