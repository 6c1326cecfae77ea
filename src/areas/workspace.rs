//! Working directory access
//!
//! All paths handed to the workspace are relative to the repository root and
//! have been through [`Workspace::normalize_path`]. The `.twig` directory is
//! never listed nor written to.

use crate::artifacts::checkout::migration::{Action, Migration};
use crate::artifacts::objects::blob::Blob;
use crate::errors::RepositoryError;
use anyhow::Context;
use bytes::Bytes;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Name of the repository metadata directory
pub const METADATA_DIR: &str = ".twig";

const IGNORED_PATHS: [&str; 1] = [METADATA_DIR];

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Turn a user supplied path into a repository relative one
    ///
    /// `.` components are dropped. Parent, root and prefix components, line
    /// breaks and paths inside the metadata directory are rejected.
    pub fn normalize_path(&self, raw_path: &str) -> anyhow::Result<PathBuf> {
        let invalid = || RepositoryError::validation(format!("Invalid path: {:?}", raw_path));

        if raw_path.contains(['\n', '\r', '\0']) {
            return Err(invalid().into());
        }

        let mut normalized = PathBuf::new();
        for component in Path::new(raw_path).components() {
            match component {
                Component::Normal(name) => normalized.push(name),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(invalid().into());
                }
            }
        }

        if normalized.as_os_str().is_empty() || Self::is_ignored(&normalized) {
            return Err(invalid().into());
        }

        Ok(normalized)
    }

    /// Every regular file in the working directory, sorted
    pub fn list_files(&self) -> anyhow::Result<Vec<PathBuf>> {
        let mut files = WalkDir::new(&self.path)
            .into_iter()
            .filter_entry(|entry| !Self::is_ignored_name(entry.file_name().to_string_lossy().as_ref()))
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(self.path.as_ref())
                    .ok()
                    .map(Path::to_path_buf)
            })
            .collect::<Vec<_>>();
        files.sort();

        Ok(files)
    }

    fn is_ignored(path: &Path) -> bool {
        path.components().any(|component| {
            if let Component::Normal(name) = component {
                Self::is_ignored_name(name.to_string_lossy().as_ref())
            } else {
                false
            }
        })
    }

    fn is_ignored_name(name: &str) -> bool {
        IGNORED_PATHS.contains(&name)
    }

    pub fn file_exists(&self, file_path: &Path) -> bool {
        self.path.join(file_path).is_file()
    }

    pub fn read_file(&self, file_path: &Path) -> anyhow::Result<Bytes> {
        let full_path = self.path.join(file_path);

        let content = std::fs::read(&full_path)
            .with_context(|| format!("Failed to read file: {:?}", file_path))?;

        Ok(content.into())
    }

    pub fn parse_blob(&self, file_path: &Path) -> anyhow::Result<Blob> {
        Ok(Blob::new(self.read_file(file_path)?))
    }

    /// Blob of the working file, or `None` if there is no such file
    pub fn try_parse_blob(&self, file_path: &Path) -> anyhow::Result<Option<Blob>> {
        if self.file_exists(file_path) {
            self.parse_blob(file_path).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Write a file, creating parent directories and replacing whatever was
    /// in the way
    pub fn write_file(&self, file_path: &Path, data: &[u8]) -> anyhow::Result<()> {
        let full_path = self.path.join(file_path);

        if let Some(parent) = full_path.parent() {
            self.make_directories(parent)?;
        }
        if full_path.is_dir() {
            std::fs::remove_dir_all(&full_path).with_context(|| {
                format!("Failed to remove existing directory: {:?}", file_path)
            })?;
        }

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&full_path)
            .with_context(|| format!("Failed to open file: {:?}", file_path))?;

        file.write_all(data)
            .with_context(|| format!("Failed to write to file: {:?}", file_path))?;

        Ok(())
    }

    /// Delete a file if it exists and prune the directories it leaves empty
    pub fn delete_file(&self, file_path: &Path) -> anyhow::Result<()> {
        let full_path = self.path.join(file_path);

        if full_path.is_file() {
            std::fs::remove_file(&full_path)
                .with_context(|| format!("Failed to remove file: {:?}", file_path))?;
        }

        self.prune_empty_parent_dirs(&full_path)
    }

    // Deletions go first so that a directory being replaced by a file (or the
    // other way around) is out of the way before anything is written.
    pub fn apply_migration(&self, migration: &Migration) -> anyhow::Result<()> {
        for (file_path, action) in migration.actions() {
            if let Action::Delete = action {
                self.delete_file(file_path)?;
            }
        }

        for (file_path, action) in migration.actions() {
            if let Action::Write(oid) = action {
                let blob = migration.load_blob(oid)?;
                self.write_file(file_path, blob.content())?;
            }
        }

        Ok(())
    }

    fn make_directories(&self, dir_path: &Path) -> anyhow::Result<()> {
        // a file sitting where a directory is needed gets replaced
        for ancestor in dir_path.ancestors().collect::<Vec<_>>().into_iter().rev() {
            if ancestor.starts_with(self.path.as_ref()) && ancestor.is_file() {
                std::fs::remove_file(ancestor)?;
            }
        }

        std::fs::create_dir_all(dir_path)
            .with_context(|| format!("Failed to create directory: {:?}", dir_path))
    }

    fn prune_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        let mut parent = path.parent();

        while let Some(dir) = parent {
            if dir == self.path.as_ref() || !dir.starts_with(self.path.as_ref()) || !dir.is_dir() {
                break;
            }
            if std::fs::read_dir(dir)?.next().is_some() {
                break;
            }
            std::fs::remove_dir(dir)?;
            parent = dir.parent();
        }

        Ok(())
    }
}
