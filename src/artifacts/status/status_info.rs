use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::commit::Snapshot;
use crate::artifacts::status::file_change::WorkspaceChangeType;
use derive_new::new;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

pub type ChangeSet = BTreeMap<PathBuf, WorkspaceChangeType>;
pub type FileSet = BTreeSet<PathBuf>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    pub branches: Vec<BranchName>,
    pub current_branch: BranchName,
    pub staged_files: FileSet,
    pub removed_files: FileSet,
    pub workspace_changeset: ChangeSet,
    pub untracked_files: FileSet,
}

#[derive(new)]
pub struct Status<'r> {
    repository: &'r Repository,
}

impl<'r> Status<'r> {
    pub fn initialize(&self, index: &Index) -> anyhow::Result<StatusInfo> {
        let head_snapshot = self.repository.head_commit()?.into_snapshot();
        let workspace_files = self
            .repository
            .workspace()
            .list_files()?
            .into_iter()
            .collect::<FileSet>();

        let mut workspace_changeset = ChangeSet::new();
        self.check_staged_additions(index, &mut workspace_changeset)?;
        self.check_head_snapshot(&head_snapshot, index, &mut workspace_changeset)?;

        let untracked_files = workspace_files
            .into_iter()
            .filter(|path| Self::is_untracked(path, &head_snapshot, index))
            .collect();

        Ok(StatusInfo {
            branches: self.repository.refs().list_branches()?,
            current_branch: self.repository.refs().current_branch()?,
            staged_files: index.additions().keys().cloned().collect(),
            removed_files: index.removals().clone(),
            workspace_changeset,
            untracked_files,
        })
    }

    // staged content that no longer matches the working copy
    fn check_staged_additions(
        &self,
        index: &Index,
        changeset: &mut ChangeSet,
    ) -> anyhow::Result<()> {
        for (path, staged_oid) in index.additions() {
            match self.repository.working_oid(path)? {
                None => {
                    changeset.insert(path.clone(), WorkspaceChangeType::Deleted);
                }
                Some(oid) if &oid != staged_oid => {
                    changeset.insert(path.clone(), WorkspaceChangeType::Modified);
                }
                Some(_) => {}
            }
        }

        Ok(())
    }

    // tracked files changed or deleted without being staged
    fn check_head_snapshot(
        &self,
        head_snapshot: &Snapshot,
        index: &Index,
        changeset: &mut ChangeSet,
    ) -> anyhow::Result<()> {
        for (path, head_oid) in head_snapshot {
            if index.is_staged_for_addition(path) || index.is_staged_for_removal(path) {
                continue;
            }

            match self.repository.working_oid(path)? {
                None => {
                    changeset.insert(path.clone(), WorkspaceChangeType::Deleted);
                }
                Some(oid) if &oid != head_oid => {
                    changeset.insert(path.clone(), WorkspaceChangeType::Modified);
                }
                Some(_) => {}
            }
        }

        Ok(())
    }

    fn is_untracked(path: &Path, head_snapshot: &Snapshot, index: &Index) -> bool {
        index.is_staged_for_removal(path)
            || (!index.is_staged_for_addition(path) && !head_snapshot.contains_key(path))
    }
}
