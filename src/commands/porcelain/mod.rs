//! Porcelain commands
//!
//! Every command is an async method on [`Repository`](crate::areas::repository::Repository)
//! and writes its user-facing output through the repository's writer.
//!
//! ## Commands
//!
//! - `init`: Create the repository with its root commit and `master` branch
//! - `add` / `rm`: Stage additions and removals
//! - `commit`: Record the staged snapshot
//! - `log` / `global-log` / `find`: Inspect history
//! - `status`: Show branches, staged, removed, modified and untracked files
//! - `checkout`: Restore files or switch branches
//! - `branch` / `rm-branch`: Create and delete branch pointers
//! - `reset`: Move the current branch to another commit
//! - `merge`: Three-way merge another branch into the current one

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod find;
pub mod init;
pub mod log;
pub mod merge;
pub mod reset;
pub mod rm;
pub mod status;
