//! Materializing snapshots into the working directory
//!
//! A [`Migration`](migration::Migration) plans every write and delete needed
//! to move the working directory from the current commit to a target state,
//! then checks that none of them would clobber an untracked file before
//! anything touches the disk.

pub mod conflict;
pub mod migration;
