//! Working directory status
//!
//! Compares three areas: the head commit's snapshot, the staging index and
//! the working directory.

pub mod file_change;
pub mod status_info;
