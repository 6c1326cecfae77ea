//! Three-way merge
//!
//! - `split_point`: finds the common ancestor both branches are compared to
//! - `resolution`: classifies every path of the three snapshots and builds
//!   the content of conflicted files

pub mod resolution;
pub mod split_point;
