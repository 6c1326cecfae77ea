//! Stateful parts of a repository
//!
//! - `database`: content-addressable store for blobs and commits
//! - `index`: staging area of pending additions and removals
//! - `refs`: branch pointers and HEAD
//! - `repository`: owns the other areas and hosts the commit graph queries
//! - `workspace`: working directory file system operations

pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
