//! A small, local, single-user version control engine
//!
//! The crate is split the same way as the on-disk repository:
//!
//! - `areas`: the stateful parts of a repository (object database, refs,
//!   staging index, working directory) and the `Repository` that owns them
//! - `artifacts`: data structures and algorithms (objects, split point
//!   finding, three-way merge resolution, checkout migrations, status)
//! - `commands`: the porcelain operations exposed by the CLI
//! - `errors`: the error taxonomy surfaced to callers

/// Macro for debug logging that is enabled with the `debug_merge` feature flag
///
/// # Usage
/// ```rust,ignore
/// debug_log!("Processing commit {}", commit_id);
/// ```
macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "debug_merge")]
        {
            eprintln!($($arg)*);
        }
    };
}

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;
