//! Data structures and algorithms
//!
//! - `branch`: Branch name validation
//! - `checkout`: Checkout migrations and untracked file protection
//! - `core`: Shared utilities (pager wrapper)
//! - `index`: On-disk format of the staging area
//! - `merge`: Split point finding and three-way merge resolution
//! - `objects`: Blobs, commits and their IDs
//! - `status`: Working tree status inspection

pub mod branch;
pub mod checkout;
pub mod core;
pub mod index;
pub mod merge;
pub mod objects;
pub mod status;
