//! Staging index file format
//!
//! The index stores the pending changes for the next commit.
//!
//! ## File Format (Version 1)
//!
//! ```text
//! Header (16 bytes):
//!   - Signature: "TIDX" (4 bytes)
//!   - Version: 1 (4 bytes)
//!   - Staged additions count (4 bytes)
//!   - Staged removals count (4 bytes)
//!
//! Additions (variable length):
//!   - Blob ID (20 bytes)
//!   - Path length (2 bytes) followed by the path
//!
//! Removals (variable length):
//!   - Path length (2 bytes) followed by the path
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```

pub mod checksum;
pub mod index_entry;
pub mod index_header;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of index header in bytes
pub const HEADER_SIZE: usize = 16;

/// Magic signature identifying index files
pub const SIGNATURE: &str = "TIDX";

/// Index file format version
pub const VERSION: u32 = 1;
