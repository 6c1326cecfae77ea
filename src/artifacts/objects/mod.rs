//! Stored object types
//!
//! Every object lives in the object database under its SHA-1 digest. There are two kinds:
//!
//! - **Blob**: the raw content of one file version
//! - **Commit**: a snapshot (path -> blob digest) plus message, timestamp and parents
//!
//! All objects share the framing `<type> <size>\0<content>`.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;
