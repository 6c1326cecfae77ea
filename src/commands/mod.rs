//! Command implementations
//!
//! Only user-facing (porcelain) commands exist; the object and ref plumbing
//! they build on lives in `areas`.

pub mod porcelain;
