//! Staged entries
//!
//! Additions carry the blob ID of the staged content, removals only a path.
//! Paths are stored with a 2-byte length prefix.

use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Longest path that fits the 2-byte length prefix
pub const MAX_PATH_SIZE: usize = u16::MAX as usize;

/// A path staged for addition with the blob it will point to
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct StagedAddition {
    pub path: PathBuf,
    pub oid: ObjectId,
}

/// A path staged for removal
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct StagedRemoval {
    pub path: PathBuf,
}

fn write_path(bytes: &mut Vec<u8>, path: &Path) -> anyhow::Result<()> {
    let path = path.to_string_lossy();
    if path.len() > MAX_PATH_SIZE {
        anyhow::bail!("Path too long for the index: {}", path);
    }

    bytes.write_u16::<NetworkEndian>(path.len() as u16)?;
    bytes.write_all(path.as_bytes())?;

    Ok(())
}

fn read_path(reader: &mut impl BufRead) -> anyhow::Result<PathBuf> {
    let size = reader
        .read_u16::<NetworkEndian>()
        .context("Unexpected end of index entry")?;
    let mut path = vec![0u8; size as usize];
    reader
        .read_exact(&mut path)
        .context("Unexpected end of index entry path")?;

    Ok(PathBuf::from(String::from_utf8(path)?))
}

impl Packable for StagedAddition {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut bytes = Vec::new();
        self.oid.write_h40_to(&mut bytes)?;
        write_path(&mut bytes, &self.path)?;

        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for StagedAddition {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let oid = ObjectId::read_h40_from(&mut reader)?;
        let path = read_path(&mut reader)?;

        Ok(StagedAddition::new(path, oid))
    }
}

impl Packable for StagedRemoval {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut bytes = Vec::new();
        write_path(&mut bytes, &self.path)?;

        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for StagedRemoval {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        Ok(StagedRemoval::new(read_path(&mut reader)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn addition_layout_is_oid_then_length_prefixed_path() -> anyhow::Result<()> {
        let oid = ObjectId::try_parse("ff".repeat(20))?;
        let entry = StagedAddition::new(PathBuf::from("a/b.txt"), oid);

        let bytes = entry.serialize()?;
        assert_eq!(bytes.len(), 20 + 2 + 7);
        assert_eq!(&bytes[..20], &[0xff; 20]);
        assert_eq!(&bytes[20..22], &[0, 7]);
        assert_eq!(&bytes[22..], b"a/b.txt");

        assert_eq!(StagedAddition::deserialize(Cursor::new(bytes))?, entry);

        Ok(())
    }

    #[test]
    fn truncated_removal_is_an_error() {
        let bytes = vec![0u8, 9, b'a'];

        assert!(StagedRemoval::deserialize(Cursor::new(bytes)).is_err());
    }
}
