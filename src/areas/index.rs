//! Staging area (index)
//!
//! The index holds the changes that the next commit will apply on top of the
//! current commit's snapshot:
//!
//! - `additions`: paths mapped to the blob ID of their staged content
//! - `removals`: tracked paths that the next commit drops
//!
//! A path is never staged both ways at once: staging it one way unstages the other.
//! The index is persisted to disk (see `artifacts::index`) and checksummed.

use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::{StagedAddition, StagedRemoval};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::commit::Snapshot;
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::anyhow;
use byteorder::{ByteOrder, NetworkEndian};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Cursor;
use std::ops::DerefMut;
use std::path::{Path, PathBuf};

/// Size of the raw blob ID stored with each addition
const OID_SIZE: usize = 20;

/// Size of the path length prefix
const PATH_LENGTH_SIZE: usize = 2;

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.twig/index`)
    path: Box<Path>,
    /// Paths staged for addition mapped to their blob IDs
    additions: BTreeMap<PathBuf, ObjectId>,
    /// Paths staged for removal
    removals: BTreeSet<PathBuf>,
    /// Flag indicating if the index has been modified since loading
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            additions: BTreeMap::new(),
            removals: BTreeSet::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the index from disk
    ///
    /// Reads the header, the staged additions and removals, and verifies the
    /// checksum. A missing or empty index file is an empty staging area.
    ///
    /// # Locking
    ///
    /// Acquires a shared lock on the index file during reading.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.additions.clear();
        self.removals.clear();
        self.changed = false;

        if !self.path().exists() {
            std::fs::File::create(self.path())?;
        }

        let mut index_file = std::fs::OpenOptions::new().read(true).open(self.path())?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)?;

        // if the index file is empty, return early
        if lock.deref_mut().metadata()?.len() == 0 {
            return Ok(());
        }

        let mut reader = Checksum::new(lock);
        let header = self.parse_header(&mut reader)?;
        self.parse_additions(header.additions_count, &mut reader)?;
        self.parse_removals(header.removals_count, &mut reader)?;

        reader.verify()
    }

    fn parse_header(&self, reader: &mut Checksum) -> anyhow::Result<IndexHeader> {
        let header_bytes = reader.read(HEADER_SIZE)?;
        let header = IndexHeader::deserialize(Cursor::new(header_bytes))?;

        if header.marker != SIGNATURE {
            return Err(anyhow!("Invalid index file signature"));
        }

        if header.version != VERSION {
            return Err(anyhow!(
                "Unsupported index file version: {}",
                header.version
            ));
        }

        Ok(header)
    }

    fn parse_additions(&mut self, count: u32, reader: &mut Checksum) -> anyhow::Result<()> {
        for _ in 0..count {
            let prefix = reader.read(OID_SIZE + PATH_LENGTH_SIZE)?;
            let path_size = NetworkEndian::read_u16(&prefix[OID_SIZE..]) as usize;
            let path = reader.read(path_size)?;

            let entry_bytes = [prefix.as_ref(), path.as_ref()].concat();
            let entry = StagedAddition::deserialize(Cursor::new(entry_bytes))?;

            self.additions.insert(entry.path, entry.oid);
        }

        Ok(())
    }

    fn parse_removals(&mut self, count: u32, reader: &mut Checksum) -> anyhow::Result<()> {
        for _ in 0..count {
            let prefix = reader.read(PATH_LENGTH_SIZE)?;
            let path_size = NetworkEndian::read_u16(&prefix) as usize;
            let path = reader.read(path_size)?;

            let entry_bytes = [prefix.as_ref(), path.as_ref()].concat();
            let entry = StagedRemoval::deserialize(Cursor::new(entry_bytes))?;

            self.removals.insert(entry.path);
        }

        Ok(())
    }

    /// Persist the staging area
    ///
    /// # Locking
    ///
    /// Acquires an exclusive lock on the index file during writing.
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        let mut index_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.path())?;
        let lock = file_guard::lock(&mut index_file, file_guard::Lock::Exclusive, 0, 1)?;

        let mut writer = Checksum::new(lock);

        let header = IndexHeader::new(
            String::from(SIGNATURE),
            VERSION,
            self.additions.len() as u32,
            self.removals.len() as u32,
        );
        writer.write(&header.serialize()?)?;

        for (path, oid) in &self.additions {
            let entry = StagedAddition::new(path.clone(), oid.clone());
            writer.write(&entry.serialize()?)?;
        }

        for path in &self.removals {
            let entry = StagedRemoval::new(path.clone());
            writer.write(&entry.serialize()?)?;
        }

        writer.write_checksum()?;
        self.changed = false;

        Ok(())
    }

    /// Whether there are staged changes not yet written to disk
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }

    pub fn additions(&self) -> &BTreeMap<PathBuf, ObjectId> {
        &self.additions
    }

    pub fn removals(&self) -> &BTreeSet<PathBuf> {
        &self.removals
    }

    pub fn is_staged_for_addition(&self, path: &Path) -> bool {
        self.additions.contains_key(path)
    }

    pub fn is_staged_for_removal(&self, path: &Path) -> bool {
        self.removals.contains(path)
    }

    pub fn stage_addition(&mut self, path: PathBuf, oid: ObjectId) {
        self.removals.remove(&path);
        self.additions.insert(path, oid);
        self.changed = true;
    }

    pub fn stage_removal(&mut self, path: PathBuf) {
        self.additions.remove(&path);
        self.removals.insert(path);
        self.changed = true;
    }

    /// Drop any staged change for `path`, returns whether there was one
    pub fn unstage(&mut self, path: &Path) -> bool {
        let had_addition = self.additions.remove(path).is_some();
        let had_removal = self.removals.remove(path);

        if had_addition || had_removal {
            self.changed = true;
        }

        had_addition || had_removal
    }

    pub fn clear(&mut self) {
        if !self.is_empty() {
            self.changed = true;
        }

        self.additions.clear();
        self.removals.clear();
    }

    /// The snapshot the next commit would record on top of `base`
    pub fn apply_to(&self, base: &Snapshot) -> Snapshot {
        let mut snapshot = base
            .iter()
            .filter(|(path, _)| !self.removals.contains(*path))
            .map(|(path, oid)| (path.clone(), oid.clone()))
            .collect::<Snapshot>();

        snapshot.extend(
            self.additions
                .iter()
                .map(|(path, oid)| (path.clone(), oid.clone())),
        );

        snapshot
    }
}
