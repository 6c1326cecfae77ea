//! Per-path three-way merge classification
//!
//! Every path present in the split point, current or given snapshot is
//! classified by comparing its blob ID on each side (absence counts as a
//! deletion):
//!
//! | current vs given | current vs split | given vs split | result           |
//! |------------------|------------------|----------------|------------------|
//! | same             | -                | -              | keep current     |
//! | differ           | same             | -              | take given       |
//! | differ           | differ           | same           | keep current     |
//! | differ           | differ           | differ         | conflict         |
//!
//! Taking a deletion from the given side removes the file.

use crate::artifacts::objects::commit::Snapshot;
use crate::artifacts::objects::object_id::ObjectId;
use bytes::{BufMut, Bytes, BytesMut};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

pub const CONFLICT_START_MARKER: &str = "<<<<<<< HEAD\n";
pub const CONFLICT_SEPARATOR: &str = "=======\n";
pub const CONFLICT_END_MARKER: &str = ">>>>>>>\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The current side already holds the merged state
    KeepCurrent,
    /// Stage and write the given side's blob
    TakeGiven(ObjectId),
    /// The given side deleted a file the current side left untouched
    RemoveGiven,
    /// Both sides changed the file in different ways
    Conflict {
        current: Option<ObjectId>,
        given: Option<ObjectId>,
    },
}

/// The three snapshots taking part in a merge
#[derive(Debug, Clone)]
pub struct MergeContext {
    split: Snapshot,
    current: Snapshot,
    given: Snapshot,
}

impl MergeContext {
    pub fn new(split: Snapshot, current: Snapshot, given: Snapshot) -> Self {
        Self {
            split,
            current,
            given,
        }
    }

    pub fn current(&self) -> &Snapshot {
        &self.current
    }

    /// Union of the paths of all three snapshots
    pub fn paths(&self) -> BTreeSet<&PathBuf> {
        self.split
            .keys()
            .chain(self.current.keys())
            .chain(self.given.keys())
            .collect()
    }

    pub fn resolve(&self, path: &Path) -> Resolution {
        let split = self.split.get(path);
        let current = self.current.get(path);
        let given = self.given.get(path);

        if current == given {
            Resolution::KeepCurrent
        } else if current == split {
            match given {
                Some(oid) => Resolution::TakeGiven(oid.clone()),
                None => Resolution::RemoveGiven,
            }
        } else if given == split {
            Resolution::KeepCurrent
        } else {
            Resolution::Conflict {
                current: current.cloned(),
                given: given.cloned(),
            }
        }
    }

    /// Every path that needs work, in path order
    pub fn resolutions(&self) -> BTreeMap<PathBuf, Resolution> {
        self.paths()
            .into_iter()
            .map(|path| (path.clone(), self.resolve(path)))
            .filter(|(_, resolution)| resolution != &Resolution::KeepCurrent)
            .collect()
    }
}

/// Content of a conflicted file; a missing side contributes nothing
pub fn conflict_content(current: Option<&[u8]>, given: Option<&[u8]>) -> Bytes {
    let mut content = BytesMut::new();

    content.put_slice(CONFLICT_START_MARKER.as_bytes());
    content.put_slice(current.unwrap_or_default());
    content.put_slice(CONFLICT_SEPARATOR.as_bytes());
    content.put_slice(given.unwrap_or_default());
    content.put_slice(CONFLICT_END_MARKER.as_bytes());

    content.freeze()
}
