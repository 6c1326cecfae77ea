//! Commit object
//!
//! A commit records a full snapshot of the tracked files (path -> blob ID)
//! together with a message, a timestamp and its parent commits:
//! - no parent for the root commit created by `init`
//! - one parent for regular commits
//! - two parents for merge commits (current tip first, merged-in tip second)
//!
//! ## Format (version 1)
//!
//! On disk:
//! ```text
//! commit <size>\0
//! format 1
//! date <unix-seconds> <+hhmm>
//! parent <parent-sha>
//! file <blob-sha> <path>
//!
//! <commit message>
//! ```
//!
//! Parents keep their order and snapshot entries are written in path order,
//! so the same logical commit always serializes (and hashes) the same way.

use crate::artifacts::objects::object::{Object, Packable, Unpackable, frame};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset, TimeZone};
use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Version of the commit encoding written by this crate
pub const COMMIT_FORMAT_VERSION: u32 = 1;

/// A commit may have at most this many parents
pub const MAX_PARENTS: usize = 2;

/// Tracked file state at a commit: path -> blob ID
pub type Snapshot = BTreeMap<PathBuf, ObjectId>;

/// Slim representation of a commit
///
/// Contains only what graph traversals need. Owned so that it can be handed out
/// from a cache.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SlimCommit {
    /// The commit's object ID
    pub oid: ObjectId,
    /// The commit's parent object IDs
    pub parents: Vec<ObjectId>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    message: String,
    timestamp: DateTime<FixedOffset>,
    parents: Vec<ObjectId>,
    snapshot: Snapshot,
}

impl Commit {
    pub fn new(
        message: String,
        timestamp: DateTime<FixedOffset>,
        parents: Vec<ObjectId>,
        snapshot: Snapshot,
    ) -> Self {
        Commit {
            message,
            timestamp,
            parents,
            snapshot,
        }
    }

    /// The root commit every repository starts from
    pub fn root(message: &str) -> Self {
        let epoch = FixedOffset::east_opt(0)
            .and_then(|offset| offset.timestamp_opt(0, 0).single())
            .unwrap_or_default();

        Commit::new(message.to_string(), epoch, Vec::new(), Snapshot::new())
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    /// Timestamp formatted like `Thu Jan 1 00:00:00 1970 +0000`
    pub fn readable_timestamp(&self) -> String {
        self.timestamp
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn into_snapshot(self) -> Snapshot {
        self.snapshot
    }

    pub fn entry(&self, path: &Path) -> Option<&ObjectId> {
        self.snapshot.get(path)
    }

    pub fn tracks(&self, path: &Path) -> bool {
        self.snapshot.contains_key(path)
    }

    fn format_offset(offset: &FixedOffset) -> String {
        let seconds = offset.local_minus_utc();
        let sign = if seconds < 0 { '-' } else { '+' };
        let seconds = seconds.abs();

        format!("{}{:02}{:02}", sign, seconds / 3600, (seconds % 3600) / 60)
    }

    fn parse_date(value: &str) -> anyhow::Result<DateTime<FixedOffset>> {
        let (seconds, offset) = value
            .split_once(' ')
            .context("Invalid commit object: malformed date line")?;
        let seconds = seconds
            .parse::<i64>()
            .context("Invalid commit object: malformed timestamp")?;

        if offset.len() != 5 || !offset[1..].chars().all(|c| c.is_ascii_digit()) {
            anyhow::bail!("Invalid commit object: malformed timezone {offset:?}");
        }
        let hours = offset[1..3].parse::<i32>()?;
        let minutes = offset[3..5].parse::<i32>()?;
        let offset_seconds = hours * 3600 + minutes * 60;
        let offset = match &offset[..1] {
            "+" => FixedOffset::east_opt(offset_seconds),
            "-" => FixedOffset::west_opt(offset_seconds),
            _ => None,
        }
        .context("Invalid commit object: malformed timezone")?;

        offset
            .timestamp_opt(seconds, 0)
            .single()
            .context("Invalid commit object: timestamp out of range")
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut lines = vec![
            format!("format {}", COMMIT_FORMAT_VERSION),
            format!(
                "date {} {}",
                self.timestamp.timestamp(),
                Self::format_offset(self.timestamp.offset())
            ),
        ];
        for parent in &self.parents {
            lines.push(format!("parent {}", parent));
        }
        for (path, oid) in &self.snapshot {
            lines.push(format!("file {} {}", oid, path.to_string_lossy()));
        }
        lines.push(String::new());
        lines.push(self.message.clone());

        Ok(frame(self.object_type(), lines.join("\n").as_bytes()))
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;
        let content = String::from_utf8(content)?;

        let (headers, message) = content
            .split_once("\n\n")
            .context("Invalid commit object: missing message separator")?;
        let mut lines = headers.lines();

        let version = lines
            .next()
            .and_then(|line| line.strip_prefix("format "))
            .context("Invalid commit object: missing format line")?
            .parse::<u32>()
            .context("Invalid commit object: malformed format version")?;
        if version != COMMIT_FORMAT_VERSION {
            anyhow::bail!("Unsupported commit format version: {}", version);
        }

        let timestamp = lines
            .next()
            .and_then(|line| line.strip_prefix("date "))
            .context("Invalid commit object: missing date line")?;
        let timestamp = Self::parse_date(timestamp)?;

        let mut parents = Vec::new();
        let mut snapshot = Snapshot::new();
        for line in lines {
            if let Some(parent) = line.strip_prefix("parent ") {
                parents.push(ObjectId::try_parse(parent.to_string())?);
            } else if let Some(entry) = line.strip_prefix("file ") {
                let (oid, path) = entry
                    .split_once(' ')
                    .context("Invalid commit object: malformed file line")?;
                snapshot.insert(PathBuf::from(path), ObjectId::try_parse(oid.to_string())?);
            } else {
                anyhow::bail!("Invalid commit object: unexpected line {line:?}");
            }
        }

        if parents.len() > MAX_PARENTS {
            anyhow::bail!(
                "Invalid commit object: {} parents, at most {} allowed",
                parents.len(),
                MAX_PARENTS
            );
        }

        Ok(Commit::new(message.to_string(), timestamp, parents, snapshot))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }
}
