//! Split point finder for three-way merges
//!
//! The split point of two commits is the common ancestor that is closest to
//! both of them. It is the base the merge compares both sides against.
//!
//! ## Algorithm
//!
//! 1. Walk breadth-first from the current tip over *all* parent edges,
//!    recording each ancestor's shortest distance and the order in which it
//!    was discovered. A tip is its own ancestor at distance 0.
//! 2. Do the same from the given tip.
//! 3. Among the commits reached from both sides, pick the one with the
//!    smallest sum of distances. Ties go to the commit the current side
//!    discovered first.
//!
//! Following every parent (not only the first) matters once a history has
//! merges in it: after merging `feature` into `master`, the tip of `feature`
//! becomes an ancestor of `master` and is a better split point than the
//! original fork commit.
//!
//! Commit parents are loaded through a caller supplied function so that the
//! finder works against the object database as well as in-memory graphs.

use crate::artifacts::objects::commit::SlimCommit;
use crate::artifacts::objects::object_id::ObjectId;
use bitflags::bitflags;
use std::collections::{HashMap, VecDeque};
use std::fmt;

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    struct Reach: u8 {
        const NONE = 0b00;
        const FROM_CURRENT = 0b01;
        const FROM_GIVEN = 0b10;
        const FROM_BOTH = Self::FROM_CURRENT.bits() | Self::FROM_GIVEN.bits();
    }
}

impl fmt::Debug for Reach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut flags = Vec::new();
        if self.contains(Reach::FROM_CURRENT) {
            flags.push("CURRENT");
        }
        if self.contains(Reach::FROM_GIVEN) {
            flags.push("GIVEN");
        }
        if flags.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", flags.join("|"))
        }
    }
}

/// What the walks learned about a single ancestor
#[derive(Debug, Clone, Copy)]
struct AncestorMark {
    reach: Reach,
    current_distance: usize,
    given_distance: usize,
    /// Position in the current side's discovery order
    discovery: usize,
}

impl Default for AncestorMark {
    fn default() -> Self {
        Self {
            reach: Reach::NONE,
            current_distance: usize::MAX,
            given_distance: usize::MAX,
            discovery: usize::MAX,
        }
    }
}

pub struct SplitPointFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    commit_loader: CommitLoaderFn,
}

impl<CommitLoaderFn> SplitPointFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    /// # Example
    ///
    /// ```rust,ignore
    /// let cache = CommitCache::new();
    /// let finder = SplitPointFinder::new(|oid| cache.get_or_load_slim_commit(&database, oid));
    /// ```
    pub fn new(commit_loader: CommitLoaderFn) -> Self {
        Self { commit_loader }
    }

    /// The split point of `current` and `given`, or `None` if the two
    /// histories share no commit
    pub fn find_split_point(
        &self,
        current: &ObjectId,
        given: &ObjectId,
    ) -> anyhow::Result<Option<ObjectId>> {
        let mut marks = HashMap::<ObjectId, AncestorMark>::new();

        self.walk(current, Reach::FROM_CURRENT, &mut marks)?;
        self.walk(given, Reach::FROM_GIVEN, &mut marks)?;

        debug_log!(
            "Ancestor marks: {}",
            marks
                .iter()
                .map(|(oid, mark)| format!("{}: {:?}", oid.to_short_oid(), mark))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let split_point = marks
            .into_iter()
            .filter(|(_, mark)| mark.reach.contains(Reach::FROM_BOTH))
            .min_by_key(|(_, mark)| {
                (
                    mark.current_distance + mark.given_distance,
                    mark.discovery,
                )
            })
            .map(|(oid, _)| oid);

        debug_log!(
            "Split point of {} and {}: {:?}",
            current.to_short_oid(),
            given.to_short_oid(),
            split_point
        );

        Ok(split_point)
    }

    fn walk(
        &self,
        tip: &ObjectId,
        side: Reach,
        marks: &mut HashMap<ObjectId, AncestorMark>,
    ) -> anyhow::Result<()> {
        let mut queue = VecDeque::from([(tip.clone(), 0usize)]);
        let mut discovered = 0usize;

        while let Some((oid, distance)) = queue.pop_front() {
            let mark = marks.entry(oid.clone()).or_default();
            if mark.reach.contains(side) {
                continue;
            }

            mark.reach |= side;
            if side == Reach::FROM_CURRENT {
                mark.current_distance = distance;
                mark.discovery = discovered;
                discovered += 1;
            } else {
                mark.given_distance = distance;
            }

            let commit = (self.commit_loader)(&oid)?;
            for parent in commit.parents {
                queue.push_back((parent, distance + 1));
            }
        }

        Ok(())
    }
}
