//! Merge engine: combine an ordered feed with an incoming page.
//!
//! `merge` is a pure function of its inputs. The store never touches the
//! item vector outside of it (and the declared optimistic patches), which
//! is what keeps the dedup and ordering invariants centralized and
//! property-testable.

use crate::item::FeedItem;
use std::collections::HashSet;

/// How an incoming batch combines with the existing feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeMode {
    /// Page 1 / reset: the incoming batch replaces the feed wholesale.
    Replace,
    /// Page > 1: incoming items are appended, duplicates dropped.
    Append,
}

/// Merge an incoming batch into the existing ordered feed.
///
/// - `Replace`: result is `incoming` deduplicated against itself (first
///   occurrence of an id wins), sorted.
/// - `Append`: result is `existing` plus every incoming item whose id is
///   not already present, re-sorted. Existing items keep their current
///   field values, so an optimistic follow patch applied while a page was
///   in flight survives the merge; genuinely new items carry whatever
///   state the server sent.
///
/// Output is always sorted by descending `(created_at_ms, id)` and
/// contains no duplicate ids. Id lookup is a hash set, O(n + m) before
/// the final sort.
#[must_use]
pub fn merge(existing: Vec<FeedItem>, incoming: Vec<FeedItem>, mode: MergeMode) -> Vec<FeedItem> {
    let mut seen: HashSet<_>;
    let mut out: Vec<FeedItem>;

    match mode {
        MergeMode::Replace => {
            seen = HashSet::with_capacity(incoming.len());
            out = Vec::with_capacity(incoming.len());
        }
        MergeMode::Append => {
            seen = existing.iter().map(|item| item.id).collect();
            out = existing;
            out.reserve(incoming.len());
        }
    }

    for item in incoming {
        if seen.insert(item.id) {
            out.push(item);
        }
    }

    out.sort_unstable_by(|a, b| b.sort_key().cmp(&a.sort_key()));
    out
}
