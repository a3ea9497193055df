//! Feed store: the synchronous pagination state machine.
//!
//! The store owns the merged item set, the page cursor, and the fetch
//! gate. Every fetch is split into phases so that response arrival order
//! is explicit:
//!
//! 1. `begin_initial` / `begin_next` mutate cursor + gate and hand back a
//!    ticketed [`PageRequest`] describing what to fetch.
//! 2. The caller performs the fetch (outside the store, outside any lock).
//! 3. `apply_page` / `fail_fetch` settle the request. A ticket that no
//!    longer matches the most recently issued one is a stale response and
//!    settles as a silent no-op.
//!
//! The item set is only ever rewritten through the merge engine and the
//! declared optimistic patches; nothing else read-modify-writes it.

use crate::api::FeedPage;
use plume_core::{
    has_more, merge, AuthorId, FeedItem, FetchGate, FetchStatus, FetchTicket, MergeMode,
    PageCursor, PostId,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// Fetch phase types
// ============================================================================

/// Description of a page fetch the caller should now perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// Ticket to settle the request with
    pub ticket: FetchTicket,
    /// Page number to request
    pub page: u32,
    /// Items to request (`limit` parameter)
    pub limit: u32,
}

/// Result of settling a response against the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Response was fresh and merged into the feed
    Applied,
    /// Response was superseded by a later request and dropped. Not an
    /// error; the gate now belongs to the superseding request.
    Stale,
}

#[derive(Clone, Copy, Debug)]
struct PendingFetch {
    ticket: FetchTicket,
    mode: MergeMode,
}

// ============================================================================
// Rollback snapshots
// ============================================================================

/// Rollback snapshot for an optimistic follow/unfollow patch.
///
/// Records each touched item's prior flag so a failed network call can
/// restore exactly what was there, including items that had already been
/// patched to a different value than their neighbors.
#[derive(Clone, Debug)]
pub struct FollowPatch {
    author: AuthorId,
    prior: Vec<(PostId, bool)>,
}

impl FollowPatch {
    /// The author the patch targeted.
    #[must_use]
    pub fn author(&self) -> AuthorId {
        self.author
    }

    /// Number of items the patch touched.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prior.len()
    }

    /// Whether the patch touched nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prior.is_empty()
    }
}

/// Rollback snapshot for an optimistic prune.
///
/// Keeps the removed items together with the positions they occupied, so
/// a failed unfollow restores them exactly where they were rather than
/// re-sorting.
#[derive(Clone, Debug)]
pub struct PruneSnapshot {
    author: AuthorId,
    /// Removed items with their original indices, ascending.
    removed: Vec<(usize, FeedItem)>,
}

impl PruneSnapshot {
    /// The author whose items were pruned.
    #[must_use]
    pub fn author(&self) -> AuthorId {
        self.author
    }

    /// Number of items removed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.removed.len()
    }

    /// Whether nothing was removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }
}

// ============================================================================
// Snapshot view
// ============================================================================

/// FFI-safe read view of the feed for frontends.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FeedSnapshot {
    /// Merged items, feed-ordered
    pub items: Vec<FeedItem>,
    /// Whether more pages exist
    pub has_more: bool,
    /// Whether a page fetch is in flight
    pub is_fetching: bool,
    /// True until the first page-1 request settles (drives the initial
    /// spinner, as opposed to the load-more indicator)
    pub is_initial_load: bool,
    /// Next page the cursor would request
    pub current_page: u32,
}

// ============================================================================
// FeedStore
// ============================================================================

/// Aggregate state for one feed view.
///
/// Created empty at page 1 with `has_more = true` and an idle gate. Each
/// feed view owns its own store; there is no shared global instance.
#[derive(Debug)]
pub struct FeedStore {
    items: Vec<FeedItem>,
    cursor: PageCursor,
    gate: FetchGate,
    has_more: bool,
    limit: u32,
    pending: Option<PendingFetch>,
    initial_settled: bool,
}

impl FeedStore {
    /// Create an empty store requesting `limit` items per page.
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self {
            items: Vec::new(),
            cursor: PageCursor::new(),
            gate: FetchGate::new(),
            has_more: true,
            limit: limit.max(1),
            pending: None,
            initial_settled: false,
        }
    }

    // ------------------------------------------------------------------
    // Read surface
    // ------------------------------------------------------------------

    /// Merged items, feed-ordered.
    #[must_use]
    pub fn items(&self) -> &[FeedItem] {
        &self.items
    }

    /// Whether more pages exist.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Current fetch status.
    #[must_use]
    pub fn status(&self) -> FetchStatus {
        self.gate.status()
    }

    /// Next page the cursor would request.
    #[must_use]
    pub fn current_page(&self) -> u32 {
        self.cursor.next_page()
    }

    /// Snapshot for frontends.
    #[must_use]
    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            items: self.items.clone(),
            has_more: self.has_more,
            is_fetching: self.gate.status().is_fetching(),
            is_initial_load: !self.initial_settled,
            current_page: self.cursor.next_page(),
        }
    }

    // ------------------------------------------------------------------
    // Fetch phases
    // ------------------------------------------------------------------

    /// Start (or restart) an initial load of page 1.
    ///
    /// Always succeeds: if a fetch is already in flight the new ticket
    /// supersedes it and gate ownership transfers to this request. The
    /// stale in-flight response will no longer match the latest ticket
    /// when it lands. Items are kept until the replacing page arrives.
    pub fn begin_initial(&mut self) -> PageRequest {
        let ticket = self.cursor.reset_to(plume_core::FIRST_PAGE);
        self.has_more = true;
        let _ = self.gate.try_enter();
        self.pending = Some(PendingFetch {
            ticket,
            mode: MergeMode::Replace,
        });
        PageRequest {
            ticket,
            page: self.cursor.next_page(),
            limit: self.limit,
        }
    }

    /// Start a next-page load.
    ///
    /// Returns `None` without side effects while a fetch is in flight or
    /// no more pages exist; this is the single-flight guarantee at the
    /// operation level.
    pub fn begin_next(&mut self) -> Option<PageRequest> {
        if !self.has_more {
            return None;
        }
        if !self.gate.try_enter() {
            debug!("load_next rejected: fetch already in flight");
            return None;
        }
        let ticket = self.cursor.advance();
        self.pending = Some(PendingFetch {
            ticket,
            mode: MergeMode::Append,
        });
        Some(PageRequest {
            ticket,
            page: self.cursor.next_page(),
            limit: self.limit,
        })
    }

    /// Settle a successful fetch.
    ///
    /// A fresh ticket merges the batch (Replace for an initial request,
    /// Append otherwise), recomputes `has_more` from the batch length vs
    /// the requested limit, adopts a server-echoed page number, and
    /// releases the gate. A stale ticket is dropped silently and leaves
    /// the gate alone — it belongs to the superseding request.
    pub fn apply_page(&mut self, ticket: FetchTicket, page: FeedPage) -> ApplyOutcome {
        let Some(pending) = self.pending else {
            debug!(%ticket, "response for settled request discarded");
            return ApplyOutcome::Stale;
        };
        if pending.ticket != ticket {
            debug!(%ticket, latest = %pending.ticket, "stale response discarded");
            return ApplyOutcome::Stale;
        }

        let batch_len = page.posts.len();
        self.items = merge(std::mem::take(&mut self.items), page.posts, pending.mode);
        self.has_more = has_more(batch_len, self.limit as usize);
        if let Some(server_page) = page.page {
            self.cursor.reconcile(server_page);
        }
        if pending.mode == MergeMode::Replace {
            self.initial_settled = true;
        }
        self.pending = None;
        self.gate.leave();
        ApplyOutcome::Applied
    }

    /// Settle a failed fetch.
    ///
    /// Releases the gate iff `ticket` is the pending request, leaving
    /// items, cursor, and `has_more` at their pre-fetch values so the
    /// caller can simply retry. A stale failure is ignored.
    pub fn fail_fetch(&mut self, ticket: FetchTicket) {
        let Some(pending) = self.pending else {
            return;
        };
        if pending.ticket != ticket {
            debug!(%ticket, "stale failure discarded");
            return;
        }
        if pending.mode == MergeMode::Replace {
            self.initial_settled = true;
        }
        self.pending = None;
        self.gate.leave();
    }

    // ------------------------------------------------------------------
    // Optimistic mutations
    // ------------------------------------------------------------------

    /// Optimistically set the follow flag on every item by `author`.
    ///
    /// Returns the rollback snapshot to apply if the network call fails.
    /// Safe to run while a fetch is pending: items already present keep
    /// the patch through an append merge, and a replacing page carries
    /// server truth anyway.
    pub fn apply_follow_patch(&mut self, author: AuthorId, following: bool) -> FollowPatch {
        let mut prior = Vec::new();
        for item in self.items.iter_mut().filter(|i| i.author_id == author) {
            prior.push((item.id, item.following));
            item.following = following;
        }
        FollowPatch { author, prior }
    }

    /// Undo a follow patch, restoring each item's recorded prior flag.
    ///
    /// Items that disappeared in the meantime (pruned, or dropped by a
    /// replace merge) are skipped.
    pub fn rollback_follow_patch(&mut self, patch: FollowPatch) {
        for (id, was_following) in patch.prior {
            if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
                item.following = was_following;
            }
        }
    }

    /// Optimistically remove every item by `author`, recording positions.
    pub fn prune_author(&mut self, author: AuthorId) -> PruneSnapshot {
        let mut removed = Vec::new();
        let mut index = 0;
        self.items.retain(|item| {
            let keep = item.author_id != author;
            if !keep {
                removed.push((index, item.clone()));
            }
            index += 1;
            keep
        });
        PruneSnapshot { author, removed }
    }

    /// Restore pruned items at their exact prior positions.
    ///
    /// Indices were recorded against the pre-prune vector, so inserting in
    /// ascending order reproduces it. If the set shrank in the meantime an
    /// index may exceed the current length; the item then lands at the
    /// end.
    pub fn restore_pruned(&mut self, snapshot: PruneSnapshot) {
        for (index, item) in snapshot.removed {
            let at = index.min(self.items.len());
            self.items.insert(at, item);
        }
    }

    /// Drop all state back to a fresh page-1 store.
    pub fn reset(&mut self) {
        let limit = self.limit;
        *self = Self::new(limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, author: i64, ts: u64) -> FeedItem {
        FeedItem::new(id, author, format!("post {id}"), ts)
    }

    fn full_page(range: std::ops::Range<i64>, author: i64) -> Vec<FeedItem> {
        range.map(|id| item(id, author, 1_000 * id as u64)).collect()
    }

    #[test]
    fn test_new_store_is_empty_idle_page_one() {
        let store = FeedStore::new(10);
        assert!(store.items().is_empty());
        assert!(store.has_more());
        assert_eq!(store.status(), FetchStatus::Idle);
        assert_eq!(store.current_page(), 1);
        assert!(store.snapshot().is_initial_load);
    }

    #[test]
    fn test_initial_load_replaces_and_settles() {
        let mut store = FeedStore::new(10);
        let req = store.begin_initial();
        assert_eq!(req.page, 1);
        assert_eq!(store.status(), FetchStatus::Fetching);

        let outcome = store.apply_page(req.ticket, FeedPage::of(full_page(1..11, 7)));
        assert_eq!(outcome, ApplyOutcome::Applied);
        assert_eq!(store.items().len(), 10);
        assert!(store.has_more());
        assert_eq!(store.status(), FetchStatus::Idle);
        assert!(!store.snapshot().is_initial_load);
    }

    #[test]
    fn test_partial_page_clears_has_more() {
        let mut store = FeedStore::new(10);
        let req = store.begin_initial();
        store.apply_page(req.ticket, FeedPage::of(full_page(1..5, 7)));
        assert!(!store.has_more());
        assert!(store.begin_next().is_none());
    }

    #[test]
    fn test_empty_first_page_is_empty_feed_not_error() {
        let mut store = FeedStore::new(10);
        let req = store.begin_initial();
        let outcome = store.apply_page(req.ticket, FeedPage::of(Vec::new()));
        assert_eq!(outcome, ApplyOutcome::Applied);
        assert!(store.items().is_empty());
        assert!(!store.has_more());
        assert_eq!(store.status(), FetchStatus::Idle);
    }

    #[test]
    fn test_begin_next_advances_and_appends() {
        let mut store = FeedStore::new(10);
        let req = store.begin_initial();
        store.apply_page(req.ticket, FeedPage::of(full_page(11..21, 7)));

        let req = store.begin_next().unwrap();
        assert_eq!(req.page, 2);
        store.apply_page(req.ticket, FeedPage::of(full_page(1..5, 7)));
        assert_eq!(store.items().len(), 14);
        assert!(!store.has_more());
    }

    #[test]
    fn test_begin_next_single_flight() {
        let mut store = FeedStore::new(10);
        let req = store.begin_initial();
        store.apply_page(req.ticket, FeedPage::of(full_page(1..11, 7)));

        let first = store.begin_next();
        assert!(first.is_some());
        assert!(store.begin_next().is_none());
        assert!(store.begin_next().is_none());
    }

    #[test]
    fn test_duplicate_ids_across_pages_are_dropped() {
        let mut store = FeedStore::new(10);
        let req = store.begin_initial();
        store.apply_page(req.ticket, FeedPage::of(full_page(11..21, 7)));

        // Page 2 re-sends id 11 (the feed shifted server-side).
        let mut page2 = full_page(7..11, 7);
        page2.push(item(11, 7, 11_000));
        let req = store.begin_next().unwrap();
        store.apply_page(req.ticket, FeedPage::of(page2));

        assert_eq!(store.items().len(), 14);
        let ids: std::collections::HashSet<_> = store.items().iter().map(|i| i.id).collect();
        assert_eq!(ids.len(), 14);
    }

    #[test]
    fn test_reissued_initial_supersedes_pending() {
        // Scenario D: two rapid initial loads; the earlier-issued response
        // arrives last and must be dropped.
        let mut store = FeedStore::new(10);
        let first = store.begin_initial();
        let second = store.begin_initial();
        assert_ne!(first.ticket, second.ticket);
        assert_eq!(store.status(), FetchStatus::Fetching);

        let fresh = FeedPage::of(full_page(100..104, 2));
        assert_eq!(store.apply_page(second.ticket, fresh), ApplyOutcome::Applied);
        assert_eq!(store.status(), FetchStatus::Idle);

        let stale = FeedPage::of(full_page(1..11, 1));
        assert_eq!(store.apply_page(first.ticket, stale), ApplyOutcome::Stale);

        let ids: Vec<i64> = store.items().iter().map(|i| i.id.value()).collect();
        assert_eq!(ids, vec![103, 102, 101, 100]);
    }

    #[test]
    fn test_stale_response_does_not_release_transferred_gate() {
        let mut store = FeedStore::new(10);
        let first = store.begin_initial();
        let second = store.begin_initial();

        // The superseded response settles first; the gate still belongs to
        // the second request.
        assert_eq!(
            store.apply_page(first.ticket, FeedPage::of(Vec::new())),
            ApplyOutcome::Stale
        );
        assert_eq!(store.status(), FetchStatus::Fetching);

        store.apply_page(second.ticket, FeedPage::of(full_page(1..11, 1)));
        assert_eq!(store.status(), FetchStatus::Idle);
    }

    #[test]
    fn test_fail_fetch_releases_gate_and_preserves_state() {
        let mut store = FeedStore::new(10);
        let req = store.begin_initial();
        store.apply_page(req.ticket, FeedPage::of(full_page(1..11, 7)));

        let req = store.begin_next().unwrap();
        store.fail_fetch(req.ticket);
        assert_eq!(store.status(), FetchStatus::Idle);
        assert_eq!(store.items().len(), 10);
        assert!(store.has_more());
        // Retry is possible immediately.
        assert!(store.begin_next().is_some());
    }

    #[test]
    fn test_stale_failure_is_ignored() {
        let mut store = FeedStore::new(10);
        let first = store.begin_initial();
        let second = store.begin_initial();
        store.fail_fetch(first.ticket);
        assert_eq!(store.status(), FetchStatus::Fetching);
        store.fail_fetch(second.ticket);
        assert_eq!(store.status(), FetchStatus::Idle);
    }

    #[test]
    fn test_server_page_echo_reconciles_cursor() {
        let mut store = FeedStore::new(10);
        let req = store.begin_initial();
        store.apply_page(
            req.ticket,
            FeedPage {
                page: Some(1),
                posts: full_page(1..11, 7),
            },
        );
        assert_eq!(store.current_page(), 1);
        let req = store.begin_next().unwrap();
        assert_eq!(req.page, 2);
    }

    #[test]
    fn test_follow_patch_and_rollback() {
        let mut store = FeedStore::new(10);
        let req = store.begin_initial();
        let mut posts = full_page(1..4, 42);
        posts.extend(full_page(4..6, 9));
        store.apply_page(req.ticket, FeedPage::of(posts));

        let patch = store.apply_follow_patch(AuthorId(42), true);
        assert_eq!(patch.len(), 3);
        assert!(store
            .items()
            .iter()
            .filter(|i| i.author_id == AuthorId(42))
            .all(|i| i.following));
        assert!(store
            .items()
            .iter()
            .filter(|i| i.author_id == AuthorId(9))
            .all(|i| !i.following));

        store.rollback_follow_patch(patch);
        assert!(store.items().iter().all(|i| !i.following));
    }

    #[test]
    fn test_follow_patch_survives_inflight_append() {
        let mut store = FeedStore::new(3);
        let req = store.begin_initial();
        store.apply_page(req.ticket, FeedPage::of(full_page(10..13, 42)));

        let req = store.begin_next().unwrap();
        // Patch lands while page 2 is in flight.
        store.apply_follow_patch(AuthorId(42), true);

        // Page 2 re-sends item 12 unpatched plus a genuinely new item.
        let mut page2 = vec![item(12, 42, 12_000)];
        page2.push(item(5, 42, 5_000));
        store.apply_page(req.ticket, FeedPage::of(page2));

        let twelve = store.items().iter().find(|i| i.id.value() == 12).unwrap();
        assert!(twelve.following, "patch lost across append merge");
        let five = store.items().iter().find(|i| i.id.value() == 5).unwrap();
        assert!(!five.following, "new item must carry server state");
    }

    #[test]
    fn test_prune_and_restore_exact_positions() {
        let mut store = FeedStore::new(10);
        let req = store.begin_initial();
        let posts = vec![
            item(5, 1, 5_000),
            item(4, 42, 4_000),
            item(3, 1, 3_000),
            item(2, 42, 2_000),
            item(1, 1, 1_000),
        ];
        store.apply_page(req.ticket, FeedPage::of(posts));
        let before: Vec<i64> = store.items().iter().map(|i| i.id.value()).collect();

        let snapshot = store.prune_author(AuthorId(42));
        assert_eq!(snapshot.len(), 2);
        let ids: Vec<i64> = store.items().iter().map(|i| i.id.value()).collect();
        assert_eq!(ids, vec![5, 3, 1]);

        store.restore_pruned(snapshot);
        let after: Vec<i64> = store.items().iter().map(|i| i.id.value()).collect();
        assert_eq!(after, before);
    }

    #[test]
    fn test_prune_nothing_is_harmless() {
        let mut store = FeedStore::new(10);
        let req = store.begin_initial();
        store.apply_page(req.ticket, FeedPage::of(full_page(1..4, 1)));

        let snapshot = store.prune_author(AuthorId(99));
        assert!(snapshot.is_empty());
        store.restore_pruned(snapshot);
        assert_eq!(store.items().len(), 3);
    }

    #[test]
    fn test_reset_returns_to_fresh_state() {
        let mut store = FeedStore::new(10);
        let req = store.begin_initial();
        store.apply_page(req.ticket, FeedPage::of(full_page(1..5, 7)));
        assert!(!store.has_more());

        store.reset();
        assert!(store.items().is_empty());
        assert!(store.has_more());
        assert_eq!(store.current_page(), 1);
        assert_eq!(store.status(), FetchStatus::Idle);
    }
}
