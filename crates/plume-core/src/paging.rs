//! Pagination position, request tickets, and the has-more rule.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The first page number the feed service accepts.
pub const FIRST_PAGE: u32 = 1;

/// Ticket identifying one fetch initiation.
///
/// Every fetch initiation bumps the cursor's request sequence and the new
/// sequence value becomes the ticket for that request. A response is only
/// applied if its ticket still matches the most recently issued one;
/// anything else is a stale response and is dropped silently. This is the
/// engine's whole answer to network reordering — cheaper than cancellation
/// and sufficient at feed request volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchTicket(pub u64);

impl fmt::Display for FetchTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ticket:{}", self.0)
    }
}

/// Authoritative pagination position.
///
/// `current_page` is the next page to request. The server may echo its own
/// page number in a response; [`PageCursor::reconcile`] adopts it after a
/// successful fetch, which guards against client/server drift if a caller
/// double-advances.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    current_page: u32,
    request_seq: u64,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl PageCursor {
    /// Create a cursor positioned at page 1 with no requests issued.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current_page: FIRST_PAGE,
            request_seq: 0,
        }
    }

    /// The next page to request. Read-only.
    #[must_use]
    pub fn next_page(&self) -> u32 {
        self.current_page
    }

    /// The most recently issued ticket.
    #[must_use]
    pub fn latest_ticket(&self) -> FetchTicket {
        FetchTicket(self.request_seq)
    }

    /// Advance to the next page and issue a ticket for its fetch.
    pub fn advance(&mut self) -> FetchTicket {
        self.current_page = self.current_page.saturating_add(1);
        self.bump()
    }

    /// Reposition the cursor (page 1 on reset) and issue a ticket.
    ///
    /// Bumping the sequence here is what supersedes any in-flight request:
    /// its response will no longer match the latest ticket.
    pub fn reset_to(&mut self, page: u32) -> FetchTicket {
        self.current_page = page.max(FIRST_PAGE);
        self.bump()
    }

    /// Adopt a server-echoed page number. Server is authoritative.
    pub fn reconcile(&mut self, server_page: u32) {
        self.current_page = server_page.max(FIRST_PAGE);
    }

    fn bump(&mut self) -> FetchTicket {
        self.request_seq += 1;
        FetchTicket(self.request_seq)
    }
}

/// Decide whether more pages exist from batch size vs requested limit.
///
/// `true` iff the batch filled the requested limit. A batch exactly equal
/// to the limit conservatively reports more data: without a subsequent
/// short page the engine cannot know the true total, and a look-ahead
/// scheme is deliberately out of scope. An empty page 1 yields an empty
/// feed and `false`, not an error.
#[must_use]
pub fn has_more(batch_len: usize, requested_limit: usize) -> bool {
    batch_len >= requested_limit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_starts_at_first_page() {
        let cursor = PageCursor::new();
        assert_eq!(cursor.next_page(), 1);
        assert_eq!(cursor.latest_ticket(), FetchTicket(0));
    }

    #[test]
    fn test_next_page_does_not_mutate() {
        let cursor = PageCursor::new();
        let _ = cursor.next_page();
        let _ = cursor.next_page();
        assert_eq!(cursor.next_page(), 1);
    }

    #[test]
    fn test_advance_bumps_page_and_ticket() {
        let mut cursor = PageCursor::new();
        let t1 = cursor.advance();
        assert_eq!(cursor.next_page(), 2);
        assert_eq!(t1, FetchTicket(1));
        let t2 = cursor.advance();
        assert_eq!(cursor.next_page(), 3);
        assert_eq!(t2, FetchTicket(2));
    }

    #[test]
    fn test_reset_bumps_ticket_and_supersedes() {
        let mut cursor = PageCursor::new();
        let t1 = cursor.advance();
        let t2 = cursor.reset_to(FIRST_PAGE);
        assert_eq!(cursor.next_page(), 1);
        assert_ne!(t1, t2);
        assert_eq!(cursor.latest_ticket(), t2);
    }

    #[test]
    fn test_reset_clamps_to_first_page() {
        let mut cursor = PageCursor::new();
        cursor.reset_to(0);
        assert_eq!(cursor.next_page(), 1);
    }

    #[test]
    fn test_reconcile_adopts_server_page() {
        let mut cursor = PageCursor::new();
        cursor.advance();
        cursor.advance();
        // Server says we are actually on page 2, not 3.
        cursor.reconcile(2);
        assert_eq!(cursor.next_page(), 2);
    }

    #[test]
    fn test_has_more_truth_table() {
        assert!(has_more(10, 10));
        assert!(has_more(11, 10));
        assert!(!has_more(9, 10));
        assert!(!has_more(0, 10));
        assert!(has_more(0, 0));
    }
}
