//! Item and page factories for tests.

use plume_core::FeedItem;

/// Build a feed item with a timestamp derived from its id, so larger ids
/// sort newer and fixtures stay readable.
#[must_use]
pub fn item(id: i64, author: i64) -> FeedItem {
    FeedItem::new(id, author, format!("post {id}"), 1_000 * id as u64)
}

/// Items for one page: ids `range`, single author, newest (highest id)
/// first the way the server returns them.
#[must_use]
pub fn page_items(range: std::ops::Range<i64>, author: i64) -> Vec<FeedItem> {
    range.rev().map(|id| item(id, author)).collect()
}

/// Split `total` items (ids descending from `total`) into server pages of
/// `limit`, newest first: page 1 holds the newest ids.
#[must_use]
pub fn paged(total: i64, limit: usize, author: i64) -> Vec<Vec<FeedItem>> {
    let items: Vec<FeedItem> = (1..=total).rev().map(|id| item(id, author)).collect();
    items.chunks(limit).map(<[FeedItem]>::to_vec).collect()
}
