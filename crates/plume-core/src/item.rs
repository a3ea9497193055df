//! Feed item types and ordering.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned post identifier.
///
/// Identity of a [`FeedItem`] is its `PostId`; the id is unique and stable
/// for the lifetime of the post.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub i64);

impl PostId {
    /// Get the raw id value.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "post:{}", self.0)
    }
}

impl From<i64> for PostId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Server-assigned author (user) identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorId(pub i64);

impl AuthorId {
    /// Get the raw id value.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "author:{}", self.0)
    }
}

impl From<i64> for AuthorId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A single feed post.
///
/// Immutable once received from the server, with one exception: the
/// `following` flag is client-patchable (optimistic follow/unfollow) and
/// is the only field the engine ever rewrites in place.
///
/// Wire mapping follows the feed service's JSON field names (`content`,
/// `userid`, `createdat`, `username`, `isFollowing`). Timestamps are
/// milliseconds since the Unix epoch; the transport layer is responsible
/// for normalizing whatever the server emits into ms.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Post identifier (identity of the item)
    pub id: PostId,
    /// Author of the post
    #[serde(rename = "userid")]
    pub author_id: AuthorId,
    /// Author display name, when the server includes it
    #[serde(rename = "username", default)]
    pub author_name: Option<String>,
    /// Post body
    #[serde(rename = "content")]
    pub body: String,
    /// Creation time (ms since epoch), server-assigned
    #[serde(rename = "createdat")]
    pub created_at_ms: u64,
    /// Whether the local user follows the author.
    ///
    /// Seeded from the server's feed response, then optimistically patched
    /// by follow/unfollow operations.
    #[serde(rename = "isFollowing", default)]
    pub following: bool,
}

impl FeedItem {
    /// Create a feed item with the fields the engine cares about.
    pub fn new(id: i64, author_id: i64, body: impl Into<String>, created_at_ms: u64) -> Self {
        Self {
            id: PostId(id),
            author_id: AuthorId(author_id),
            author_name: None,
            body: body.into(),
            created_at_ms,
            following: false,
        }
    }

    /// Ordering key: feed order is descending on this key.
    ///
    /// Ties on `created_at_ms` are broken by `id`, so the order is total
    /// and deterministic across merges.
    #[must_use]
    pub fn sort_key(&self) -> (u64, i64) {
        (self.created_at_ms, self.id.0)
    }
}
