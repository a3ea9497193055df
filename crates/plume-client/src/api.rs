//! Remote feed API seam.
//!
//! The engine never talks HTTP directly. It consumes the remote service
//! through [`FeedApiEffects`], following the per-call effects pattern:
//! the service holds the implementation and the store stays pure.
//! Authentication (bearer token attachment) and 401-driven logout are the
//! transport implementation's concern; the engine only sees success or a
//! [`FeedError`].

use async_trait::async_trait;
use plume_core::{AuthorId, FeedError, FeedItem};
use serde::{Deserialize, Serialize};

/// One page of the feed as the server returns it.
///
/// `posts` defaults to empty when the field is missing, mirroring the
/// service's occasionally bare responses. The optional `page` echo, when
/// present, is authoritative for cursor reconciliation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPage {
    /// Server-echoed page number, when the service includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Items of this page, server-ordered
    #[serde(default)]
    pub posts: Vec<FeedItem>,
}

impl FeedPage {
    /// Build a page envelope from items, without a page echo.
    #[must_use]
    pub fn of(posts: Vec<FeedItem>) -> Self {
        Self { page: None, posts }
    }

    /// Number of items in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    /// Whether the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

/// Effect interface to the remote feed service.
///
/// Implementations must be cheap to call concurrently (`&self`); the
/// engine's single-flight gate already bounds outstanding page fetches,
/// but follow/unfollow calls may overlap a fetch.
#[async_trait]
pub trait FeedApiEffects: Send + Sync {
    /// Fetch one feed page: `GET /feed?page={page}&limit={limit}`.
    async fn fetch_feed(&self, page: u32, limit: u32) -> Result<FeedPage, FeedError>;

    /// Create a post: `POST /posts`. The server assigns id and timestamp.
    async fn create_post(&self, content: &str) -> Result<FeedItem, FeedError>;

    /// Follow an author: `POST /follow/{author}`.
    async fn follow(&self, author: AuthorId) -> Result<(), FeedError>;

    /// Unfollow an author: `DELETE /follow/{author}`.
    async fn unfollow(&self, author: AuthorId) -> Result<(), FeedError>;
}

/// URL path builders for HTTP-backed implementations.
///
/// Kept here so every transport agrees on the service's route shapes.
pub mod endpoints {
    use plume_core::AuthorId;

    /// Feed page query: `/feed?page={p}&limit={n}`.
    #[must_use]
    pub fn feed_path(page: u32, limit: u32) -> String {
        format!("/feed?page={page}&limit={limit}")
    }

    /// Post creation: `/posts`.
    #[must_use]
    pub fn posts_path() -> &'static str {
        "/posts"
    }

    /// Follow/unfollow target: `/follow/{userId}`.
    #[must_use]
    pub fn follow_path(author: AuthorId) -> String {
        format!("/follow/{}", author.value())
    }
}
