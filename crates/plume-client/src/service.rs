//! Feed service: async orchestration over the store.
//!
//! `FeedService` pairs a [`FeedStore`] with a [`FeedApiEffects`]
//! implementation. All mutation goes through its operations; the store
//! lock is held only across the synchronous phases and never across an
//! API await, so UI reads stay responsive while a page is in flight and
//! follow patches can land mid-fetch.

use crate::api::FeedApiEffects;
use crate::config::FeedConfig;
use crate::store::{FeedSnapshot, FeedStore};
use async_lock::Mutex;
use plume_core::{AuthorId, FeedError};
use tracing::{debug, warn};

/// Orchestrator for one feed view.
///
/// # Example
///
/// ```ignore
/// let service = FeedService::new(api, FeedConfig::default())?;
/// service.load_initial().await?;
/// while service.snapshot().await.has_more {
///     service.load_next().await?;
/// }
/// ```
pub struct FeedService<A> {
    api: A,
    store: Mutex<FeedStore>,
}

impl<A: FeedApiEffects> FeedService<A> {
    /// Create a service with a validated config.
    ///
    /// # Errors
    /// `FeedError::InvalidConfig` if the config fails validation.
    pub fn new(api: A, config: FeedConfig) -> Result<Self, FeedError> {
        config.validate()?;
        Ok(Self {
            api,
            store: Mutex::new(FeedStore::new(config.page_limit)),
        })
    }

    /// The underlying API implementation.
    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Read view of the current feed state.
    pub async fn snapshot(&self) -> FeedSnapshot {
        self.store.lock().await.snapshot()
    }

    /// Load (or reload) page 1, replacing the item set.
    ///
    /// Safe to call again while a previous initial load is pending: the
    /// new request supersedes it and the stale response is dropped by the
    /// ticket check, so the last call's data always wins.
    ///
    /// # Errors
    /// Propagates the API failure; the store is left Idle and retryable.
    pub async fn load_initial(&self) -> Result<(), FeedError> {
        let request = self.store.lock().await.begin_initial();
        match self.api.fetch_feed(request.page, request.limit).await {
            Ok(page) => {
                self.store.lock().await.apply_page(request.ticket, page);
                Ok(())
            }
            Err(err) => {
                warn!(page = request.page, error = %err, "initial feed fetch failed");
                self.store.lock().await.fail_fetch(request.ticket);
                Err(err)
            }
        }
    }

    /// Load the next page, appending to the item set.
    ///
    /// Returns `Ok(false)` without fetching while a fetch is in flight or
    /// no more pages exist; `Ok(true)` when a page was fetched and merged.
    ///
    /// # Errors
    /// Propagates the API failure; `has_more` and the item set keep their
    /// pre-fetch values and the operation can simply be retried.
    pub async fn load_next(&self) -> Result<bool, FeedError> {
        let Some(request) = self.store.lock().await.begin_next() else {
            return Ok(false);
        };
        match self.api.fetch_feed(request.page, request.limit).await {
            Ok(page) => {
                self.store.lock().await.apply_page(request.ticket, page);
                Ok(true)
            }
            Err(err) => {
                warn!(page = request.page, error = %err, "feed page fetch failed");
                self.store.lock().await.fail_fetch(request.ticket);
                Err(err)
            }
        }
    }

    /// Create a post, then refetch page 1.
    ///
    /// The created item is never inserted locally: its id and timestamp
    /// are server-assigned, and whether it appears in the caller's own
    /// feed is the server's fan-out decision. A fresh page 1 reflects
    /// both.
    ///
    /// # Errors
    /// `FeedError::EmptyBody` (before any network call) if `body` trims to
    /// nothing; otherwise the API failure.
    pub async fn create_post(&self, body: &str) -> Result<(), FeedError> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Err(FeedError::EmptyBody);
        }
        let created = self.api.create_post(trimmed).await?;
        debug!(id = %created.id, "post created, refreshing feed");
        self.load_initial().await
    }

    /// Optimistically toggle follow state for an author, then confirm.
    ///
    /// Every held item by `author` is patched immediately; if the network
    /// call fails the patch is rolled back to each item's prior value and
    /// the error surfaced. Membership and order of the item set never
    /// change, which is why optimistic-then-reconcile is correct here
    /// where post creation uses refetch instead.
    ///
    /// # Errors
    /// The follow/unfollow API failure, after rollback.
    pub async fn set_follow_state(
        &self,
        author: AuthorId,
        following: bool,
    ) -> Result<(), FeedError> {
        let patch = self
            .store
            .lock()
            .await
            .apply_follow_patch(author, following);
        let result = if following {
            self.api.follow(author).await
        } else {
            self.api.unfollow(author).await
        };
        if let Err(err) = result {
            warn!(%author, following, error = %err, "follow call failed, rolling back");
            self.store.lock().await.rollback_follow_patch(patch);
            return Err(err);
        }
        Ok(())
    }

    /// Unfollow an author and immediately drop their posts from the feed.
    ///
    /// The removed items are snapshotted with their positions; if the
    /// unfollow call fails they are restored exactly where they were.
    ///
    /// # Errors
    /// The unfollow API failure, after restoration.
    pub async fn unfollow_and_prune(&self, author: AuthorId) -> Result<(), FeedError> {
        let snapshot = self.store.lock().await.prune_author(author);
        debug!(%author, pruned = snapshot.len(), "optimistically pruned author");
        if let Err(err) = self.api.unfollow(author).await {
            warn!(%author, error = %err, "unfollow failed, restoring pruned items");
            self.store.lock().await.restore_pruned(snapshot);
            return Err(err);
        }
        Ok(())
    }
}
