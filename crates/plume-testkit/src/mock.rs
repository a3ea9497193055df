//! Scripted mock of the remote feed service.

use async_trait::async_trait;
use futures::channel::oneshot;
use parking_lot::Mutex;
use plume_client::{FeedApiEffects, FeedPage};
use plume_core::{AuthorId, FeedError, FeedItem};
use std::collections::VecDeque;

#[derive(Default)]
struct Inner {
    /// Pages served by number (index 0 = page 1). Requests past the end
    /// get an empty page, like a real feed running dry.
    pages: Vec<Vec<FeedItem>>,
    /// Per-call fetch overrides, consumed FIFO in call order before
    /// `pages` is consulted.
    scripted_fetches: VecDeque<Result<FeedPage, FeedError>>,
    fail_create: Option<FeedError>,
    fail_follow: Option<FeedError>,
    fail_unfollow: Option<FeedError>,
    /// When true, each fetch parks on a oneshot until released.
    gated: bool,
    parked: VecDeque<oneshot::Sender<()>>,
    fetch_calls: Vec<(u32, u32)>,
    create_calls: Vec<String>,
    follow_calls: Vec<AuthorId>,
    unfollow_calls: Vec<AuthorId>,
    next_post_id: i64,
}

/// Mock [`FeedApiEffects`] with scripted pages, failure injection, call
/// recording, and manual gating.
///
/// Gating makes request interleavings deterministic: with
/// [`MockFeedApi::gate_fetches`] enabled every fetch parks after its
/// response is chosen and only returns when [`MockFeedApi::release_one`]
/// fires, so a test controls exactly which response arrives first.
#[derive(Default)]
pub struct MockFeedApi {
    inner: Mutex<Inner>,
}

impl MockFeedApi {
    /// Create a mock with no pages (every fetch returns an empty page).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock serving the given pages (index 0 = page 1).
    #[must_use]
    pub fn with_pages(pages: Vec<Vec<FeedItem>>) -> Self {
        let mock = Self::new();
        mock.inner.lock().pages = pages;
        mock
    }

    /// Replace the served pages.
    pub fn set_pages(&self, pages: Vec<Vec<FeedItem>>) {
        self.inner.lock().pages = pages;
    }

    /// Queue a one-shot fetch response consumed before the page table.
    pub fn script_fetch(&self, response: Result<FeedPage, FeedError>) {
        self.inner.lock().scripted_fetches.push_back(response);
    }

    /// Make the next fetch fail with `err`.
    pub fn fail_next_fetch(&self, err: FeedError) {
        self.script_fetch(Err(err));
    }

    /// Make the next `create_post` fail with `err`.
    pub fn fail_next_create(&self, err: FeedError) {
        self.inner.lock().fail_create = Some(err);
    }

    /// Make the next `follow` fail with `err`.
    pub fn fail_next_follow(&self, err: FeedError) {
        self.inner.lock().fail_follow = Some(err);
    }

    /// Make the next `unfollow` fail with `err`.
    pub fn fail_next_unfollow(&self, err: FeedError) {
        self.inner.lock().fail_unfollow = Some(err);
    }

    /// Park every subsequent fetch until released.
    pub fn gate_fetches(&self) {
        self.inner.lock().gated = true;
    }

    /// Release the parked fetch at `index` (0 = oldest). Returns false if
    /// no fetch is parked there.
    pub fn release_at(&self, index: usize) -> bool {
        let sender = {
            let mut inner = self.inner.lock();
            if index >= inner.parked.len() {
                return false;
            }
            inner.parked.remove(index)
        };
        sender.map(|s| s.send(()).is_ok()).unwrap_or(false)
    }

    /// Release the oldest parked fetch.
    pub fn release_one(&self) -> bool {
        self.release_at(0)
    }

    /// Number of fetches currently parked behind the gate.
    #[must_use]
    pub fn parked_count(&self) -> usize {
        self.inner.lock().parked.len()
    }

    /// Recorded `(page, limit)` fetch calls, in call order.
    #[must_use]
    pub fn fetch_calls(&self) -> Vec<(u32, u32)> {
        self.inner.lock().fetch_calls.clone()
    }

    /// Recorded post bodies.
    #[must_use]
    pub fn create_calls(&self) -> Vec<String> {
        self.inner.lock().create_calls.clone()
    }

    /// Recorded follow targets.
    #[must_use]
    pub fn follow_calls(&self) -> Vec<AuthorId> {
        self.inner.lock().follow_calls.clone()
    }

    /// Recorded unfollow targets.
    #[must_use]
    pub fn unfollow_calls(&self) -> Vec<AuthorId> {
        self.inner.lock().unfollow_calls.clone()
    }
}

#[async_trait]
impl FeedApiEffects for MockFeedApi {
    async fn fetch_feed(&self, page: u32, limit: u32) -> Result<FeedPage, FeedError> {
        // Choose the response and park (if gated) under one lock scope;
        // the await happens strictly outside it.
        let (response, parked) = {
            let mut inner = self.inner.lock();
            inner.fetch_calls.push((page, limit));

            let response = if let Some(scripted) = inner.scripted_fetches.pop_front() {
                scripted
            } else {
                let posts = inner
                    .pages
                    .get(page.saturating_sub(1) as usize)
                    .cloned()
                    .unwrap_or_default();
                Ok(FeedPage {
                    page: Some(page),
                    posts,
                })
            };

            let parked = if inner.gated {
                let (sender, receiver) = oneshot::channel();
                inner.parked.push_back(sender);
                Some(receiver)
            } else {
                None
            };
            (response, parked)
        };

        if let Some(receiver) = parked {
            let _ = receiver.await;
        }
        response
    }

    async fn create_post(&self, content: &str) -> Result<FeedItem, FeedError> {
        let mut inner = self.inner.lock();
        if let Some(err) = inner.fail_create.take() {
            return Err(err);
        }
        inner.create_calls.push(content.to_string());
        inner.next_post_id += 1;
        let id = 1_000_000 + inner.next_post_id;
        Ok(FeedItem::new(id, 0, content, 1_000 * id as u64))
    }

    async fn follow(&self, author: AuthorId) -> Result<(), FeedError> {
        let mut inner = self.inner.lock();
        if let Some(err) = inner.fail_follow.take() {
            return Err(err);
        }
        inner.follow_calls.push(author);
        Ok(())
    }

    async fn unfollow(&self, author: AuthorId) -> Result<(), FeedError> {
        let mut inner = self.inner.lock();
        if let Some(err) = inner.fail_unfollow.take() {
            return Err(err);
        }
        inner.unfollow_calls.push(author);
        Ok(())
    }
}
