//! # Plume Client - Headless Feed Engine
//!
//! Portable, UI-agnostic core for a paginated social feed with infinite
//! scroll: page tracking, single-flight fetching, stable merge of incoming
//! pages, optimistic follow/unfollow, and refetch-on-create.
//!
//! # Architecture
//!
//! The engine is split along a sync/async seam:
//!
//! - [`FeedStore`] is a synchronous state machine. Fetches are split into
//!   explicit phases (`begin_initial`/`begin_next` issue a ticketed
//!   [`PageRequest`], `apply_page`/`fail_fetch` settle it), so response
//!   arrival order is fully testable without a runtime.
//! - [`FeedService`] is the async orchestrator. It owns the store behind
//!   an `async_lock::Mutex`, holds the lock only across the synchronous
//!   phases, and awaits the remote API between them.
//! - [`FeedApiEffects`] is the effect trait for the remote feed service;
//!   each frontend (or the testkit) supplies an implementation.
//! - [`ScrollTrigger`] turns sentinel-visibility geometry into debounced
//!   `advance` signals, reading live fetch status at signal time.
//!
//! Each feed view owns one `FeedService`; there is no process-wide
//! singleton.
//!
//! # Data flow
//!
//! ```text
//! ScrollTrigger::observe ── Advance ──▶ FeedService::load_next
//!     ▲                                      │ begin_next (gate + ticket)
//!     │ fetch_settled                        ▼
//!     └──────────────────────────── FeedApiEffects::fetch_feed
//!                                            │
//!                                            ▼
//!                              FeedStore::apply_page (merge, has_more)
//! ```

pub mod api;
pub mod config;
pub mod scroll;
pub mod service;
pub mod store;

pub use api::{endpoints, FeedApiEffects, FeedPage};
pub use config::FeedConfig;
pub use scroll::{Advance, ScrollTrigger, ScrollTriggerConfig, SentinelSample};
pub use service::FeedService;
pub use store::{ApplyOutcome, FeedSnapshot, FeedStore, FollowPatch, PageRequest, PruneSnapshot};

// Re-export the domain layer for convenience
pub use plume_core::{
    has_more, merge, AuthorId, FeedError, FeedItem, FetchGate, FetchStatus, FetchTicket,
    MergeMode, PageCursor, PostId, FIRST_PAGE,
};
