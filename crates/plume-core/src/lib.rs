//! Plume Core - Feed Domain Layer
//!
//! This crate provides the pure, synchronous domain layer for the Plume
//! paginated feed engine:
//!
//! - Items and ordering: [`FeedItem`], [`PostId`], [`AuthorId`]
//! - Merge engine: [`merge`] with [`MergeMode`] (dedup + stable chronological order)
//! - Pagination: [`PageCursor`], [`FetchTicket`], [`has_more`]
//! - Fetch gating: [`FetchGate`], [`FetchStatus`] (single-flight)
//! - Error taxonomy: [`FeedError`]
//!
//! # Architecture
//!
//! Nothing in this crate performs I/O or holds async state. The async
//! orchestration layer (`plume-client`) composes these pieces into a
//! `FeedStore` aggregate; keeping the domain layer pure is what makes the
//! merge and pagination invariants property-testable.
//!
//! # Ordering rule
//!
//! The feed is ordered by descending `(created_at_ms, id)`. Server
//! timestamps may collide at second granularity, so the item id breaks
//! ties deterministically.
//!
//! # Example
//!
//! ```
//! use plume_core::{merge, FeedItem, MergeMode};
//!
//! let page1 = vec![FeedItem::new(2, 7, "hello", 2_000), FeedItem::new(1, 7, "hi", 1_000)];
//! let feed = merge(Vec::new(), page1, MergeMode::Replace);
//! assert_eq!(feed.len(), 2);
//! assert_eq!(feed[0].id.value(), 2);
//! ```

pub mod error;
pub mod gate;
pub mod item;
pub mod merge;
pub mod paging;

pub use error::FeedError;
pub use gate::{FetchGate, FetchStatus};
pub use item::{AuthorId, FeedItem, PostId};
pub use merge::{merge, MergeMode};
pub use paging::{has_more, FetchTicket, PageCursor, FIRST_PAGE};
