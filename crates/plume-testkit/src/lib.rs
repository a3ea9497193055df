//! Plume Testkit
//!
//! Test utilities for exercising the feed engine without a real backend:
//!
//! - [`MockFeedApi`]: scripted [`FeedApiEffects`] implementation with
//!   failure injection, call recording, and manual response gating for
//!   interleaving tests
//! - [`factories`]: compact builders for items and pages
//!
//! [`FeedApiEffects`]: plume_client::FeedApiEffects

pub mod factories;
pub mod mock;

pub use factories::{item, page_items, paged};
pub use mock::MockFeedApi;
