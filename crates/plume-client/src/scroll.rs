//! Scroll trigger: sentinel visibility → debounced advance signals.
//!
//! The trigger is a pure state machine over viewport geometry. Frontends
//! feed it [`SentinelSample`]s from whatever observation primitive their
//! toolkit offers; it owes nothing to any particular UI, which is also
//! what makes it immune to the classic re-subscription bug where an
//! observer recreated on every state change fires duplicate or missed
//! triggers.
//!
//! Guard state (`FetchStatus`, `has_more`) is passed in live at signal
//! time, never captured at attach time, so a sample is always judged
//! against the store's current state.

use plume_core::FetchStatus;
use serde::{Deserialize, Serialize};

/// Trigger tuning.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScrollTriggerConfig {
    /// Extra distance in px below the viewport treated as visible, so the
    /// fetch starts before the sentinel actually scrolls into view
    pub lookahead_margin: f64,
    /// Fraction of the sentinel that must overlap the (extended) viewport
    /// to count as intersecting; 0 means any positive overlap
    pub intersection_threshold: f64,
}

impl Default for ScrollTriggerConfig {
    fn default() -> Self {
        Self {
            lookahead_margin: 300.0,
            intersection_threshold: 0.1,
        }
    }
}

/// One geometry observation of the sentinel, in viewport coordinates.
///
/// `sentinel_top` is the sentinel's top edge relative to the viewport top
/// (grows as the list grows, shrinks as the user scrolls down).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SentinelSample {
    /// Sentinel top edge relative to viewport top, px
    pub sentinel_top: f64,
    /// Sentinel height, px (0 for a zero-height marker)
    pub sentinel_height: f64,
    /// Viewport height, px
    pub viewport_height: f64,
}

/// Emitted when the next page should be fetched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Advance;

/// Debounced sentinel-visibility trigger.
///
/// Fires at most once per not-fetching-and-has-more window: a signal
/// disarms the trigger, [`ScrollTrigger::fetch_settled`] re-arms it, and
/// even then a fresh rising intersection edge is required — a stationary
/// sentinel that stayed visible through a fetch does not re-fire on its
/// own. The first sample after [`ScrollTrigger::attach`] only primes edge
/// state, so re-attachment cannot emit spuriously.
#[derive(Clone, Copy, Debug)]
pub struct ScrollTrigger {
    config: ScrollTriggerConfig,
    attached: bool,
    armed: bool,
    last_intersecting: Option<bool>,
}

impl ScrollTrigger {
    /// Create a detached trigger.
    #[must_use]
    pub fn new(config: ScrollTriggerConfig) -> Self {
        Self {
            config,
            attached: false,
            armed: true,
            last_intersecting: None,
        }
    }

    /// Whether the trigger is attached to a mounted sentinel.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Attach to a (newly) mounted sentinel. Resets edge state; the next
    /// sample primes it without firing.
    pub fn attach(&mut self) {
        self.attached = true;
        self.armed = true;
        self.last_intersecting = None;
    }

    /// Detach (sentinel unmounted or feed exhausted).
    pub fn detach(&mut self) {
        self.attached = false;
        self.last_intersecting = None;
    }

    /// Re-arm after the triggered fetch has settled (success or failure).
    pub fn fetch_settled(&mut self) {
        self.armed = true;
    }

    /// Judge one geometry sample against live store state.
    ///
    /// Emits [`Advance`] only on a rising intersection edge while armed,
    /// idle, and `has_more`. Detaches itself when `has_more` goes false.
    pub fn observe(
        &mut self,
        sample: SentinelSample,
        status: FetchStatus,
        has_more: bool,
    ) -> Option<Advance> {
        if !self.attached {
            return None;
        }
        if !has_more {
            self.detach();
            return None;
        }

        let now = self.is_intersecting(sample);
        let was = self.last_intersecting.replace(now);

        // Rising edge only; the priming sample (was == None) never fires.
        if was != Some(false) || !now {
            return None;
        }
        if !self.armed || status.is_fetching() {
            return None;
        }

        self.armed = false;
        Some(Advance)
    }

    /// Intersection test against the margin-extended viewport
    /// `[0, viewport_height + lookahead_margin]`.
    fn is_intersecting(&self, sample: SentinelSample) -> bool {
        let extended_bottom = sample.viewport_height + self.config.lookahead_margin;
        let top = sample.sentinel_top.max(0.0);
        let bottom = (sample.sentinel_top + sample.sentinel_height).min(extended_bottom);

        if sample.sentinel_height <= 0.0 {
            // Zero-height marker: visible iff its edge is inside the band.
            return sample.sentinel_top >= 0.0 && sample.sentinel_top <= extended_bottom;
        }

        let overlap = bottom - top;
        if overlap <= 0.0 {
            return false;
        }
        if self.config.intersection_threshold <= 0.0 {
            return true;
        }
        overlap / sample.sentinel_height >= self.config.intersection_threshold
    }
}

impl Default for ScrollTrigger {
    fn default() -> Self {
        Self::new(ScrollTriggerConfig::default())
    }
}
