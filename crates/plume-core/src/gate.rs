//! Single-flight fetch gate.

use serde::{Deserialize, Serialize};

/// Whether a page fetch is currently outstanding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FetchStatus {
    /// No fetch in flight
    #[default]
    Idle,
    /// Exactly one fetch in flight
    Fetching,
}

impl FetchStatus {
    /// Whether a fetch is in flight.
    #[must_use]
    pub fn is_fetching(&self) -> bool {
        matches!(self, Self::Fetching)
    }
}

/// Enforces at most one outstanding page request.
///
/// State machine: `Idle --try_enter(granted)--> Fetching --leave()--> Idle`.
/// `try_enter` while `Fetching` is a no-op returning `false`; this is the
/// single-flight guarantee that stops duplicate scroll triggers from
/// issuing duplicate page requests. `leave` is unconditional and must be
/// called on both the success and the failure path, so the store can never
/// be left in `Fetching` forever.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FetchGate {
    status: FetchStatus,
}

impl FetchGate {
    /// Create a gate in the `Idle` state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> FetchStatus {
        self.status
    }

    /// Try to begin a fetch. Returns `false` (no side effect) if one is
    /// already in flight.
    pub fn try_enter(&mut self) -> bool {
        if self.status.is_fetching() {
            return false;
        }
        self.status = FetchStatus::Fetching;
        true
    }

    /// End the in-flight fetch. Unconditional.
    pub fn leave(&mut self) {
        self.status = FetchStatus::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_then_leave() {
        let mut gate = FetchGate::new();
        assert_eq!(gate.status(), FetchStatus::Idle);
        assert!(gate.try_enter());
        assert_eq!(gate.status(), FetchStatus::Fetching);
        gate.leave();
        assert_eq!(gate.status(), FetchStatus::Idle);
    }

    #[test]
    fn test_second_enter_rejected() {
        let mut gate = FetchGate::new();
        assert!(gate.try_enter());
        assert!(!gate.try_enter());
        assert!(!gate.try_enter());
        assert_eq!(gate.status(), FetchStatus::Fetching);
    }

    #[test]
    fn test_leave_is_unconditional() {
        let mut gate = FetchGate::new();
        gate.leave();
        assert_eq!(gate.status(), FetchStatus::Idle);
        assert!(gate.try_enter());
    }
}
