//! The async/wait batching state machine.
//!
//! Every batched operation is an async/wait pair: `*_async` fans the
//! command out and moves `Idle` to the matching `Awaiting*` state; `*_wait`
//! requires that exact state and moves back to `Idle` whether the batch
//! succeeded, failed, or timed out. Calling `wait` without its `async`, or
//! `async` while a batch is pending, is a caller bug surfaced as a
//! protocol-violation error, never silently ignored.

use std::fmt;

/// Lifecycle state of a [`PolicyPool`](crate::pool::pool::PolicyPool).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolState {
    /// No batch pending; async calls are accepted.
    Idle,
    /// A reset batch is in flight; only `reset_wait` may run.
    AwaitingReset,
    /// A step batch is in flight; only `step_wait` may run.
    AwaitingStep,
    /// A seed batch is in flight; only `seed_wait` may run.
    AwaitingSeed,
    /// The pool has been closed; every operation fails.
    Closed,
}

impl PoolState {
    /// Whether async calls are currently accepted.
    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Whether a batch is in flight.
    #[inline]
    pub fn is_awaiting(&self) -> bool {
        matches!(
            self,
            Self::AwaitingReset | Self::AwaitingStep | Self::AwaitingSeed
        )
    }

    /// Whether the pool has been closed.
    #[inline]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl Default for PoolState {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::AwaitingReset => "awaiting reset",
            Self::AwaitingStep => "awaiting step",
            Self::AwaitingSeed => "awaiting seed",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        let test_cases = [
            (PoolState::Idle, true, false, false),
            (PoolState::AwaitingReset, false, true, false),
            (PoolState::AwaitingStep, false, true, false),
            (PoolState::AwaitingSeed, false, true, false),
            (PoolState::Closed, false, false, true),
        ];

        for (state, idle, awaiting, closed) in test_cases {
            assert_eq!(state.is_idle(), idle, "{}", state);
            assert_eq!(state.is_awaiting(), awaiting, "{}", state);
            assert_eq!(state.is_closed(), closed, "{}", state);
        }
    }

    #[test]
    fn test_default_is_idle() {
        assert_eq!(PoolState::default(), PoolState::Idle);
    }

    #[test]
    fn test_display() {
        assert_eq!(PoolState::AwaitingStep.to_string(), "awaiting step");
    }
}
