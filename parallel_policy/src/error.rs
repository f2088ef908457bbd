//! Error types for the pool and its actors.
//!
//! The taxonomy separates caller bugs (`Protocol`), bad wiring
//! (`Configuration`), per-worker failures aggregated at batch boundaries
//! (`Workers`), and the recoverable/fatal lifecycle errors (`Timeout`,
//! `Interrupted`, `Closed`). Workers never fail silently: every failure
//! path produces both an [`ErrorReport`](crate::messages::ErrorReport) and
//! a failure-flagged reply, so a batch either succeeds for every worker or
//! fails with enough detail to name each offender.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::messages::ErrorReport;

/// Error raised by an [`Actor`](crate::core::actor::Actor) implementation
/// during `reset`, `step`, or `seed`.
///
/// Actors are external collaborators; this type lets them surface either a
/// plain message or an underlying error value.
#[derive(Error, Debug)]
pub enum ActorError {
    /// Free-form failure message.
    #[error("{0}")]
    Message(String),

    /// Wrapped source error from the actor's own stack.
    #[error("{0}")]
    Source(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ActorError {
    /// Build an [`ActorError::Message`] from anything displayable.
    pub fn msg(message: impl fmt::Display) -> Self {
        Self::Message(message.to_string())
    }
}

/// Per-worker failures collected for one batch, ordered by worker index.
#[derive(Debug)]
pub struct FailedWorkers(pub Vec<ErrorReport>);

impl FailedWorkers {
    /// Worker indices named by this failure set.
    pub fn worker_indices(&self) -> Vec<usize> {
        self.0.iter().map(|report| report.worker).collect()
    }
}

impl fmt::Display for FailedWorkers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, report) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", report)?;
        }
        Ok(())
    }
}

/// Errors surfaced by [`PolicyPool`](crate::pool::pool::PolicyPool).
#[derive(Error, Debug)]
pub enum PoolError {
    /// Invalid constructor mapping, pool config, or cross-worker spec
    /// mismatch. Fatal; the pool cannot be used.
    #[error("invalid pool configuration: {0}")]
    Configuration(String),

    /// Async/wait contract violation: `wait` without a matching `async`,
    /// `async` while a batch is already pending, or a reply that does not
    /// match the pending operation. Indicates a caller bug.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// The batch did not complete within the caller's deadline. The pending
    /// state is cleared; no partial results were applied.
    #[error("`{operation}` timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    /// One or more workers failed during the batch. The whole batch is
    /// discarded; the report list names every failing worker.
    #[error("batch failed: {0}")]
    Workers(FailedWorkers),

    /// The pool was interrupted. Close and rebuild it; no further batches
    /// will be accepted.
    #[error("pool interrupted; close and rebuild it")]
    Interrupted,

    /// The pool has been closed.
    #[error("pool is closed")]
    Closed,
}

impl PoolError {
    pub(crate) fn protocol(operation: &str, state: impl fmt::Display) -> Self {
        Self::Protocol(format!("`{}` called while the pool is {}", operation, state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::ErrorKind;

    #[test]
    fn test_actor_error_message() {
        let err = ActorError::msg("sensor offline");
        assert_eq!(err.to_string(), "sensor offline");
    }

    #[test]
    fn test_actor_error_from_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "pipe burst");
        let err: ActorError = (Box::new(io) as Box<dyn std::error::Error + Send + Sync>).into();
        assert_eq!(err.to_string(), "pipe burst");
    }

    #[test]
    fn test_failed_workers_display_lists_each_worker() {
        let failures = FailedWorkers(vec![
            ErrorReport::new(0, ErrorKind::Actor, "step exploded"),
            ErrorReport::new(2, ErrorKind::Interrupt, "operator cancel"),
        ]);
        let text = failures.to_string();
        assert!(text.contains("worker 0"));
        assert!(text.contains("step exploded"));
        assert!(text.contains("worker 2"));
        assert_eq!(failures.worker_indices(), vec![0, 2]);
    }

    #[test]
    fn test_timeout_display_names_operation() {
        let err = PoolError::Timeout {
            operation: "step_wait",
            timeout: Duration::from_millis(250),
        };
        assert!(err.to_string().contains("step_wait"));
    }
}
