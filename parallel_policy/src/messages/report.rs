//! Error reports flowing from workers to the pool.
//!
//! Reports are append-only: a worker pushes one per failure and never
//! retracts it. The pool drains all pending reports before deciding
//! success or failure of a batch, so no failure can be lost between
//! batches.

use std::fmt;

/// Classification of a worker-side failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The actor constructor failed; the worker never became ready.
    Construction,
    /// The actor raised (or panicked) inside reset/step/seed.
    Actor,
    /// The worker observed a protocol-level inconsistency.
    Protocol,
    /// The worker observed the pool-wide interrupt flag.
    Interrupt,
}

impl ErrorKind {
    /// Whether this failure poisons the whole pool rather than just the
    /// batch that triggered it.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Construction | Self::Interrupt)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Construction => "construction",
            Self::Actor => "actor",
            Self::Protocol => "protocol",
            Self::Interrupt => "interrupt",
        };
        f.write_str(name)
    }
}

/// One worker-side failure: who, what kind, and the detail message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    /// Index of the reporting worker.
    pub worker: usize,
    /// Failure classification.
    pub kind: ErrorKind,
    /// Human-readable detail (actor error text or panic payload).
    pub message: String,
}

impl ErrorReport {
    /// Build a report.
    pub fn new(worker: usize, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            worker,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker {} ({}): {}", self.worker, self.kind, self.message)
    }
}
