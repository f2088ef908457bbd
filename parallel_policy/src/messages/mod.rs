//! Message-passing protocol between the pool and its workers.
//!
//! Each worker talks to the pool over a dedicated pair of bounded channels:
//!
//! ```text
//!            Command (one in flight)
//!    Pool  ───────────────────────────▶  Worker
//!          ◀───────────────────────────
//!            Result<Reply, ErrorKind>
//!
//!    Worker ──ErrorReport──▶ shared error channel ──drain──▶ Pool
//! ```
//!
//! Every command produces exactly one reply. Failure replies carry only the
//! [`ErrorKind`]; the human-readable detail travels through the shared
//! error channel as an [`ErrorReport`] and is drained by the pool at batch
//! boundaries.

mod command;
mod report;
mod reply;

#[cfg(test)]
mod tests;

pub use command::Command;
pub use report::{ErrorKind, ErrorReport};
pub use reply::{Reply, StepReply};
