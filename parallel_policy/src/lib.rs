//! # Parallel Policy: batched simulation actors behind one synchronous API
//!
//! Batches several independent policy+environment actors and steps them
//! concurrently, each isolated in its own worker thread so that a slow or
//! crashing actor cannot corrupt or stall its siblings, and so CPU-bound
//! simulation work escapes a single-threaded bottleneck.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         PolicyPool                           │
//! │   reset_async / step_async / seed_async   (fan-out)          │
//! │   reset_wait  / step_wait  / seed_wait    (fan-in)           │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Thread 0          Thread 1          Thread N-1              │
//! │  ┌────────┐        ┌────────┐        ┌────────┐              │
//! │  │Worker 0│        │Worker 1│        │Worker  │              │
//! │  │ Actor  │        │ Actor  │        │ Actor  │              │
//! │  └───┬────┘        └───┬────┘        └───┬────┘              │
//! │      │ cmd/reply       │ cmd/reply       │ cmd/reply         │
//! │      │ channels        │ channels        │ channels          │
//! │      └────────────┬────┴─────────────────┘                   │
//! │                   ▼                                          │
//! │         ┌──────────────────┐                                 │
//! │         │  error channel   │  (many producers, one consumer, │
//! │         │  (ErrorReport)   │   drained at batch boundaries)  │
//! │         └──────────────────┘                                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each worker owns exactly one [`Actor`] and serializes all access to it
//! behind a command loop. The pool fans a command out to every worker, then
//! collects replies in worker-index order, so batch results always line up
//! positionally with the constructor mapping the pool was built from.
//!
//! A batch is atomic: either every worker succeeds and the pool returns the
//! full batch, or the pool fails with an aggregated error naming each
//! failing worker. Partial results are never returned.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use parallel_policy::{Actor, PolicyPool, PoolConfig};
//!
//! let pool = PolicyPool::connect(
//!     vec![
//!         ("predator".to_string(), constructor(..)),
//!         ("prey".to_string(), constructor(..)),
//!     ],
//!     PoolConfig::default(),
//! )?;
//!
//! let observations = pool.reset(None)?;
//! let batch = pool.step(actions, Some(Duration::from_secs(5)))?;
//! pool.close();
//! ```

pub mod core;
pub mod error;
pub mod messages;
pub mod pool;

mod worker;

// Re-export commonly used types
pub use crate::core::actor::{Actor, ActorConstructor, ActorIdentity, StepInfo};
pub use crate::core::done::DoneMap;
pub use crate::core::spec::{ActionSpec, ObservationSpec};

pub use crate::error::{ActorError, FailedWorkers, PoolError};

pub use crate::messages::{Command, ErrorKind, ErrorReport, Reply, StepReply};

pub use crate::pool::config::PoolConfig;
pub use crate::pool::pool::{PolicyPool, Seeds, StepBatch};
pub use crate::pool::state::PoolState;
