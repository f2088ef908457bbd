//! The worker pool: N actors behind one batched, synchronous-looking API.
//!
//! - `state`: the async/wait state machine guarding the batching protocol
//! - `config`: pool-level tunables (run name, polling period, auto-reset,
//!   close timeout)
//! - `pool`: [`PolicyPool`] itself: spawn, fan-out/fan-in, aggregation,
//!   shutdown

pub mod config;
pub mod pool;
pub mod state;


pub use config::PoolConfig;
pub use pool::{PolicyPool, Seeds, StepBatch};
pub use state::PoolState;
