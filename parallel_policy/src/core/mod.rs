//! Core types shared by workers and the pool.
//!
//! - `actor`: the [`Actor`] contract workers drive, plus identity and
//!   constructor plumbing
//! - `done`: multi-agent episode-termination mapping
//! - `spec`: observation/action space descriptors checked for consistency
//!   across the pool

pub mod actor;
pub mod done;
pub mod spec;

pub use actor::{Actor, ActorConstructor, ActorIdentity, StepInfo};
pub use done::DoneMap;
pub use spec::{ActionSpec, ObservationSpec};
