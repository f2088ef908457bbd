//! Worker threads: one actor per thread, one command loop per actor.
//!
//! Handles are owned exclusively by the pool; nothing in this module is
//! part of the public API.

mod worker;

pub(crate) use worker::{spawn, WorkerContext, WorkerHandle, WorkerReply};
