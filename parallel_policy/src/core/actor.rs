//! The actor contract driven by workers.
//!
//! An actor is a policy+environment unit: it owns its own simulation state
//! and exposes the episode lifecycle the pool batches across workers. The
//! pool never touches an actor directly: construction happens lazily
//! inside the worker thread, and all access is serialized behind that
//! worker's command loop.

use std::fmt;

use crate::core::done::DoneMap;
use crate::core::spec::{ActionSpec, ObservationSpec};
use crate::error::ActorError;

/// Identity assigned to an actor at construction.
///
/// The name is derived from the worker index and the pool's optional run
/// name, so concurrent pools can tell their actors apart in logs and
/// simulation backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorIdentity {
    /// Worker index within the pool (also the position of this actor's
    /// results in every batch).
    pub index: usize,
    /// Unique actor name, e.g. `"tag_policy_0"`.
    pub name: String,
}

impl fmt::Display for ActorIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.index)
    }
}

/// Constructor invoked inside the worker thread to build its actor.
///
/// Runs exactly once per worker; a returned error fails the whole pool
/// construction.
pub type ActorConstructor<A> =
    Box<dyn FnOnce(ActorIdentity) -> Result<A, ActorError> + Send + 'static>;

/// A single simulation+policy unit owned by one worker.
///
/// `step` reports episode termination through a [`DoneMap`]; when the map
/// says the episode fully ended and auto-reset is enabled, the worker
/// resets the actor transparently and the true terminal observation is
/// preserved in [`StepInfo::terminal_observation`].
pub trait Actor: Send + 'static {
    /// Observation produced by `reset` and `step`.
    type Obs: Send + 'static;
    /// Action consumed by `step`.
    type Action: Send + 'static;
    /// Actor-specific step metadata, forwarded untouched inside
    /// [`StepInfo`].
    type Info: Send + 'static;

    /// Start a fresh episode and return its initial observation.
    fn reset(&mut self) -> Result<Self::Obs, ActorError>;

    /// Advance the episode by one step.
    fn step(
        &mut self,
        action: Self::Action,
    ) -> Result<(Self::Obs, f32, DoneMap, Self::Info), ActorError>;

    /// Seed the actor's randomness. The returned value is the seed that was
    /// actually applied; an actor may coerce an unusable seed.
    fn seed(&mut self, seed: u64) -> Result<u64, ActorError>;

    /// Observation space descriptor. Must be constant for the actor's
    /// lifetime and identical across all actors in one pool.
    fn observation_spec(&self) -> ObservationSpec;

    /// Action space descriptor. Same constraints as `observation_spec`.
    fn action_spec(&self) -> ActionSpec;

    /// Release simulation resources. Invoked on every worker exit path,
    /// success or failure.
    fn close(&mut self) {}
}

/// Step metadata returned to the caller alongside each observation.
///
/// `terminal_observation` is populated only when the worker auto-reset the
/// episode on this step: the observation in the reply then belongs to the
/// fresh episode, and the field carries the actual final state so value
/// bootstrapping can use the real terminal observation instead of the
/// reset one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepInfo<O, I> {
    /// Final observation of the episode that just ended, if this step
    /// triggered an auto-reset.
    pub terminal_observation: Option<O>,
    /// The actor's own step metadata.
    pub detail: I,
}

impl<O, I> StepInfo<O, I> {
    /// Wrap actor metadata with no terminal observation attached.
    pub fn new(detail: I) -> Self {
        Self {
            terminal_observation: None,
            detail,
        }
    }

    /// Whether this step ended an episode that was auto-reset.
    pub fn episode_ended(&self) -> bool {
        self.terminal_observation.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_display() {
        let identity = ActorIdentity {
            index: 3,
            name: "run_policy_3".to_string(),
        };
        assert_eq!(identity.to_string(), "run_policy_3#3");
    }

    #[test]
    fn test_step_info_episode_ended() {
        let mut info: StepInfo<Vec<f32>, ()> = StepInfo::new(());
        assert!(!info.episode_ended());
        info.terminal_observation = Some(vec![1.0, 2.0]);
        assert!(info.episode_ended());
    }
}
