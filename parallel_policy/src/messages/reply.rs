//! Replies sent from a worker back to the pool.

use crate::core::actor::StepInfo;
use crate::core::done::DoneMap;
use crate::core::spec::{ActionSpec, ObservationSpec};

/// Payload of a successful step command.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReply<O, I> {
    /// Observation after the step, or after the transparent reset when
    /// this step ended the episode and auto-reset is enabled.
    pub observation: O,
    /// Reward earned by the step.
    pub reward: f32,
    /// Episode-termination flags as reported by the actor.
    pub dones: DoneMap,
    /// Actor metadata plus the preserved terminal observation.
    pub info: StepInfo<O, I>,
}

/// A successful reply to one command. Failure replies travel as
/// `Err(ErrorKind)` on the same channel, with the message detail in the
/// shared error channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<O, I> {
    /// Initial construction acknowledgement, sent once per worker before
    /// the command loop starts.
    Ready,
    /// Fresh-episode observation (reply to `Reset`).
    Observation(O),
    /// Step outcome (reply to `Step`).
    Step(StepReply<O, I>),
    /// Seed actually applied by the actor (reply to `Seed`).
    Seed(u64),
    /// Space descriptors (reply to `GetSpecs`).
    Specs {
        observation: ObservationSpec,
        action: ActionSpec,
    },
    /// Shutdown acknowledgement (reply to `Close`).
    Closed,
}

impl<O, I> Reply<O, I> {
    /// Short label used in logs and protocol errors.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Observation(_) => "reset",
            Self::Step(_) => "step",
            Self::Seed(_) => "seed",
            Self::Specs { .. } => "specs",
            Self::Closed => "closed",
        }
    }
}
