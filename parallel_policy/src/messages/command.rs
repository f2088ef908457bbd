//! Commands sent from the pool to a worker.

/// A command for one worker. At most one is in flight per worker at a
/// time; `Close` is the only command that may queue behind another.
#[derive(Debug, Clone, PartialEq)]
pub enum Command<Act> {
    /// Start a fresh episode.
    Reset,
    /// Advance the episode with this action.
    Step(Act),
    /// Reseed the actor's randomness.
    Seed(u64),
    /// Report the actor's observation/action specs.
    GetSpecs,
    /// Acknowledge and terminate the worker.
    Close,
}

impl<Act> Command<Act> {
    /// Short label used in logs and protocol errors.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::Step(_) => "step",
            Self::Seed(_) => "seed",
            Self::GetSpecs => "get_specs",
            Self::Close => "close",
        }
    }
}
