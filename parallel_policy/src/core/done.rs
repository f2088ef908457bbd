//! Multi-agent episode-termination mapping.
//!
//! A single actor can host several sub-agents (e.g. a predator and a prey
//! sharing one arena). Termination is therefore a mapping from sub-agent id
//! to a done flag, plus one distinguished all-done flag that marks the
//! whole episode as over regardless of the per-agent entries. The worker's
//! auto-reset fires only when [`DoneMap::episode_over`] holds.

use std::collections::BTreeMap;

/// Per-sub-agent done flags plus the distinguished all-done flag.
///
/// Iteration order over sub-agents is the sorted id order, so displays and
/// tests are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoneMap {
    agents: BTreeMap<String, bool>,
    all: bool,
}

impl DoneMap {
    /// Empty map: no sub-agents, episode running.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map for a single-agent actor: one implicit agent whose done flag is
    /// also the all-done flag.
    pub fn single(done: bool) -> Self {
        Self {
            agents: BTreeMap::new(),
            all: done,
        }
    }

    /// Set one sub-agent's done flag.
    pub fn set(&mut self, agent: impl Into<String>, done: bool) {
        self.agents.insert(agent.into(), done);
    }

    /// Builder-style variant of [`set`](Self::set).
    pub fn with_agent(mut self, agent: impl Into<String>, done: bool) -> Self {
        self.set(agent, done);
        self
    }

    /// Raise or clear the distinguished all-done flag.
    pub fn set_all(&mut self, all: bool) {
        self.all = all;
    }

    /// Builder-style variant of [`set_all`](Self::set_all).
    pub fn with_all(mut self, all: bool) -> Self {
        self.set_all(all);
        self
    }

    /// The distinguished all-done flag.
    #[inline]
    pub fn all(&self) -> bool {
        self.all
    }

    /// One sub-agent's done flag, if it has an entry.
    pub fn get(&self, agent: &str) -> Option<bool> {
        self.agents.get(agent).copied()
    }

    /// Number of sub-agent entries.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether there are no sub-agent entries.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Iterate sub-agent entries in sorted id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.agents.iter().map(|(id, done)| (id.as_str(), *done))
    }

    /// Whether any sub-agent has finished.
    pub fn any(&self) -> bool {
        self.all || self.agents.values().any(|done| *done)
    }

    /// Whether the episode fully ended: the all-done flag is set, or every
    /// listed sub-agent is done. An empty map without the flag is a running
    /// episode.
    #[inline]
    pub fn episode_over(&self) -> bool {
        self.all || (!self.agents.is_empty() && self.agents.values().all(|done| *done))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_agent() {
        assert!(!DoneMap::single(false).episode_over());
        assert!(DoneMap::single(true).episode_over());
    }

    #[test]
    fn test_empty_map_is_running() {
        let dones = DoneMap::new();
        assert!(!dones.any());
        assert!(!dones.episode_over());
    }

    #[test]
    fn test_all_flag_overrides_agents() {
        let dones = DoneMap::new()
            .with_agent("predator", false)
            .with_agent("prey", false)
            .with_all(true);
        assert!(dones.episode_over());
    }

    #[test]
    fn test_episode_over_requires_every_agent() {
        let test_cases = [
            (false, false, false),
            (true, false, false),
            (false, true, false),
            (true, true, true),
        ];

        for (predator, prey, over) in test_cases {
            let dones = DoneMap::new()
                .with_agent("predator", predator)
                .with_agent("prey", prey);
            assert_eq!(
                dones.episode_over(),
                over,
                "predator={}, prey={}",
                predator,
                prey
            );
        }
    }

    #[test]
    fn test_any_vs_episode_over() {
        let dones = DoneMap::new()
            .with_agent("predator", true)
            .with_agent("prey", false);
        assert!(dones.any());
        assert!(!dones.episode_over());
    }

    #[test]
    fn test_iteration_is_sorted() {
        let dones = DoneMap::new()
            .with_agent("prey", true)
            .with_agent("predator", false);
        let ids: Vec<&str> = dones.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["predator", "prey"]);
    }
}
