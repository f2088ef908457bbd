//! Game-of-tag arenas stepped in parallel.
//!
//! Each actor hosts one arena with two sub-agents, a predator and a prey,
//! on a one-dimensional track. The caller's action steers the predator;
//! the prey flees with seeded randomness. An episode ends when the
//! predator catches the prey or the step limit runs out, at which point
//! the pool's auto-reset starts the next episode transparently.

use std::time::Duration;

use parallel_policy::{
    Actor, ActorConstructor, ActorError, ActorIdentity, ActionSpec, DoneMap, ObservationSpec,
    PolicyPool, PoolConfig, Seeds,
};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

const TRACK_LEN: f32 = 20.0;
const CATCH_RADIUS: f32 = 0.5;
const MAX_EPISODE_STEPS: u32 = 200;

struct TagArena {
    identity: ActorIdentity,
    rng: Xoshiro256StarStar,
    predator: f32,
    prey: f32,
    steps: u32,
}

impl TagArena {
    fn new(identity: ActorIdentity) -> Self {
        let seed = identity.index as u64;
        Self {
            identity,
            rng: Xoshiro256StarStar::seed_from_u64(seed),
            predator: 0.0,
            prey: 0.0,
            steps: 0,
        }
    }

    fn observe(&self) -> Vec<f32> {
        vec![self.predator, self.prey, (self.prey - self.predator).abs()]
    }

    fn caught(&self) -> bool {
        (self.prey - self.predator).abs() <= CATCH_RADIUS
    }
}

impl Actor for TagArena {
    type Obs = Vec<f32>;
    type Action = f32;
    type Info = u32;

    fn reset(&mut self) -> Result<Vec<f32>, ActorError> {
        self.predator = self.rng.gen_range(0.0..TRACK_LEN * 0.25);
        self.prey = self.rng.gen_range(TRACK_LEN * 0.75..TRACK_LEN);
        self.steps = 0;
        Ok(self.observe())
    }

    fn step(&mut self, action: f32) -> Result<(Vec<f32>, f32, DoneMap, u32), ActorError> {
        if !action.is_finite() {
            return Err(ActorError::msg(format!(
                "{}: non-finite action",
                self.identity
            )));
        }
        self.steps += 1;

        self.predator = (self.predator + action.clamp(-1.0, 1.0)).clamp(0.0, TRACK_LEN);
        // The prey drifts away from the predator with some jitter.
        let flee = if self.prey >= self.predator { 0.6 } else { -0.6 };
        let jitter = self.rng.gen_range(-0.3..0.3);
        self.prey = (self.prey + flee + jitter).clamp(0.0, TRACK_LEN);

        let caught = self.caught();
        let out_of_time = self.steps >= MAX_EPISODE_STEPS;
        let reward = if caught {
            10.0
        } else {
            -0.01 * (self.prey - self.predator).abs()
        };

        let dones = DoneMap::new()
            .with_agent("predator", caught)
            .with_agent("prey", caught)
            .with_all(caught || out_of_time);

        Ok((self.observe(), reward, dones, self.steps))
    }

    fn seed(&mut self, seed: u64) -> Result<u64, ActorError> {
        self.rng = Xoshiro256StarStar::seed_from_u64(seed);
        Ok(seed)
    }

    fn observation_spec(&self) -> ObservationSpec {
        ObservationSpec::flat(3)
    }

    fn action_spec(&self) -> ActionSpec {
        ActionSpec::Continuous { dim: 1 }
    }

    fn close(&mut self) {
        log::debug!("{}: arena closed after {} steps", self.identity, self.steps);
    }
}

fn arena(index: usize) -> (String, ActorConstructor<TagArena>) {
    (
        format!("arena_{}", index),
        Box::new(|identity| Ok(TagArena::new(identity))),
    )
}

pub fn run() {
    const N_ARENAS: usize = 4;
    const N_STEPS: usize = 1000;

    let config = PoolConfig::default().with_run_name("tag");
    let constructors = (0..N_ARENAS).map(arena).collect();
    let mut pool: PolicyPool<TagArena> = match PolicyPool::new(constructors, config) {
        Ok(pool) => pool,
        Err(err) => {
            log::error!("pool construction failed: {}", err);
            return;
        }
    };

    let (obs_spec, act_spec) = pool.specs().expect("consistent specs");
    log::info!(
        "running {} arenas for {} batched steps ({}, {})",
        pool.len(),
        N_STEPS,
        obs_spec,
        act_spec
    );

    let seeds: Vec<u64> = (0..N_ARENAS as u64).map(|i| 1000 + i).collect();
    pool.seed(Seeds::PerWorker(seeds), None).expect("seed batch");
    pool.reset(None).expect("reset batch");

    // The driving policy is a random controller; the point here is the
    // batching machinery, not the control quality.
    let mut rng = Xoshiro256StarStar::seed_from_u64(0);
    let timeout = Some(Duration::from_secs(10));
    let mut episodes = 0usize;
    let mut total_reward = 0.0f32;

    for step in 1..=N_STEPS {
        let actions: Vec<f32> = (0..N_ARENAS).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let batch = match pool.step(actions, timeout) {
            Ok(batch) => batch,
            Err(err) => {
                log::error!("step batch failed: {}", err);
                break;
            }
        };

        total_reward += batch.rewards.iter().sum::<f32>();
        episodes += batch
            .dones
            .iter()
            .filter(|dones| dones.episode_over())
            .count();

        if step % 200 == 0 {
            log::info!(
                "step {:>4} | episodes finished: {:>3} | total reward: {:>9.2}",
                step,
                episodes,
                total_reward
            );
        }
    }

    log::info!(
        "done: {} episodes across {} arenas, total reward {:.2}",
        episodes,
        N_ARENAS,
        total_reward
    );
    pool.close();
}
