//! Failure injection: what batch aggregation looks like when actors
//! misbehave.
//!
//! Three workers run side by side: a healthy one, one whose actor errors
//! after a few steps, and one that stalls long enough to trip the batch
//! timeout. The demo drives them and prints the aggregated errors the
//! pool hands back.

use std::time::Duration;

use parallel_policy::{
    Actor, ActorConstructor, ActorError, ActorIdentity, ActionSpec, DoneMap, ObservationSpec,
    PolicyPool, PoolConfig, PoolError,
};

enum Fault {
    None,
    FailOnStep(u32),
    StallOnStep(u32, Duration),
}

struct FaultyActor {
    identity: ActorIdentity,
    fault: Fault,
    steps: u32,
}

impl Actor for FaultyActor {
    type Obs = u32;
    type Action = ();
    type Info = ();

    fn reset(&mut self) -> Result<u32, ActorError> {
        self.steps = 0;
        Ok(0)
    }

    fn step(&mut self, _action: ()) -> Result<(u32, f32, DoneMap, ()), ActorError> {
        self.steps += 1;
        match &self.fault {
            Fault::FailOnStep(at) if self.steps == *at => Err(ActorError::msg(format!(
                "{}: simulator backend dropped the connection",
                self.identity
            ))),
            Fault::StallOnStep(at, pause) if self.steps == *at => {
                std::thread::sleep(*pause);
                Ok((self.steps, 0.0, DoneMap::single(false), ()))
            }
            _ => Ok((self.steps, 1.0, DoneMap::single(false), ())),
        }
    }

    fn seed(&mut self, seed: u64) -> Result<u64, ActorError> {
        Ok(seed)
    }

    fn observation_spec(&self) -> ObservationSpec {
        ObservationSpec::flat(1)
    }

    fn action_spec(&self) -> ActionSpec {
        ActionSpec::Discrete { n: 1 }
    }
}

fn faulty(name: &str, fault: Fault) -> (String, ActorConstructor<FaultyActor>) {
    (
        name.to_string(),
        Box::new(move |identity| {
            Ok(FaultyActor {
                identity,
                fault,
                steps: 0,
            })
        }),
    )
}

pub fn run() {
    let constructors = vec![
        faulty("healthy", Fault::None),
        faulty("flaky", Fault::FailOnStep(3)),
        faulty("sluggish", Fault::StallOnStep(5, Duration::from_secs(2))),
    ];
    let config = PoolConfig::default().with_close_timeout(Duration::from_secs(10));
    let mut pool: PolicyPool<FaultyActor> = match PolicyPool::new(constructors, config) {
        Ok(pool) => pool,
        Err(err) => {
            log::error!("pool construction failed: {}", err);
            return;
        }
    };

    pool.reset(None).expect("reset batch");
    let timeout = Some(Duration::from_millis(500));

    for step in 1..=6 {
        match pool.step(vec![(), (), ()], timeout) {
            Ok(batch) => {
                log::info!("step {}: rewards {:?}", step, batch.rewards);
            }
            Err(PoolError::Workers(failed)) => {
                log::warn!(
                    "step {}: batch discarded, workers {:?} failed: {}",
                    step,
                    failed.worker_indices(),
                    failed
                );
            }
            Err(PoolError::Timeout { operation, timeout }) => {
                log::warn!(
                    "step {}: `{}` exceeded {:?}; results dropped for the whole batch",
                    step,
                    operation,
                    timeout
                );
                // Let the stalled worker drain before the next round.
                std::thread::sleep(Duration::from_millis(2200));
            }
            Err(err) => {
                log::error!("step {}: unrecoverable: {}", step, err);
                break;
            }
        }
    }

    pool.close();
    log::info!("pool closed");
}
