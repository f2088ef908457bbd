//! `PolicyPool`: N isolated workers behind one batched API.
//!
//! Construction spawns one named worker thread per `(name, constructor)`
//! entry and blocks until every worker acknowledges readiness: a pool
//! either comes up whole or not at all. Each batched operation is a
//! fan-out (`*_async`, non-blocking) followed by a fan-in (`*_wait`,
//! bounded by the caller's timeout); replies are collected in worker-index
//! order, so batch results line up positionally with the constructor
//! mapping regardless of completion order.
//!
//! Failure aggregation is all-or-nothing: if any worker fails a batch, the
//! pool drains the shared error channel and fails the whole batch with a
//! report per offending worker. Partial results are never handed out.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError};

use crate::core::actor::{Actor, ActorConstructor, ActorIdentity, StepInfo};
use crate::core::done::DoneMap;
use crate::core::spec::{ActionSpec, ObservationSpec};
use crate::error::{FailedWorkers, PoolError};
use crate::messages::{Command, ErrorKind, ErrorReport, Reply};
use crate::pool::config::PoolConfig;
use crate::pool::state::PoolState;
use crate::worker::{self, WorkerContext, WorkerHandle};

/// One step batch, unzipped into parallel per-worker sequences. Index `i`
/// everywhere corresponds to the pool's worker `i`.
#[derive(Debug)]
pub struct StepBatch<O, I> {
    pub observations: Vec<O>,
    pub rewards: Vec<f32>,
    pub dones: Vec<DoneMap>,
    pub infos: Vec<StepInfo<O, I>>,
}

impl<O, I> StepBatch<O, I> {
    /// Number of workers in the batch.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    fn with_capacity(n: usize) -> Self {
        Self {
            observations: Vec::with_capacity(n),
            rewards: Vec::with_capacity(n),
            dones: Vec::with_capacity(n),
            infos: Vec::with_capacity(n),
        }
    }
}

/// Seed assignment for a seed batch.
#[derive(Debug, Clone)]
pub enum Seeds {
    /// Send the same seed value to every worker.
    Broadcast(u64),
    /// One seed per worker, in worker-index order. Length must equal the
    /// pool size.
    PerWorker(Vec<u64>),
}

/// Batches N policy+environment actors and steps them in parallel, one
/// worker thread per actor.
///
/// See the [crate docs](crate) for the architecture overview and the
/// async/wait protocol.
pub struct PolicyPool<A: Actor> {
    workers: Vec<WorkerHandle<A>>,
    error_rx: Receiver<ErrorReport>,
    interrupt: Arc<AtomicBool>,
    state: PoolState,
    config: PoolConfig,
    specs: Option<(ObservationSpec, ActionSpec)>,
    /// Workers whose command could not be enqueued during the current
    /// fan-out (still busy with a batch that timed out earlier). They get
    /// no reply, so the fan-in fails them instead of waiting.
    undelivered: Vec<usize>,
}

impl<A: Actor> PolicyPool<A> {
    /// Build a pool from an ordered `(name, constructor)` mapping.
    ///
    /// The mapping's order is the positional order of every batch result;
    /// [`worker_names`](Self::worker_names) recovers it afterwards. Each
    /// constructor runs inside its worker thread with an assigned
    /// [`ActorIdentity`]. Construction blocks until every worker reports
    /// ready and fails as a whole, closing the survivors, if any worker
    /// fails.
    pub fn new(
        constructors: Vec<(String, ActorConstructor<A>)>,
        config: PoolConfig,
    ) -> Result<Self, PoolError> {
        config.validate()?;
        if constructors.is_empty() {
            return Err(PoolError::Configuration(
                "constructor mapping is empty".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for (name, _) in &constructors {
            if !seen.insert(name.clone()) {
                return Err(PoolError::Configuration(format!(
                    "duplicate worker name `{}`",
                    name
                )));
            }
        }

        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        if constructors.len() > available {
            log::warn!(
                "simulation may slow down: {} parallel policies requested but only {} \
                 logical cores available",
                constructors.len(),
                available
            );
        }

        let (error_tx, error_rx) = unbounded();
        let interrupt = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(constructors.len());
        for (index, (name, constructor)) in constructors.into_iter().enumerate() {
            // Capacity 2 leaves room for `Close` behind an in-flight
            // command, so shutdown never blocks on a busy worker.
            let (cmd_tx, cmd_rx) = bounded(2);
            let (reply_tx, reply_rx) = bounded(1);

            let ctx = WorkerContext {
                identity: ActorIdentity {
                    index,
                    name: config.actor_name(index),
                },
                constructor,
                cmd_rx,
                reply_tx,
                error_tx: error_tx.clone(),
                interrupt: Arc::clone(&interrupt),
                polling_period: config.polling_period,
                auto_reset: config.auto_reset,
            };

            match worker::spawn(ctx) {
                Ok(thread) => workers.push(WorkerHandle {
                    index,
                    name,
                    cmd_tx,
                    reply_rx,
                    thread: Some(thread),
                }),
                Err(err) => {
                    let mut partial = Self {
                        workers,
                        error_rx,
                        interrupt,
                        state: PoolState::Idle,
                        config,
                        specs: None,
                        undelivered: Vec::new(),
                    };
                    partial.close();
                    return Err(PoolError::Configuration(format!(
                        "failed to spawn worker thread {}: {}",
                        index, err
                    )));
                }
            }
        }
        drop(error_tx);

        let mut pool = Self {
            workers,
            error_rx,
            interrupt,
            state: PoolState::Idle,
            config,
            specs: None,
            undelivered: Vec::new(),
        };

        // Ready barrier: no pool exists until every actor constructed.
        let mut any_failed = false;
        let mut synthesized = Vec::new();
        for handle in &pool.workers {
            match handle.reply_rx.recv() {
                Ok(Ok(Reply::Ready)) => {}
                Ok(Ok(other)) => {
                    any_failed = true;
                    synthesized.push(ErrorReport::new(
                        handle.index,
                        ErrorKind::Protocol,
                        format!("expected ready reply, got {}", other.label()),
                    ));
                }
                Ok(Err(_kind)) => any_failed = true,
                Err(_) => {
                    any_failed = true;
                    synthesized.push(ErrorReport::new(
                        handle.index,
                        ErrorKind::Construction,
                        "worker exited before reporting ready",
                    ));
                }
            }
        }

        let mut reports = pool.drain_reports();
        reports.extend(synthesized);
        reports.sort_by_key(|report| report.worker);
        if any_failed || !reports.is_empty() {
            pool.close();
            return Err(PoolError::Workers(FailedWorkers(reports)));
        }

        Ok(pool)
    }

    /// Number of workers.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Whether the pool has no workers (never true for a constructed pool).
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Current batching state.
    pub fn state(&self) -> PoolState {
        self.state
    }

    /// Pool configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Worker names in positional (construction) order.
    pub fn worker_names(&self) -> Vec<&str> {
        self.workers.iter().map(|w| w.name.as_str()).collect()
    }

    /// Request pool-wide cancellation. Workers observe the flag within one
    /// polling period, report, and terminate; the pool accepts no further
    /// batches and should be closed.
    pub fn interrupt(&self) {
        self.interrupt.store(true, Ordering::Relaxed);
    }

    /// Whether the pool has been interrupted.
    pub fn is_interrupted(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed)
    }

    /// Start a reset batch: every actor begins a fresh episode.
    pub fn reset_async(&mut self) -> Result<(), PoolError> {
        self.ensure_ready("reset_async")?;
        self.discard_stale_replies();
        self.undelivered.clear();
        for handle in &self.workers {
            if handle.cmd_tx.try_send(Command::Reset).is_err() {
                self.undelivered.push(handle.index);
            }
        }
        self.state = PoolState::AwaitingReset;
        Ok(())
    }

    /// Finish a reset batch: one initial observation per worker, in
    /// positional order.
    pub fn reset_wait(&mut self, timeout: Option<Duration>) -> Result<Vec<A::Obs>, PoolError> {
        self.expect_state("reset_wait", PoolState::AwaitingReset)?;
        let replies = self.collect("reset_wait", timeout)?;

        let mut observations = Vec::with_capacity(replies.len());
        for (index, reply) in replies.into_iter().enumerate() {
            match reply {
                Reply::Observation(obs) => observations.push(obs),
                other => return Err(self.mismatched_reply(index, "reset", &other)),
            }
        }
        Ok(observations)
    }

    /// Reset every actor and wait for the batch in one call.
    pub fn reset(&mut self, timeout: Option<Duration>) -> Result<Vec<A::Obs>, PoolError> {
        self.reset_async()?;
        self.reset_wait(timeout)
    }

    /// Start a step batch with one action per worker, in positional order.
    pub fn step_async(&mut self, actions: Vec<A::Action>) -> Result<(), PoolError> {
        self.ensure_ready("step_async")?;
        if actions.len() != self.workers.len() {
            return Err(PoolError::Configuration(format!(
                "expected {} actions (one per worker), got {}",
                self.workers.len(),
                actions.len()
            )));
        }
        self.discard_stale_replies();
        self.undelivered.clear();
        for (handle, action) in self.workers.iter().zip(actions) {
            if handle.cmd_tx.try_send(Command::Step(action)).is_err() {
                self.undelivered.push(handle.index);
            }
        }
        self.state = PoolState::AwaitingStep;
        Ok(())
    }

    /// Finish a step batch, unzipped into parallel per-worker sequences.
    pub fn step_wait(
        &mut self,
        timeout: Option<Duration>,
    ) -> Result<StepBatch<A::Obs, A::Info>, PoolError> {
        self.expect_state("step_wait", PoolState::AwaitingStep)?;
        let replies = self.collect("step_wait", timeout)?;

        let mut batch = StepBatch::with_capacity(replies.len());
        for (index, reply) in replies.into_iter().enumerate() {
            match reply {
                Reply::Step(step) => {
                    batch.observations.push(step.observation);
                    batch.rewards.push(step.reward);
                    batch.dones.push(step.dones);
                    batch.infos.push(step.info);
                }
                other => return Err(self.mismatched_reply(index, "step", &other)),
            }
        }
        Ok(batch)
    }

    /// Step every actor and wait for the batch in one call.
    pub fn step(
        &mut self,
        actions: Vec<A::Action>,
        timeout: Option<Duration>,
    ) -> Result<StepBatch<A::Obs, A::Info>, PoolError> {
        self.step_async(actions)?;
        self.step_wait(timeout)
    }

    /// Start a seed batch.
    pub fn seed_async(&mut self, seeds: Seeds) -> Result<(), PoolError> {
        self.ensure_ready("seed_async")?;
        let per_worker: Vec<u64> = match seeds {
            Seeds::Broadcast(seed) => vec![seed; self.workers.len()],
            Seeds::PerWorker(values) => {
                if values.len() != self.workers.len() {
                    return Err(PoolError::Configuration(format!(
                        "expected {} seeds (one per worker), got {}",
                        self.workers.len(),
                        values.len()
                    )));
                }
                values
            }
        };
        self.discard_stale_replies();
        self.undelivered.clear();
        for (handle, seed) in self.workers.iter().zip(per_worker) {
            if handle.cmd_tx.try_send(Command::Seed(seed)).is_err() {
                self.undelivered.push(handle.index);
            }
        }
        self.state = PoolState::AwaitingSeed;
        Ok(())
    }

    /// Finish a seed batch: the seeds each actor actually applied (an
    /// actor may coerce an unusable value).
    pub fn seed_wait(&mut self, timeout: Option<Duration>) -> Result<Vec<u64>, PoolError> {
        self.expect_state("seed_wait", PoolState::AwaitingSeed)?;
        let replies = self.collect("seed_wait", timeout)?;

        let mut applied = Vec::with_capacity(replies.len());
        for (index, reply) in replies.into_iter().enumerate() {
            match reply {
                Reply::Seed(seed) => applied.push(seed),
                other => return Err(self.mismatched_reply(index, "seed", &other)),
            }
        }
        Ok(applied)
    }

    /// Seed every actor and wait for the batch in one call.
    pub fn seed(
        &mut self,
        seeds: Seeds,
        timeout: Option<Duration>,
    ) -> Result<Vec<u64>, PoolError> {
        self.seed_async(seeds)?;
        self.seed_wait(timeout)
    }

    /// Observation and action specs shared by every actor in the pool.
    ///
    /// The first call fans `GetSpecs` out to all workers and requires the
    /// answers to be pairwise identical; a mismatch is a configuration
    /// error naming the offending workers. Specs are invariant for the
    /// pool's lifetime, so the result is cached and later calls are free.
    pub fn specs(&mut self) -> Result<(ObservationSpec, ActionSpec), PoolError> {
        if let Some((obs, act)) = &self.specs {
            return Ok((obs.clone(), act.clone()));
        }
        self.ensure_ready("specs")?;
        self.discard_stale_replies();
        self.undelivered.clear();
        for handle in &self.workers {
            if handle.cmd_tx.try_send(Command::GetSpecs).is_err() {
                self.undelivered.push(handle.index);
            }
        }
        let replies = self.collect("specs", None)?;

        let mut pairs = Vec::with_capacity(replies.len());
        for (index, reply) in replies.into_iter().enumerate() {
            match reply {
                Reply::Specs {
                    observation,
                    action,
                } => pairs.push((observation, action)),
                other => return Err(self.mismatched_reply(index, "specs", &other)),
            }
        }

        let first = pairs[0].clone();
        let mismatched: Vec<usize> = pairs
            .iter()
            .enumerate()
            .filter(|(_, pair)| **pair != first)
            .map(|(index, _)| index)
            .collect();
        if !mismatched.is_empty() {
            return Err(PoolError::Configuration(format!(
                "actors must share one observation/action spec, but workers {:?} \
                 disagree with worker 0 ({}, {})",
                mismatched, first.0, first.1
            )));
        }

        self.specs = Some(first.clone());
        Ok(first)
    }

    /// Shut the pool down: ask every worker to close, wait boundedly for
    /// acknowledgements, join the threads, and mark the pool closed.
    ///
    /// Idempotent: a second call is a no-op. Unresponsive workers are
    /// detached with a warning after `close_timeout` so close itself can
    /// never hang.
    pub fn close(&mut self) {
        if self.state.is_closed() {
            return;
        }
        self.state = PoolState::Closed;

        for handle in &self.workers {
            let _ = handle.cmd_tx.try_send(Command::Close);
        }

        let deadline = Instant::now() + self.config.close_timeout;
        for handle in &mut self.workers {
            // A reply from an in-flight batch may still be queued ahead of
            // the close acknowledgement; drain until we see it.
            let acknowledged = loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                match handle.reply_rx.recv_timeout(remaining) {
                    Ok(Ok(Reply::Closed)) => break true,
                    Ok(_) => continue,
                    Err(RecvTimeoutError::Disconnected) => break true,
                    Err(RecvTimeoutError::Timeout) => break false,
                }
            };

            if let Some(thread) = handle.thread.take() {
                if acknowledged {
                    if thread.join().is_err() {
                        log::warn!("worker {} panicked; joined with error", handle.index);
                    }
                } else {
                    log::warn!(
                        "worker {} did not acknowledge close within {:?}; detaching its thread",
                        handle.index,
                        self.config.close_timeout
                    );
                }
            }
        }

        for report in self.drain_reports() {
            log::debug!("report drained during close: {}", report);
        }
    }

    /// Refuse async calls unless the pool is open, uninterrupted, and idle.
    fn ensure_ready(&self, operation: &'static str) -> Result<(), PoolError> {
        if self.state.is_closed() {
            return Err(PoolError::Closed);
        }
        if self.is_interrupted() {
            return Err(PoolError::Interrupted);
        }
        if !self.state.is_idle() {
            return Err(PoolError::protocol(operation, self.state));
        }
        Ok(())
    }

    /// Refuse a wait call that does not match the pending batch.
    fn expect_state(&self, operation: &'static str, expected: PoolState) -> Result<(), PoolError> {
        if self.state.is_closed() {
            return Err(PoolError::Closed);
        }
        if self.state != expected {
            return Err(PoolError::protocol(operation, self.state));
        }
        Ok(())
    }

    /// Fan-in: collect one reply per worker in index order against a
    /// single deadline, then drain the error channel and aggregate.
    ///
    /// Leaves the pool idle on every outcome. Returns the replies only if
    /// every worker succeeded and no error report is pending; otherwise
    /// the whole batch fails.
    fn collect(
        &mut self,
        operation: &'static str,
        timeout: Option<Duration>,
    ) -> Result<Vec<Reply<A::Obs, A::Info>>, PoolError> {
        let deadline = timeout.map(|t| Instant::now() + t);

        let mut replies = Vec::with_capacity(self.workers.len());
        let mut any_failed = false;
        let mut synthesized = Vec::new();

        for handle in &self.workers {
            if self.undelivered.contains(&handle.index) {
                any_failed = true;
                synthesized.push(ErrorReport::new(
                    handle.index,
                    ErrorKind::Protocol,
                    "command not delivered; worker still busy with an earlier batch",
                ));
                replies.push(None);
                continue;
            }

            let received = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    handle.reply_rx.recv_timeout(remaining)
                }
                None => handle
                    .reply_rx
                    .recv()
                    .map_err(|_| RecvTimeoutError::Disconnected),
            };

            match received {
                Ok(Ok(reply)) => replies.push(Some(reply)),
                Ok(Err(_kind)) => {
                    // Detail already travelled through the error channel.
                    any_failed = true;
                    replies.push(None);
                }
                Err(RecvTimeoutError::Timeout) => {
                    self.state = PoolState::Idle;
                    return Err(PoolError::Timeout {
                        operation,
                        timeout: timeout.unwrap_or_default(),
                    });
                }
                Err(RecvTimeoutError::Disconnected) => {
                    any_failed = true;
                    synthesized.push(ErrorReport::new(
                        handle.index,
                        ErrorKind::Actor,
                        "worker exited without replying",
                    ));
                    replies.push(None);
                }
            }
        }

        self.state = PoolState::Idle;
        self.undelivered.clear();

        let mut reports = self.drain_reports();
        reports.extend(synthesized);
        reports.sort_by_key(|report| report.worker);
        if any_failed || !reports.is_empty() {
            return Err(PoolError::Workers(FailedWorkers(reports)));
        }

        Ok(replies.into_iter().flatten().collect())
    }

    fn drain_reports(&self) -> Vec<ErrorReport> {
        let mut reports = Vec::new();
        while let Ok(report) = self.error_rx.try_recv() {
            reports.push(report);
        }
        reports
    }

    /// Throw away replies left over from a timed-out batch so they cannot
    /// be mistaken for answers to the commands about to be sent.
    fn discard_stale_replies(&self) {
        for handle in &self.workers {
            while let Ok(stale) = handle.reply_rx.try_recv() {
                match stale {
                    Ok(reply) => log::debug!(
                        "worker {}: discarding stale {} reply",
                        handle.index,
                        reply.label()
                    ),
                    Err(kind) => log::debug!(
                        "worker {}: discarding stale failure reply ({})",
                        handle.index,
                        kind
                    ),
                }
            }
        }
    }

    fn mismatched_reply(
        &self,
        index: usize,
        expected: &str,
        got: &Reply<A::Obs, A::Info>,
    ) -> PoolError {
        PoolError::Protocol(format!(
            "worker {} answered a {} batch with a {} reply",
            index,
            expected,
            got.label()
        ))
    }
}

impl<A: Actor> Drop for PolicyPool<A> {
    fn drop(&mut self) {
        self.close();
    }
}
