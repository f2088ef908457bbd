//! The worker thread body.
//!
//! A worker builds its actor from the supplied constructor, acknowledges
//! readiness, then serves commands until it is closed, interrupted, or the
//! pool goes away. All actor access is serialized through this loop, and
//! every failure produces both an error report and a failure reply so the
//! pool can never block forever on a worker that already failed.
//!
//! The loop polls its command channel with a bounded wait instead of
//! blocking indefinitely, so the pool-wide interrupt flag is observed
//! within one polling period even while the worker is idle.

use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::core::actor::{Actor, ActorConstructor, ActorIdentity, StepInfo};
use crate::error::ActorError;
use crate::messages::{Command, ErrorKind, ErrorReport, Reply, StepReply};

/// What travels back on a worker's reply channel: a successful reply, or
/// the kind of failure (detail goes through the error channel).
pub(crate) type WorkerReply<A> =
    Result<Reply<<A as Actor>::Obs, <A as Actor>::Info>, ErrorKind>;

/// Pool-side view of one worker: identity, the pool's channel ends, and
/// the thread handle joined at close.
pub(crate) struct WorkerHandle<A: Actor> {
    pub index: usize,
    pub name: String,
    pub cmd_tx: Sender<Command<A::Action>>,
    pub reply_rx: Receiver<WorkerReply<A>>,
    pub thread: Option<JoinHandle<()>>,
}

/// Everything a worker thread needs, moved into the thread at spawn.
pub(crate) struct WorkerContext<A: Actor> {
    pub identity: ActorIdentity,
    pub constructor: ActorConstructor<A>,
    pub cmd_rx: Receiver<Command<A::Action>>,
    pub reply_tx: Sender<WorkerReply<A>>,
    pub error_tx: Sender<ErrorReport>,
    pub interrupt: Arc<AtomicBool>,
    pub polling_period: Duration,
    pub auto_reset: bool,
}

/// Spawn a named worker thread running the command loop.
pub(crate) fn spawn<A: Actor>(ctx: WorkerContext<A>) -> io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name(format!("policy-worker-{}", ctx.identity.index))
        .spawn(move || run(ctx))
}

fn run<A: Actor>(ctx: WorkerContext<A>) {
    let WorkerContext {
        identity,
        constructor,
        cmd_rx,
        reply_tx,
        error_tx,
        interrupt,
        polling_period,
        auto_reset,
    } = ctx;
    let index = identity.index;

    let mut actor = match guard("construction", || constructor(identity)) {
        Ok(actor) => actor,
        Err(message) => {
            report(&error_tx, index, ErrorKind::Construction, message);
            let _ = reply_tx.send(Err(ErrorKind::Construction));
            return;
        }
    };

    // Construction succeeded; unblock the pool's ready barrier.
    let _ = reply_tx.send(Ok(Reply::Ready));

    loop {
        if interrupt.load(Ordering::Relaxed) {
            report(
                &error_tx,
                index,
                ErrorKind::Interrupt,
                "interrupt observed; worker terminating",
            );
            // try_send: a stale reply may still occupy the slot, and the
            // report alone is enough for the pool to fail the batch.
            let _ = reply_tx.try_send(Err(ErrorKind::Interrupt));
            break;
        }

        match cmd_rx.recv_timeout(polling_period) {
            Ok(command) => {
                if !handle(&mut actor, command, index, auto_reset, &reply_tx, &error_tx) {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                // Idle; loop around to re-check the interrupt flag.
            }
            Err(RecvTimeoutError::Disconnected) => {
                log::debug!("worker {}: pool dropped command channel; exiting", index);
                break;
            }
        }
    }

    // Actor cleanup runs on every exit path.
    if let Err(panic) = catch_unwind(AssertUnwindSafe(|| actor.close())) {
        log::warn!(
            "worker {}: actor close panicked: {}",
            index,
            panic_message(panic)
        );
    }
}

/// Execute one command. Returns `false` when the worker should exit.
fn handle<A: Actor>(
    actor: &mut A,
    command: Command<A::Action>,
    index: usize,
    auto_reset: bool,
    reply_tx: &Sender<WorkerReply<A>>,
    error_tx: &Sender<ErrorReport>,
) -> bool {
    match command {
        Command::Reset => match guard("reset", || actor.reset()) {
            Ok(observation) => {
                let _ = reply_tx.send(Ok(Reply::Observation(observation)));
            }
            Err(message) => fail::<A>(reply_tx, error_tx, index, ErrorKind::Actor, message),
        },
        Command::Step(action) => match guard("step", || actor.step(action)) {
            Ok((observation, reward, dones, detail)) => {
                let mut info = StepInfo::new(detail);
                let observation = if auto_reset && dones.episode_over() {
                    // Episode fully ended: reset now and hand the caller
                    // the fresh observation, keeping the real terminal
                    // state available through `info`.
                    match guard("auto-reset", || actor.reset()) {
                        Ok(fresh) => {
                            info.terminal_observation = Some(observation);
                            fresh
                        }
                        Err(message) => {
                            fail::<A>(reply_tx, error_tx, index, ErrorKind::Actor, message);
                            return true;
                        }
                    }
                } else {
                    observation
                };
                let _ = reply_tx.send(Ok(Reply::Step(StepReply {
                    observation,
                    reward,
                    dones,
                    info,
                })));
            }
            Err(message) => fail::<A>(reply_tx, error_tx, index, ErrorKind::Actor, message),
        },
        Command::Seed(seed) => match guard("seed", || actor.seed(seed)) {
            Ok(applied) => {
                let _ = reply_tx.send(Ok(Reply::Seed(applied)));
            }
            Err(message) => fail::<A>(reply_tx, error_tx, index, ErrorKind::Actor, message),
        },
        Command::GetSpecs => {
            match guard("get_specs", || {
                Ok((actor.observation_spec(), actor.action_spec()))
            }) {
                Ok((observation, action)) => {
                    let _ = reply_tx.send(Ok(Reply::Specs {
                        observation,
                        action,
                    }));
                }
                Err(message) => fail::<A>(reply_tx, error_tx, index, ErrorKind::Actor, message),
            }
        }
        Command::Close => {
            let _ = reply_tx.send(Ok(Reply::Closed));
            return false;
        }
    }
    true
}

/// Push a report and answer with a failure reply so the pool's wait can
/// always make progress.
fn fail<A: Actor>(
    reply_tx: &Sender<WorkerReply<A>>,
    error_tx: &Sender<ErrorReport>,
    index: usize,
    kind: ErrorKind,
    message: String,
) {
    report(error_tx, index, kind, message);
    let _ = reply_tx.send(Err(kind));
}

fn report(
    error_tx: &Sender<ErrorReport>,
    worker: usize,
    kind: ErrorKind,
    message: impl Into<String>,
) {
    // Unbounded channel: producers never block. A closed channel means the
    // pool is already gone, so the report has no consumer anyway.
    if error_tx.send(ErrorReport::new(worker, kind, message)).is_err() {
        log::debug!("worker {}: error channel closed, report dropped", worker);
    }
}

/// Run actor code with panic containment, flattening panics and actor
/// errors into one message.
fn guard<T>(
    operation: &'static str,
    f: impl FnOnce() -> Result<T, ActorError>,
) -> Result<T, String> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(err.to_string()),
        Err(panic) => Err(format!(
            "panicked during {}: {}",
            operation,
            panic_message(panic)
        )),
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
