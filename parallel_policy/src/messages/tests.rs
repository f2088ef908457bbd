//! Protocol-shape tests for the command/reply/report types.

use super::*;
use crate::core::actor::StepInfo;
use crate::core::done::DoneMap;
use crate::core::spec::{ActionSpec, ObservationSpec};

#[test]
fn test_command_labels() {
    assert_eq!(Command::<u32>::Reset.label(), "reset");
    assert_eq!(Command::Step(7u32).label(), "step");
    assert_eq!(Command::<u32>::Seed(42).label(), "seed");
    assert_eq!(Command::<u32>::GetSpecs.label(), "get_specs");
    assert_eq!(Command::<u32>::Close.label(), "close");
}

#[test]
fn test_reply_labels_mirror_commands() {
    let ready: Reply<Vec<f32>, ()> = Reply::Ready;
    assert_eq!(ready.label(), "ready");

    let reset: Reply<Vec<f32>, ()> = Reply::Observation(vec![0.0]);
    assert_eq!(reset.label(), "reset");

    let step: Reply<Vec<f32>, ()> = Reply::Step(StepReply {
        observation: vec![1.0],
        reward: 1.0,
        dones: DoneMap::single(false),
        info: StepInfo::new(()),
    });
    assert_eq!(step.label(), "step");

    let seed: Reply<Vec<f32>, ()> = Reply::Seed(42);
    assert_eq!(seed.label(), "seed");

    let specs: Reply<Vec<f32>, ()> = Reply::Specs {
        observation: ObservationSpec::flat(4),
        action: ActionSpec::Discrete { n: 2 },
    };
    assert_eq!(specs.label(), "specs");

    let closed: Reply<Vec<f32>, ()> = Reply::Closed;
    assert_eq!(closed.label(), "closed");
}

#[test]
fn test_error_report_display() {
    let report = ErrorReport::new(5, ErrorKind::Actor, "division by zero");
    assert_eq!(report.to_string(), "worker 5 (actor): division by zero");
}

#[test]
fn test_error_kind_fatality() {
    assert!(ErrorKind::Construction.is_fatal());
    assert!(ErrorKind::Interrupt.is_fatal());
    assert!(!ErrorKind::Actor.is_fatal());
    assert!(!ErrorKind::Protocol.is_fatal());
}

#[test]
fn test_step_reply_round_trip_through_channel() {
    // Replies cross thread boundaries; make sure a full step payload
    // survives a bounded channel unchanged.
    let (tx, rx) = crossbeam_channel::bounded::<Result<Reply<Vec<f32>, String>, ErrorKind>>(1);

    let mut info = StepInfo::new("caught".to_string());
    info.terminal_observation = Some(vec![3.0, 4.0]);
    let sent = Reply::Step(StepReply {
        observation: vec![0.0, 0.0],
        reward: 1.0,
        dones: DoneMap::new().with_agent("predator", true).with_all(true),
        info,
    });

    tx.send(Ok(sent.clone())).unwrap();
    let received = rx.recv().unwrap().unwrap();
    assert_eq!(received, sent);
}

#[test]
fn test_failure_reply_carries_kind_only() {
    let (tx, rx) = crossbeam_channel::bounded::<Result<Reply<Vec<f32>, ()>, ErrorKind>>(1);
    tx.send(Err(ErrorKind::Actor)).unwrap();
    assert_eq!(rx.recv().unwrap().unwrap_err(), ErrorKind::Actor);
}
