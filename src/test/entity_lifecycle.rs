use super::probe::{Probe, end_signals, entries, new_log, tags};
use crate::directory::EntityDirectory;
use crate::entity::{EntityId, EntityState};
use crate::error::SimError;
use crate::sim::{Predicate, SimState, SimTime, Simulation, Tag};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[test]
fn state_machine_allows_only_documented_transitions() {
    use EntityState::*;
    assert!(Runnable.can_transition_to(Waiting));
    assert!(Runnable.can_transition_to(Holding));
    assert!(Waiting.can_transition_to(Runnable));
    assert!(Holding.can_transition_to(Runnable));
    for s in [Runnable, Waiting, Holding] {
        assert!(s.can_transition_to(Finished));
    }
    assert!(!Waiting.can_transition_to(Holding));
    assert!(!Waiting.can_transition_to(Waiting));
    assert!(!Runnable.can_transition_to(Runnable));
    for s in [Runnable, Waiting, Holding, Finished] {
        assert!(!Finished.can_transition_to(s));
    }
}

#[test]
fn waiting_entity_gets_matching_event_directly_and_parks_the_rest() {
    let log = new_log();
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    let mut sim = Simulation::default();
    let e = sim
        .add_entity(Probe::new("e", &log).on_event(move |ev, ctx| {
            match ev.tag() {
                Tag(1) => ctx.wait(Predicate::tag(Tag(42)))?,
                Tag(42) => *sink.lock().expect("state lock") = ctx.state(),
                _ => {}
            }
            Ok(())
        }))
        .expect("add");

    sim.schedule(None, e, 2.0, Tag(1), None).expect("schedule");
    sim.schedule(None, e, 3.0, Tag(7), None).expect("schedule");
    sim.schedule(None, e, 4.0, Tag(42), None).expect("schedule");

    assert_eq!(sim.run_for(2.0).expect("run"), SimTime(2.0));
    assert_eq!(sim.entity_state(e), Some(EntityState::Waiting));

    assert_eq!(sim.run_for(1.0).expect("run"), SimTime(3.0));
    assert_eq!(sim.entity_state(e), Some(EntityState::Waiting));
    assert_eq!(sim.deferred_count_for(e), 1);
    assert_eq!(tags(&log), vec![1]);

    sim.run_for(1.0).expect("run");
    // 42 直接送达并先被处理，之后才轮到延迟队列中的 7。
    assert_eq!(entries(&log), vec![(2.0, 1), (4.0, 42), (3.0, 7)]);
    assert_eq!(*seen.lock().expect("state lock"), Some(EntityState::Runnable));
    assert_eq!(sim.deferred_len(), 0);
}

#[test]
fn end_of_simulation_wakes_waiting_entities_regardless_of_predicate() {
    let log = new_log();
    let mut sim = Simulation::default();
    let e = sim
        .add_entity(Probe::new("e", &log).on_start(|ctx| ctx.wait(Predicate::tag(Tag(42)))))
        .expect("add");
    sim.schedule(None, e, 1.0, Tag(7), None).expect("schedule");

    sim.start().expect("run");
    assert_eq!(end_signals(&log), 1);
    // END 唤醒实体后，延迟队列中的 7 也在结束前被处理。
    assert_eq!(tags(&log), vec![7]);
}

#[test]
fn next_event_picks_from_deferred_by_predicate() {
    let log = new_log();
    let picked = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&picked);
    let mut sim = Simulation::default();
    let p = sim
        .add_entity(
            Probe::new("p", &log)
                .on_start(|ctx| ctx.wait(Predicate::tag(Tag(1))))
                .on_event(move |ev, ctx| {
                    if ev.tag() == Tag(1) {
                        if let Some(other) = ctx.next_event(&Predicate::tag(Tag(8))) {
                            sink.lock().expect("picked lock").push(other.tag().0);
                        }
                    }
                    Ok(())
                }),
        )
        .expect("add");

    sim.schedule(None, p, 1.0, Tag(7), None).expect("schedule");
    sim.schedule(None, p, 1.0, Tag(8), None).expect("schedule");
    sim.schedule(None, p, 2.0, Tag(1), None).expect("schedule");
    sim.start().expect("run");

    assert_eq!(*picked.lock().expect("picked lock"), vec![8]);
    assert_eq!(tags(&log), vec![1, 7]);
}

#[test]
fn hold_parks_incoming_events_until_the_delay_elapses() {
    let log = new_log();
    let woke = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&woke);
    let mut sim = Simulation::default();
    let e = sim
        .add_entity(Probe::new("e", &log).on_event(move |ev, ctx| {
            match ev.tag() {
                Tag(1) => ctx.hold(5.0)?,
                Tag(2) => sink.lock().expect("woke lock").push(ctx.now().as_secs()),
                _ => {}
            }
            Ok(())
        }))
        .expect("add");
    sim.schedule(None, e, 1.0, Tag(1), None).expect("schedule");
    sim.schedule(None, e, 2.0, Tag(2), None).expect("schedule");

    sim.run_for(3.0).expect("run");
    assert_eq!(sim.entity_state(e), Some(EntityState::Holding));
    assert_eq!(sim.deferred_count_for(e), 1);

    sim.run_for(f64::INFINITY).expect("run");
    assert_eq!(*woke.lock().expect("woke lock"), vec![6.0]);
    assert_eq!(tags(&log), vec![1, 2]);
    assert_eq!(sim.clock(), SimTime(6.0));
}

#[test]
fn hold_with_invalid_delay_is_an_error() {
    let mut sim = Simulation::default();
    let e = sim
        .add_entity(Probe::new("e", &new_log()).on_event(|_, ctx| ctx.hold(f64::NAN)))
        .expect("add");
    sim.schedule(None, e, 1.0, Tag(1), None).expect("schedule");
    assert!(matches!(sim.start(), Err(SimError::InvalidDelay { .. })));
}

#[test]
fn double_wait_is_an_invalid_transition() {
    let mut sim = Simulation::default();
    let e = sim
        .add_entity(Probe::new("e", &new_log()).on_event(|_, ctx| {
            ctx.wait_any()?;
            ctx.wait_any()
        }))
        .expect("add");
    sim.schedule(None, e, 1.0, Tag(1), None).expect("schedule");

    let err = sim.start().expect_err("second wait must fail");
    assert!(matches!(
        err,
        SimError::InvalidTransition {
            entity,
            from: EntityState::Waiting,
            to: EntityState::Waiting,
        } if entity == e
    ));
}

#[test]
fn start_entity_runs_once_and_records_start_time() {
    let starts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&starts);
    let mut sim = Simulation::default();
    let p = sim
        .add_entity(Probe::new("p", &new_log()).on_start(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }))
        .expect("add");
    assert_eq!(sim.entity_info(p).map(|i| i.started), Some(false));

    sim.start_sync().expect("start");
    assert!(!sim.start_entity(p).expect("second start"));
    assert_eq!(starts.load(Ordering::SeqCst), 1);

    let info = sim.entity_info(p).expect("info");
    assert_eq!(info.name, "p");
    assert!(info.started);
    assert_eq!(info.start_time, Some(SimTime::ZERO));
    assert_eq!(info.state, EntityState::Runnable);

    assert!(matches!(
        sim.start_entity(EntityId(99)),
        Err(SimError::UnknownEntity(EntityId(99)))
    ));
    assert!(matches!(sim.start_sync(), Err(SimError::AlreadyStarted)));
}

#[test]
fn shut_down_entity_leaves_the_roster_and_rejects_deliveries() {
    let log = new_log();
    let shutdowns = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulation::default();
    let a = sim
        .add_entity(
            Probe::new("a", &log)
                .on_event(|ev, ctx| {
                    if ev.tag() == Tag(1) {
                        assert!(ctx.shutdown()?);
                        assert!(!ctx.shutdown()?);
                    }
                    Ok(())
                })
                .record_shutdowns(&shutdowns),
        )
        .expect("add");
    sim.schedule(None, a, 2.0, Tag(1), None).expect("schedule");
    sim.schedule(None, a, 5.0, Tag(2), None).expect("schedule");

    sim.run_for(3.0).expect("run");
    assert!(!sim.is_registered(a));
    assert!(!sim.entity_ids().contains(&a));
    assert_eq!(sim.entity_state(a), None);
    assert_eq!(*shutdowns.lock().expect("shutdown lock"), vec![2.0]);

    assert!(!sim.schedule(None, a, 1.0, Tag(3), None).expect("schedule"));
    sim.run_for(f64::INFINITY).expect("run");

    assert_eq!(tags(&log), vec![1]);
    assert_eq!(sim.stats().dropped_events, 2);
    assert_eq!(*shutdowns.lock().expect("shutdown lock"), vec![2.0]);
}

#[test]
fn application_can_shut_down_an_idle_entity() {
    let shutdowns = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulation::default();
    let p = sim
        .add_entity(Probe::new("p", &new_log()).record_shutdowns(&shutdowns))
        .expect("add");

    assert!(sim.shutdown_entity(p).expect("shutdown"));
    assert!(!sim.shutdown_entity(p).expect("shutdown again"));
    assert!(!sim.is_registered(p));
    assert_eq!(*shutdowns.lock().expect("shutdown lock"), vec![0.0]);
}

#[test]
fn entities_added_while_running_start_at_the_current_time() {
    let late_log = new_log();
    let started = Arc::new(Mutex::new(Vec::new()));
    let started_sink = Arc::clone(&started);
    let inner_log = Arc::clone(&late_log);
    let mut sim = Simulation::default();
    let a = sim
        .add_entity(Probe::new("a", &new_log()).on_event(move |ev, ctx| {
            if ev.tag() == Tag(1) {
                let sink = Arc::clone(&started_sink);
                ctx.add_entity(Probe::new("late", &inner_log).on_start(move |ctx| {
                    sink.lock()
                        .expect("started lock")
                        .push((ctx.id(), ctx.now().as_secs()));
                    ctx.schedule_self(1.0, Tag(5), None)?;
                    Ok(())
                }))?;
            }
            Ok(())
        }))
        .expect("add");
    sim.schedule(None, a, 3.0, Tag(1), None).expect("schedule");

    let end = sim.start().expect("run");
    assert_eq!(*started.lock().expect("started lock"), vec![(EntityId(2), 3.0)]);
    assert_eq!(entries(&late_log), vec![(4.0, 5)]);
    assert_eq!(end, SimTime(4.0));

    assert_eq!(sim.state(), SimState::Finished);
    assert!(matches!(
        sim.add_entity(Probe::new("too-late", &new_log())),
        Err(SimError::AlreadyFinished)
    ));
}

#[test]
fn entity_mut_downcasts_to_the_concrete_type() {
    let mut sim = Simulation::default();
    let p = sim.add_entity(Probe::new("p", &new_log())).expect("add");
    assert!(sim.entity_mut::<Probe>(p).is_some());
    assert!(sim.entity_mut::<EntityDirectory>(p).is_none());
    let dir = sim.directory_id();
    assert!(sim.entity_mut::<EntityDirectory>(dir).is_some());
}
