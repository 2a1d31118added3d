use super::probe::{Probe, new_log};
use crate::sim::{ClockTickWindow, SimTime, Simulation, Tag};
use std::sync::{Arc, Mutex};

#[test]
fn window_notifies_the_older_time_once_it_is_settled() {
    let mut w = ClockTickWindow::default();
    assert_eq!(w.push(SimTime(1.0)), None);
    assert_eq!(w.push(SimTime(1.0)), None);
    assert_eq!(w.push(SimTime(2.0)), Some(SimTime(1.0)));
    assert_eq!(w.push(SimTime(2.0)), None);
    assert_eq!(w.push(SimTime(3.5)), Some(SimTime(2.0)));
    assert_eq!(w.flush(), Some(SimTime(3.5)));
    assert_eq!(w.flush(), None);
}

#[test]
fn window_never_repeats_a_notified_time() {
    let mut w = ClockTickWindow::default();
    w.push(SimTime(1.0));
    assert_eq!(w.push(SimTime(2.0)), Some(SimTime(1.0)));
    assert_eq!(w.flush(), Some(SimTime(2.0)));
    // 结束后再次设置同一时刻
    assert_eq!(w.push(SimTime(2.0)), None);
    assert_eq!(w.push(SimTime(4.0)), None);
    assert_eq!(w.push(SimTime(5.0)), Some(SimTime(4.0)));
}

#[test]
fn empty_window_flushes_nothing() {
    let mut w = ClockTickWindow::default();
    assert_eq!(w.flush(), None);
}

#[test]
fn same_time_events_produce_a_single_tick() {
    let ticks = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&ticks);
    let mut sim = Simulation::default();
    let p = sim.add_entity(Probe::new("p", &new_log())).expect("add");
    sim.add_on_clock_tick_listener(move |at| sink.lock().expect("tick lock").push(at));

    sim.schedule(None, p, 1.0, Tag(1), None).expect("schedule");
    sim.schedule(None, p, 1.0, Tag(2), None).expect("schedule");
    sim.schedule(None, p, 2.0, Tag(3), None).expect("schedule");
    sim.start().expect("run");

    assert_eq!(
        *ticks.lock().expect("tick lock"),
        vec![SimTime(1.0), SimTime(2.0)]
    );
}

#[test]
fn tick_for_a_time_is_delivered_once_the_clock_moves_past_it() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let on_tick = Arc::clone(&order);
    let on_event = Arc::clone(&order);
    let mut sim = Simulation::default();
    let p = sim.add_entity(Probe::new("p", &new_log())).expect("add");
    sim.add_on_clock_tick_listener(move |at| {
        on_tick
            .lock()
            .expect("order lock")
            .push(format!("tick {}", at.as_secs()));
    });
    sim.add_on_event_processing_listener(move |ev| {
        if ev.tag() != Tag::END_OF_SIMULATION {
            on_event
                .lock()
                .expect("order lock")
                .push(format!("event {} @ {}", ev.tag(), ev.time().as_secs()));
        }
    });

    sim.schedule(None, p, 1.0, Tag(1), None).expect("schedule");
    sim.schedule(None, p, 1.0, Tag(2), None).expect("schedule");
    sim.schedule(None, p, 2.0, Tag(3), None).expect("schedule");
    sim.start().expect("run");

    assert_eq!(
        *order.lock().expect("order lock"),
        vec![
            "event 1 @ 1".to_string(),
            "event 2 @ 1".to_string(),
            "tick 1".to_string(),
            "event 3 @ 2".to_string(),
            "tick 2".to_string(),
        ]
    );
}
