// Host-side tests for the lookahead clock, driven by a simulated audio clock
// and poll cadence. The main crate is wasm-only, so we include the pure core
// modules directly.

#![allow(dead_code)]
mod clock {
    include!("../src/core/clock.rs");
}
mod sequencer {
    include!("../src/core/sequencer.rs");
}

use clock::SequencerClock;
use sequencer::seconds_per_step;

const LOOKAHEAD: f64 = 0.1;

#[test]
fn never_schedules_before_now() {
    let step = seconds_per_step(104.0);
    let mut c = SequencerClock::starting_at(10.0);
    let due = c.schedule_window(10.0, LOOKAHEAD, step);
    assert!(!due.is_empty());
    for (t, _) in &due {
        assert!(*t >= 10.0, "event at {t} before now");
    }

    // A clock left behind by a stalled poll is clamped up, never emitted late
    let mut c = SequencerClock::starting_at(0.0);
    let due = c.schedule_window(5.0, LOOKAHEAD, step);
    for (t, _) in &due {
        assert!(*t >= 5.0, "stale clock emitted {t} before now 5.0");
    }
}

#[test]
fn consecutive_step_deltas_equal_the_step_duration() {
    let step = seconds_per_step(104.0);
    let mut c = SequencerClock::starting_at(1.0);
    // Several polls, 25ms apart, collecting everything scheduled
    let mut events = Vec::new();
    for k in 0..40 {
        let now = 1.0 + k as f64 * 0.025;
        events.extend(c.schedule_window(now, LOOKAHEAD, step));
    }
    assert!(events.len() > 4);
    for pair in events.windows(2) {
        let delta = pair[1].0 - pair[0].0;
        assert!(
            (delta - step).abs() < 1e-9,
            "delta {delta} != step duration {step}"
        );
    }
}

#[test]
fn step_index_wraps_every_sixteen() {
    let mut c = SequencerClock::starting_at(0.0);
    // Window wide enough for 20 steps at once
    let due = c.schedule_window(0.0, 20.0 * 0.125, 0.125);
    assert!(due.len() >= 20);
    for (i, (_, step)) in due.iter().enumerate() {
        assert_eq!(*step, i % 16);
    }
}

#[test]
fn next_event_time_is_monotonically_non_decreasing() {
    let step = seconds_per_step(104.0);
    let mut c = SequencerClock::starting_at(0.0);
    let mut last = c.next_event_time;
    for k in 0..100 {
        // Irregular poll cadence, including a long stall
        let now = k as f64 * 0.025 + if k == 50 { 2.0 } else { 0.0 };
        c.schedule_window(now, LOOKAHEAD, step);
        assert!(c.next_event_time >= last);
        last = c.next_event_time;
    }
}

#[test]
fn delayed_poll_causes_no_audible_gap() {
    // 104 BPM, 100ms lookahead, 25ms polls, one poll delayed by 75ms: the
    // window always extends past the delay, so scheduled deltas stay exact.
    let step = seconds_per_step(104.0);
    let mut c = SequencerClock::starting_at(0.0);
    let mut events = Vec::new();
    let mut now = 0.0;
    for k in 0..60 {
        events.extend(c.schedule_window(now, LOOKAHEAD, step));
        now += if k == 20 { 0.075 + 0.025 } else { 0.025 };
    }
    for pair in events.windows(2) {
        let delta = pair[1].0 - pair[0].0;
        assert!(
            (delta - step).abs() < 1e-9,
            "gap of {delta} after delayed poll"
        );
    }
}

#[test]
fn each_poll_keeps_the_window_full() {
    let step = seconds_per_step(104.0);
    let mut c = SequencerClock::starting_at(0.0);
    // Cold start fills the whole window at once
    let first = c.schedule_window(0.0, LOOKAHEAD, step);
    assert_eq!(first.len(), (LOOKAHEAD / step).ceil() as usize);
    // Afterwards the clock always sits a full lookahead ahead of the poll
    for k in 1..40 {
        let now = k as f64 * 0.025;
        c.schedule_window(now, LOOKAHEAD, step);
        assert!(c.next_event_time >= now + LOOKAHEAD - 1e-9);
    }
}
