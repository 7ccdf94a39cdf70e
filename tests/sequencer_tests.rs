// Host-side tests for the pure sequencer pattern.
// The main crate is wasm-only, so we include the pure core module directly.

#![allow(dead_code)]
mod sequencer {
    include!("../src/core/sequencer.rs");
}

use sequencer::*;

#[test]
fn kick_lands_on_quarter_notes() {
    for step in 0..16 {
        let t = triggers_for_step(step);
        assert_eq!(
            t.kick,
            matches!(step, 0 | 4 | 8 | 12),
            "kick wrong at step {step}"
        );
    }
}

#[test]
fn snare_lands_on_backbeats() {
    for step in 0..16 {
        let t = triggers_for_step(step);
        assert_eq!(t.snare, step == 4 || step == 12, "snare wrong at step {step}");
    }
}

#[test]
fn hat_lands_on_every_odd_step() {
    for step in 0..16 {
        let t = triggers_for_step(step);
        assert_eq!(t.hat, step % 2 == 1, "hat wrong at step {step}");
    }
}

#[test]
fn bass_riff_cycles_root_flat_seventh_minor_third() {
    let expected = [
        (0, 55.0_f32),  // root
        (3, 49.0),      // flat seventh
        (6, 55.0),      // root
        (10, 65.41),    // minor third
        (14, 55.0),     // root
    ];
    for (step, hz) in expected {
        let t = triggers_for_step(step);
        let got = t.bass_hz.unwrap_or_else(|| panic!("no bass at step {step}"));
        assert!((got - hz).abs() < 1e-3, "bass at step {step}: {got} != {hz}");
    }
    for step in 0..16 {
        if !BASS_STEPS.contains(&step) {
            assert!(
                triggers_for_step(step).bass_hz.is_none(),
                "unexpected bass at step {step}"
            );
        }
    }
}

#[test]
fn triggers_are_a_pure_function_of_step() {
    for step in 0..16 {
        assert_eq!(triggers_for_step(step), triggers_for_step(step));
        // A running counter maps onto the same cycle position
        assert_eq!(triggers_for_step(step), triggers_for_step(step + 16));
        assert_eq!(triggers_for_step(step), triggers_for_step(step + 160));
    }
}

#[test]
fn step_duration_is_a_sixteenth_note() {
    assert!((seconds_per_step(120.0) - 0.125).abs() < 1e-12);
    assert!((seconds_per_step(60.0) - 0.25).abs() < 1e-12);
    // 104 BPM, the default tempo: 60/104/4 seconds
    let d = seconds_per_step(104.0);
    assert!((d - 60.0 / 104.0 / 4.0).abs() < 1e-12);
    assert!(d > 0.144 && d < 0.145);
}
