// Fixed 16-step drum/bass pattern.
//
// Pure mapping from a cycle position to the set of instrument triggers for
// that step. The scheduler owns all timing; nothing here touches a clock.

/// Instrument triggers for one sequencer step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepTriggers {
    pub kick: bool,
    pub snare: bool,
    pub hat: bool,
    /// Bass note frequency, when this step carries one.
    pub bass_hz: Option<f32>,
}

/// Steps (within a 16-step cycle) that carry a bass note.
pub const BASS_STEPS: [usize; 5] = [0, 3, 6, 10, 14];

/// Three-pitch riff cycled over the bass steps:
/// root (A1), flat seventh (G1), root, minor third (C2), root.
pub const BASS_RIFF_HZ: [f32; 5] = [55.0, 49.0, 55.0, 65.41, 55.0];

/// Triggers for a cycle position. `step` is taken mod 16, so callers can pass
/// a running step counter directly.
pub fn triggers_for_step(step: usize) -> StepTriggers {
    let step = step % 16;
    let bass_hz = BASS_STEPS
        .iter()
        .position(|&s| s == step)
        .map(|i| BASS_RIFF_HZ[i]);
    StepTriggers {
        kick: matches!(step, 0 | 4 | 8 | 12),
        snare: matches!(step, 4 | 12),
        hat: step % 2 == 1,
        bass_hz,
    }
}

/// Duration of one 16th-note step at the given tempo.
#[inline]
pub fn seconds_per_step(bpm: f64) -> f64 {
    60.0 / bpm / 4.0
}
