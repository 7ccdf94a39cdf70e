// Lookahead clock for the step scheduler.
//
// The wall-clock poll is jittery and subject to backlog (tab backgrounding,
// contention); each poll therefore expands every step falling inside a
// lookahead window into `(event_time, step_index)` pairs pinned to the audio
// clock, so perceived timing never depends on poll cadence.

use smallvec::SmallVec;

const STEPS_PER_CYCLE: usize = 16;

#[derive(Clone, Copy, Debug)]
pub struct SequencerClock {
    /// Audio-clock timestamp of the next unscheduled step.
    /// Monotonically non-decreasing.
    pub next_event_time: f64,
    /// Running step counter, wraps every 16 increments.
    pub step_index: usize,
}

impl SequencerClock {
    pub fn starting_at(now: f64) -> Self {
        Self {
            next_event_time: now,
            step_index: 0,
        }
    }

    /// Emit every step due within `lookahead` seconds of `now`, advancing the
    /// clock past them. Never emits an event time earlier than `now`: a clock
    /// left behind by a stalled poll is jumped forward first.
    pub fn schedule_window(
        &mut self,
        now: f64,
        lookahead: f64,
        step_duration: f64,
    ) -> SmallVec<[(f64, usize); 8]> {
        let mut due = SmallVec::new();
        if self.next_event_time < now {
            self.next_event_time = now;
        }
        while self.next_event_time < now + lookahead {
            due.push((self.next_event_time, self.step_index));
            self.next_event_time += step_duration;
            self.step_index = (self.step_index + 1) % STEPS_PER_CYCLE;
        }
        due
    }
}
