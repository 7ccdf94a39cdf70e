//! Poll driver for the step sequencer.
//!
//! A coarse `setTimeout` poll re-checks the audio clock at a fixed interval;
//! the clock expands every step due inside the lookahead window and each
//! trigger is dispatched at its exact audio timestamp. The poll never carries
//! timing itself, so timer jitter is inaudible.

use crate::audio::AudioBank;
use crate::core::{seconds_per_step, triggers_for_step, SequencerClock};
use crate::core::{LOOKAHEAD_SEC, POLL_INTERVAL_MS};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[derive(Clone)]
pub struct Scheduler {
    bank: Rc<AudioBank>,
    bpm: f64,
    playing: Rc<Cell<bool>>,
    timer_id: Rc<Cell<Option<i32>>>,
    clock: Rc<RefCell<SequencerClock>>,
    poll: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
}

impl Scheduler {
    pub fn new(bank: Rc<AudioBank>, bpm: f64) -> Self {
        Self {
            bank,
            bpm,
            playing: Rc::new(Cell::new(false)),
            timer_id: Rc::new(Cell::new(None)),
            clock: Rc::new(RefCell::new(SequencerClock::starting_at(0.0))),
            poll: Rc::new(RefCell::new(None)),
        }
    }

    #[inline]
    pub fn playing(&self) -> bool {
        self.playing.get()
    }

    /// Begin polling. No-op if already playing.
    pub fn start(&self) {
        if self.playing.replace(true) {
            return;
        }
        self.bank.ensure_running();
        *self.clock.borrow_mut() = SequencerClock::starting_at(self.bank.current_time());

        if self.poll.borrow().is_none() {
            let playing = self.playing.clone();
            let timer_id = self.timer_id.clone();
            let clock = self.clock.clone();
            let bank = self.bank.clone();
            let poll_rc = self.poll.clone();
            let step_duration = seconds_per_step(self.bpm);
            *self.poll.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                // A timeout queued before stop() flipped the flag dies here
                // instead of re-arming the loop.
                if !playing.get() {
                    return;
                }
                let now = bank.current_time();
                let due = clock
                    .borrow_mut()
                    .schedule_window(now, LOOKAHEAD_SEC, step_duration);
                for (t, step) in due {
                    bank.dispatch(t, &triggers_for_step(step));
                }
                if let Some(w) = web::window() {
                    if let Ok(id) = w.set_timeout_with_callback_and_timeout_and_arguments_0(
                        poll_rc.borrow().as_ref().unwrap().as_ref().unchecked_ref(),
                        POLL_INTERVAL_MS,
                    ) {
                        timer_id.set(Some(id));
                    }
                }
            }) as Box<dyn FnMut()>));
        }

        if let Some(w) = web::window() {
            if let Ok(id) = w.set_timeout_with_callback_and_timeout_and_arguments_0(
                self.poll.borrow().as_ref().unwrap().as_ref().unchecked_ref(),
                0,
            ) {
                self.timer_id.set(Some(id));
            }
        }
        log::info!("[scheduler] started at {:.0} bpm", self.bpm);
    }

    /// Stop polling and clear the pending timeout. Idempotent.
    pub fn stop(&self) {
        self.playing.set(false);
        if let (Some(w), Some(id)) = (web::window(), self.timer_id.take()) {
            w.clear_timeout_with_handle(id);
        }
    }

    pub fn toggle(&self) {
        if self.playing() {
            self.stop();
        } else {
            self.start();
        }
    }
}
