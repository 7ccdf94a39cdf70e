//! The effect engines themselves: each pairs a grid render loop with an
//! optional step-sequenced audio half, and owns every resource it acquires
//! (surface, timers, listeners, audio clock) for the duration of its run.

use crate::audio::AudioBank;
use crate::constants::{GRID_SEED, STAGE_CONTAINER_ID};
use crate::core::{
    GridTuning, SecretCodeDetector, CELL_CHURN_FRACTION, PULSE_DECAY_PER_TICK, SECRET_CODE,
};
use crate::dom::{self, ListenerHandle};
use crate::render::{RenderLoop, RenderStyle};
use crate::scheduler::Scheduler;
use anyhow::Result;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Contract every engine satisfies: `init` is idempotent (a no-op when its
/// surface already exists and the loops are running), `stop` releases every
/// resource `init` acquired.
pub trait Engine {
    fn id(&self) -> &'static str;
    fn init(&mut self) -> Result<()>;
    fn stop(&mut self);
}

/// The lazy-load boundary: an engine instance exists only once the loader has
/// requested its id.
pub fn construct(id: &str) -> Option<Box<dyn Engine>> {
    let config = match id {
        "pulsegrid" => pulsegrid_config(),
        "starfield" => starfield_config(),
        "ultraviolet" => ultraviolet_config(),
        _ => return None,
    };
    Some(Box::new(AvEngine::new(config)))
}

pub struct EngineConfig {
    pub id: &'static str,
    pub canvas_id: &'static str,
    pub style: RenderStyle,
    pub tuning: GridTuning,
    /// Tempo for the audio half; `None` makes the engine visual-only.
    pub bpm: Option<f64>,
    pub seed: u64,
}

const NEON_PALETTE: &[&str] = &["#ff2965", "#29ffcc", "#ffd166", "#7b5cff", "#00e5ff"];
const STAR_PALETTE: &[&str] = &["#ffffff", "#cfe7ff", "#9fb8ff"];
const UV_PALETTE: &[&str] = &["#7b2bff", "#b967ff", "#01cdfe", "#ff71ce"];

fn pulsegrid_config() -> EngineConfig {
    EngineConfig {
        id: "pulsegrid",
        canvas_id: "fx-surface-pulsegrid",
        style: RenderStyle {
            palette: NEON_PALETTE,
            background: "#0a0a14",
        },
        tuning: GridTuning {
            palette_len: NEON_PALETTE.len(),
            churn_fraction: CELL_CHURN_FRACTION,
            pulse_spawn_probability: 0.25,
            pulse_decay_per_tick: PULSE_DECAY_PER_TICK,
        },
        bpm: Some(crate::core::BPM),
        seed: GRID_SEED,
    }
}

fn starfield_config() -> EngineConfig {
    EngineConfig {
        id: "starfield",
        canvas_id: "fx-surface-starfield",
        style: RenderStyle {
            palette: STAR_PALETTE,
            background: "#05060d",
        },
        tuning: GridTuning {
            palette_len: STAR_PALETTE.len(),
            churn_fraction: 0.01,
            pulse_spawn_probability: 0.6,
            pulse_decay_per_tick: PULSE_DECAY_PER_TICK,
        },
        bpm: None,
        seed: GRID_SEED + 1,
    }
}

fn ultraviolet_config() -> EngineConfig {
    EngineConfig {
        id: "ultraviolet",
        canvas_id: "fx-surface-ultraviolet",
        style: RenderStyle {
            palette: UV_PALETTE,
            background: "#0c0418",
        },
        tuning: GridTuning {
            palette_len: UV_PALETTE.len(),
            churn_fraction: CELL_CHURN_FRACTION,
            pulse_spawn_probability: 0.4,
            pulse_decay_per_tick: PULSE_DECAY_PER_TICK,
        },
        bpm: Some(118.0),
        seed: GRID_SEED + 2,
    }
}

/// Shared audio+visual engine implementation, specialized by config.
struct AvEngine {
    config: EngineConfig,
    render: Option<RenderLoop>,
    scheduler: Option<Scheduler>,
    bank: Option<Rc<AudioBank>>,
    listeners: Vec<ListenerHandle>,
}

impl AvEngine {
    fn new(config: EngineConfig) -> Self {
        Self {
            config,
            render: None,
            scheduler: None,
            bank: None,
            listeners: Vec::new(),
        }
    }

    /// Find or create the engine's canvas. Reusing an existing element keeps
    /// `init` idempotent across duplicate calls.
    fn ensure_surface(&self) -> Option<web::HtmlCanvasElement> {
        let document = dom::window_document()?;
        if let Some(el) = document.get_element_by_id(self.config.canvas_id) {
            return el.dyn_into::<web::HtmlCanvasElement>().ok();
        }
        let el = document.create_element("canvas").ok()?;
        _ = el.set_attribute("id", self.config.canvas_id);
        _ = el.set_attribute(
            "style",
            "position:fixed;inset:0;width:100%;height:100%;pointer-events:none;z-index:-1;",
        );
        let canvas: web::HtmlCanvasElement = el.dyn_into().ok()?;
        let parent: Option<web::Element> = document
            .get_element_by_id(STAGE_CONTAINER_ID)
            .or_else(|| document.body().map(web::Element::from));
        if let Some(parent) = parent {
            _ = parent.append_child(&canvas);
        }
        Some(canvas)
    }

    fn wire_audio(&mut self, bpm: f64) {
        match AudioBank::new() {
            Ok(bank) => {
                let bank = Rc::new(bank);
                let scheduler = Scheduler::new(bank.clone(), bpm);
                scheduler.start();

                // First user click satisfies the autoplay gesture requirement.
                if let Some(window) = web::window() {
                    let bank_click = bank.clone();
                    self.listeners.push(ListenerHandle::attach(
                        window.as_ref(),
                        "click",
                        move |_| bank_click.ensure_running(),
                    ));

                    // Secret key sequence toggles the audio half. Default key
                    // handling is never intercepted.
                    let detector = Rc::new(RefCell::new(SecretCodeDetector::new(SECRET_CODE)));
                    let scheduler_keys = scheduler.clone();
                    self.listeners.push(ListenerHandle::attach(
                        window.as_ref(),
                        "keydown",
                        move |ev: web::Event| {
                            let Ok(kev) = ev.dyn_into::<web::KeyboardEvent>() else {
                                return;
                            };
                            if detector.borrow_mut().push(&kev.key()) {
                                log::info!("[keys] secret code matched; toggling audio");
                                scheduler_keys.toggle();
                            }
                        },
                    ));
                }

                self.bank = Some(bank);
                self.scheduler = Some(scheduler);
            }
            // Recoverable: the visual half stays active without audio.
            Err(e) => log::warn!("[audio] unavailable, visuals only: {e:#}"),
        }
    }
}

impl Engine for AvEngine {
    fn id(&self) -> &'static str {
        self.config.id
    }

    fn init(&mut self) -> Result<()> {
        if self.render.as_ref().is_some_and(RenderLoop::is_running) {
            log::info!("[engine] {} already initialized", self.config.id);
            return Ok(());
        }

        let canvas = self.ensure_surface();
        let render = RenderLoop::new(canvas, self.config.tuning, self.config.style, self.config.seed);
        render.resize_to_canvas();
        render.start();

        if let Some(window) = web::window() {
            let render_resize = render.clone();
            self.listeners.push(ListenerHandle::attach(
                window.as_ref(),
                "resize",
                move |_| render_resize.resize_to_canvas(),
            ));
        }
        self.render = Some(render);

        if let Some(bpm) = self.config.bpm {
            self.wire_audio(bpm);
        }
        log::info!("[engine] {} initialized", self.config.id);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(scheduler) = self.scheduler.take() {
            scheduler.stop();
        }
        if let Some(bank) = self.bank.take() {
            bank.silence();
        }
        if let Some(render) = self.render.take() {
            render.stop();
        }
        // Listeners detach on drop
        self.listeners.clear();
        if let Some(document) = dom::window_document() {
            if let Some(el) = document.get_element_by_id(self.config.canvas_id) {
                el.remove();
            }
        }
        log::info!("[engine] {} stopped", self.config.id);
    }
}
