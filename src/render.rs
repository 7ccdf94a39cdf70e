//! Frame-driven Canvas-2D redraw of the cell/pulse grid.
//!
//! A self-rescheduling `requestAnimationFrame` chain: each tick mutates the
//! grid model, clears the surface, draws the base cells, then overlays
//! high-intensity cells and pulses with an additive glow. Draw failures are
//! discarded per call; one bad tick never terminates the chain.

use crate::constants::{
    CELL_ALPHA_SCALE, CELL_GAP_PX, CELL_SIZE_PX, GLOW_BLUR_PX, GLOW_INTENSITY_THRESHOLD,
    PULSE_BLUR_PX,
};
use crate::core::{GridModel, GridTuning};
use crate::dom;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Per-engine look: palette entries are CSS colors indexed by the grid model.
#[derive(Clone, Copy, Debug)]
pub struct RenderStyle {
    pub palette: &'static [&'static str],
    pub background: &'static str,
}

#[derive(Clone)]
pub struct RenderLoop {
    canvas: Option<web::HtmlCanvasElement>,
    ctx: Option<web::CanvasRenderingContext2d>,
    grid: Rc<RefCell<GridModel>>,
    rng: Rc<RefCell<StdRng>>,
    style: RenderStyle,
    running: Rc<Cell<bool>>,
    raf_id: Rc<Cell<Option<i32>>>,
    tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
}

impl RenderLoop {
    pub fn new(
        canvas: Option<web::HtmlCanvasElement>,
        tuning: GridTuning,
        style: RenderStyle,
        seed: u64,
    ) -> Self {
        let ctx = canvas.as_ref().and_then(context_2d);
        Self {
            canvas,
            ctx,
            grid: Rc::new(RefCell::new(GridModel::new(tuning))),
            rng: Rc::new(RefCell::new(StdRng::seed_from_u64(seed))),
            style,
            running: Rc::new(Cell::new(false)),
            raf_id: Rc::new(Cell::new(None)),
            tick: Rc::new(RefCell::new(None)),
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Re-sync the canvas backing size and regenerate the grid wholesale for
    /// the new dimensions.
    pub fn resize_to_canvas(&self) {
        if let Some(canvas) = &self.canvas {
            dom::sync_canvas_backing_size(canvas);
            let columns = (canvas.width() as f64 / CELL_SIZE_PX).max(1.0) as u32;
            let rows = (canvas.height() as f64 / CELL_SIZE_PX).max(1.0) as u32;
            self.grid
                .borrow_mut()
                .regenerate(columns, rows, &mut *self.rng.borrow_mut());
        }
    }

    /// Begin the rAF chain. No-op if already running, and not fatal when the
    /// drawing surface is missing.
    pub fn start(&self) {
        if self.running.get() {
            return;
        }
        if self.canvas.is_none() || self.ctx.is_none() {
            log::warn!("[render] no drawing surface attached; start skipped");
            return;
        }
        self.running.set(true);

        if self.tick.borrow().is_none() {
            let (Some(canvas), Some(ctx)) = (self.canvas.clone(), self.ctx.clone()) else {
                return;
            };
            let running = self.running.clone();
            let raf_id = self.raf_id.clone();
            let grid = self.grid.clone();
            let rng = self.rng.clone();
            let style = self.style;
            let tick_rc = self.tick.clone();
            *self.tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                // A frame queued before stop() flipped the flag dies here.
                if !running.get() {
                    return;
                }
                grid.borrow_mut().tick(&mut *rng.borrow_mut());
                draw(&ctx, &canvas, &grid.borrow(), style);
                if let Some(w) = web::window() {
                    if let Ok(id) = w.request_animation_frame(
                        tick_rc.borrow().as_ref().unwrap().as_ref().unchecked_ref(),
                    ) {
                        raf_id.set(Some(id));
                    }
                }
            }) as Box<dyn FnMut()>));
        }

        if let Some(w) = web::window() {
            if let Ok(id) = w
                .request_animation_frame(self.tick.borrow().as_ref().unwrap().as_ref().unchecked_ref())
            {
                self.raf_id.set(Some(id));
            }
        }
    }

    /// Cancel the pending frame. Idempotent.
    pub fn stop(&self) {
        self.running.set(false);
        if let (Some(w), Some(id)) = (web::window(), self.raf_id.take()) {
            _ = w.cancel_animation_frame(id);
        }
    }
}

fn context_2d(canvas: &web::HtmlCanvasElement) -> Option<web::CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|o| o.dyn_into::<web::CanvasRenderingContext2d>().ok())
}

fn draw(
    ctx: &web::CanvasRenderingContext2d,
    canvas: &web::HtmlCanvasElement,
    grid: &GridModel,
    style: RenderStyle,
) {
    let w = canvas.width() as f64;
    let h = canvas.height() as f64;
    let palette = style.palette;
    let inner = CELL_SIZE_PX - 2.0 * CELL_GAP_PX;

    ctx.set_global_alpha(1.0);
    ctx.set_shadow_blur(0.0);
    ctx.set_fill_style_str(style.background);
    ctx.fill_rect(0.0, 0.0, w, h);

    // Base pass
    for cell in &grid.cells {
        let x = cell.column as f64 * CELL_SIZE_PX + CELL_GAP_PX;
        let y = cell.row as f64 * CELL_SIZE_PX + CELL_GAP_PX;
        ctx.set_global_alpha(cell.intensity as f64 * CELL_ALPHA_SCALE);
        ctx.set_fill_style_str(palette[cell.color % palette.len()]);
        ctx.fill_rect(x, y, inner, inner);
    }

    // Glow pass: bright cells, then pulses on top
    for cell in &grid.cells {
        if cell.intensity < GLOW_INTENSITY_THRESHOLD {
            continue;
        }
        let x = cell.column as f64 * CELL_SIZE_PX + CELL_GAP_PX;
        let y = cell.row as f64 * CELL_SIZE_PX + CELL_GAP_PX;
        let color = palette[cell.color % palette.len()];
        ctx.set_global_alpha(cell.intensity as f64);
        ctx.set_shadow_color(color);
        ctx.set_shadow_blur(GLOW_BLUR_PX);
        ctx.set_fill_style_str(color);
        ctx.fill_rect(x, y, inner, inner);
    }
    for pulse in &grid.pulses {
        let x = pulse.column as f64 * CELL_SIZE_PX + CELL_GAP_PX;
        let y = pulse.row as f64 * CELL_SIZE_PX + CELL_GAP_PX;
        let color = palette[pulse.color % palette.len()];
        ctx.set_global_alpha(pulse.life as f64);
        ctx.set_shadow_color(color);
        ctx.set_shadow_blur(PULSE_BLUR_PX * pulse.life as f64);
        ctx.set_fill_style_str(color);
        ctx.fill_rect(x, y, inner, inner);
    }

    ctx.set_global_alpha(1.0);
    ctx.set_shadow_blur(0.0);
}
