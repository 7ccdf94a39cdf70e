// Tiled cell/pulse model behind the render loop.
//
// Cells are regenerated wholesale on resize and mutated stochastically each
// tick; pulses spawn probabilistically, decay linearly and are compacted out
// once dead. Colors are palette indices; the palette itself lives web-side.

use rand::prelude::*;

#[derive(Clone, Copy, Debug)]
pub struct GridCell {
    pub column: u32,
    pub row: u32,
    pub color: usize,
    /// Brightness in [0, 1].
    pub intensity: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct Pulse {
    pub column: u32,
    pub row: u32,
    /// Remaining life in (0, 1]; the pulse is removed once it reaches zero.
    pub life: f32,
    pub color: usize,
}

#[derive(Clone, Copy, Debug)]
pub struct GridTuning {
    pub palette_len: usize,
    /// Fraction of cells re-rolled per tick.
    pub churn_fraction: f32,
    /// Chance of spawning one pulse per tick.
    pub pulse_spawn_probability: f32,
    /// Linear life decay per tick.
    pub pulse_decay_per_tick: f32,
}

pub struct GridModel {
    pub columns: u32,
    pub rows: u32,
    pub cells: Vec<GridCell>,
    pub pulses: Vec<Pulse>,
    tuning: GridTuning,
}

impl GridModel {
    pub fn new(tuning: GridTuning) -> Self {
        Self {
            columns: 0,
            rows: 0,
            cells: Vec::new(),
            pulses: Vec::new(),
            tuning,
        }
    }

    /// Rebuild every cell for a new surface size. Pulses do not survive a
    /// resize; their coordinates may no longer exist.
    pub fn regenerate(&mut self, columns: u32, rows: u32, rng: &mut impl Rng) {
        self.columns = columns.max(1);
        self.rows = rows.max(1);
        self.pulses.clear();
        self.cells.clear();
        self.cells
            .reserve((self.columns * self.rows) as usize);
        for row in 0..self.rows {
            for column in 0..self.columns {
                self.cells.push(GridCell {
                    column,
                    row,
                    color: rng.gen_range(0..self.tuning.palette_len),
                    intensity: rng.gen_range(0.05..=1.0),
                });
            }
        }
    }

    /// One animation tick: re-roll a small random subset of cells, maybe
    /// spawn a pulse, decay and compact the existing pulses.
    pub fn tick(&mut self, rng: &mut impl Rng) {
        if self.cells.is_empty() {
            return;
        }
        let churn = ((self.cells.len() as f32 * self.tuning.churn_fraction) as usize).max(1);
        for _ in 0..churn {
            let i = rng.gen_range(0..self.cells.len());
            self.cells[i].color = rng.gen_range(0..self.tuning.palette_len);
            self.cells[i].intensity = rng.gen_range(0.05..=1.0);
        }

        if rng.gen::<f32>() < self.tuning.pulse_spawn_probability {
            self.pulses.push(Pulse {
                column: rng.gen_range(0..self.columns),
                row: rng.gen_range(0..self.rows),
                life: 1.0,
                color: rng.gen_range(0..self.tuning.palette_len),
            });
        }

        let decay = self.tuning.pulse_decay_per_tick;
        for p in &mut self.pulses {
            p.life -= decay;
        }
        self.pulses.retain(|p| p.life > 0.0);
    }
}
