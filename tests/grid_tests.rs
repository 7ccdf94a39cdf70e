// Host-side tests for the cell/pulse grid model.
// The main crate is wasm-only, so we include the pure core module directly.

#![allow(dead_code)]
mod grid {
    include!("../src/core/grid.rs");
}

use grid::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn tuning(spawn: f32, decay: f32) -> GridTuning {
    GridTuning {
        palette_len: 5,
        churn_fraction: 0.05,
        pulse_spawn_probability: spawn,
        pulse_decay_per_tick: decay,
    }
}

#[test]
fn regenerate_rebuilds_every_cell_for_the_new_size() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut g = GridModel::new(tuning(0.0, 0.02));
    g.regenerate(20, 10, &mut rng);
    assert_eq!(g.cells.len(), 200);
    assert_eq!((g.columns, g.rows), (20, 10));
    for cell in &g.cells {
        assert!(cell.column < 20 && cell.row < 10);
        assert!(cell.color < 5);
        assert!(cell.intensity >= 0.0 && cell.intensity <= 1.0);
    }

    // Resizing drops everything, pulses included
    g.pulses.push(Pulse {
        column: 19,
        row: 9,
        life: 1.0,
        color: 0,
    });
    g.regenerate(4, 4, &mut rng);
    assert_eq!(g.cells.len(), 16);
    assert!(g.pulses.is_empty());
}

#[test]
fn regenerate_clamps_degenerate_sizes() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut g = GridModel::new(tuning(0.0, 0.02));
    g.regenerate(0, 0, &mut rng);
    assert_eq!((g.columns, g.rows), (1, 1));
    assert_eq!(g.cells.len(), 1);
}

#[test]
fn tick_churns_a_small_bounded_subset() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut g = GridModel::new(tuning(0.0, 0.02));
    g.regenerate(20, 20, &mut rng);
    let before: Vec<(usize, f32)> = g.cells.iter().map(|c| (c.color, c.intensity)).collect();
    g.tick(&mut rng);
    let changed = g
        .cells
        .iter()
        .zip(&before)
        .filter(|(c, (color, intensity))| c.color != *color || c.intensity != *intensity)
        .count();
    // 5% of 400 cells, drawn with replacement: at most 20 change, and a
    // re-rolled intensity matching its old f32 value is vanishingly unlikely
    assert!(changed >= 1, "tick changed nothing");
    assert!(changed <= 20, "tick changed {changed} cells, expected <= 20");
    for cell in &g.cells {
        assert!(cell.intensity >= 0.0 && cell.intensity <= 1.0);
    }
}

#[test]
fn pulses_decay_linearly_and_compact_at_zero() {
    let mut rng = StdRng::seed_from_u64(1);
    // Spawn probability 1: every tick adds exactly one pulse
    let mut g = GridModel::new(tuning(1.0, 0.25));
    g.regenerate(8, 8, &mut rng);

    g.tick(&mut rng);
    assert_eq!(g.pulses.len(), 1);
    assert!((g.pulses[0].life - 0.75).abs() < 1e-6);

    g.tick(&mut rng);
    assert_eq!(g.pulses.len(), 2);

    // After four ticks the first pulse hits zero and is removed
    g.tick(&mut rng);
    g.tick(&mut rng);
    assert_eq!(g.pulses.len(), 3);
    for p in &g.pulses {
        assert!(p.life > 0.0, "dead pulse survived compaction");
        assert!(p.column < 8 && p.row < 8);
    }
}

#[test]
fn zero_spawn_probability_never_spawns() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut g = GridModel::new(tuning(0.0, 0.02));
    g.regenerate(10, 10, &mut rng);
    for _ in 0..100 {
        g.tick(&mut rng);
    }
    assert!(g.pulses.is_empty());
}
