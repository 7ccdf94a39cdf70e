// Web-layer tuning constants: cell geometry, glow, element ids, seeds.

// Cell geometry (CSS-pixel-ish; the grid derives its dimensions from the
// canvas backing size divided by this)
pub const CELL_SIZE_PX: f64 = 28.0;
pub const CELL_GAP_PX: f64 = 2.0;

// Glow pass
pub const GLOW_INTENSITY_THRESHOLD: f32 = 0.75;
pub const GLOW_BLUR_PX: f64 = 14.0;
pub const PULSE_BLUR_PX: f64 = 18.0;

// Base cell dimming relative to full intensity
pub const CELL_ALPHA_SCALE: f64 = 0.6;

// Host elements. The stage container is optional; engines fall back to the
// document body.
pub const STAGE_CONTAINER_ID: &str = "fx-stage";
pub const SELECT_ID: &str = "fx-engine-select";

// Deterministic grid seed, per-engine offsets applied on top
pub const GRID_SEED: u64 = 42;

// Audio levels
pub const MASTER_GAIN: f32 = 0.8;
