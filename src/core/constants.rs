// Shared timing, pattern and persistence constants used by the engines and
// the loader. Keeping magic numbers out of the code paths that use them.

// Sequencer timing
pub const BPM: f64 = 104.0;

// Lookahead scheduling: how far ahead of the audio clock events are queued,
// and how often the wall-clock poll re-checks it. The window must comfortably
// exceed the poll interval so a delayed poll never causes an audible gap.
pub const LOOKAHEAD_SEC: f64 = 0.1;
pub const POLL_INTERVAL_MS: i32 = 25;

// Secret key sequence that toggles audio in the active engine
pub const SECRET_CODE: &str = "dance";

// Grid churn tuning (per render tick)
pub const CELL_CHURN_FRACTION: f32 = 0.05;
pub const PULSE_DECAY_PER_TICK: f32 = 0.02;

// Persistence and provisioning
pub const ENGINE_PREF_KEY: &str = "fx.engine";
pub const ENTITLEMENTS_KEY: &str = "fx.entitlements";
pub const UPGRADE_PATH: &str = "/upgrade";

pub const DEFAULT_ENGINE: &str = "pulsegrid";
