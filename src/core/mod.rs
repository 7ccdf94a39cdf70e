pub mod clock;
pub mod constants;
pub mod grid;
pub mod registry;
pub mod secret;
pub mod sequencer;

pub use clock::*;
pub use constants::*;
pub use grid::*;
pub use registry::*;
pub use secret::*;
pub use sequencer::*;
