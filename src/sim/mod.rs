pub mod factory;
pub mod performance;
pub mod respawn;
pub mod spatial;
pub mod step;
pub mod systems;
pub mod token;

pub use step::{FrameStats, PointerState, Simulation};
pub use token::{Token, TokenState};
