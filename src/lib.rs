//! Token Simulation Engine
//!
//! A frame-stepped 2D simulation of independent "token" entities that move,
//! collide, flock, and respawn inside a bounded canvas. The host owns the
//! frame clock and calls [`sim::Simulation::step`] once per frame with the
//! elapsed time and pointer state; the engine mutates the entity slot array
//! in place. Rendering and host embedding are strictly downstream consumers
//! of the resulting slot array.

pub mod config;
pub mod sim;
pub mod util;
