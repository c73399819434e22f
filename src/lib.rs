pub mod autopilot;
pub mod config;
pub mod constants;
pub mod control_protocol;
pub mod engine;
pub mod grid;
pub mod logging;
pub mod rng;
pub mod roster;
pub mod scheduler;
pub mod types;
