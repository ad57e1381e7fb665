pub mod constants;
pub mod engine;
pub mod equation;
pub mod geometry;
pub mod layout;
pub mod player;
pub mod rng;
pub mod room;
pub mod scheduler;
pub mod server_protocol;
pub mod server_utils;
pub mod types;
