//! Trackdrive - a small 3D driving game on a procedurally dressed loop.
//!
//! The simulation core (track curve, road geometry, obstacle placement,
//! car dynamics, collisions and knockdowns) is plain Rust over Bevy math
//! types and runs without an `App`. The Bevy plugins build a session from
//! the config resources at startup and tick it once per frame.

pub mod camera;
pub mod game_state;
pub mod procgen;
pub mod render;
pub mod simulation;
pub mod ui;
pub mod world;
