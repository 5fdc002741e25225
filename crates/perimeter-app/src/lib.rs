//! PERIMETER driver.
//!
//! Wires the headless engine to a fixed-rate loop thread, a persistence
//! writer thread, a mission store client and the render adapters.

pub mod game_loop;
pub mod http_repository;
pub mod persistence;
pub mod render;
pub mod state;

pub use perimeter_core as core;
