//! Simulation engine for the perimeter-defense scenario.
//!
//! Owns the hecs ECS world, runs systems at a fixed tick rate,
//! and produces RenderSnapshots for the rendering adapter.

pub mod engine;
pub mod repository;
pub mod scenario;
pub mod systems;
pub mod validation;
pub mod world_setup;

pub use engine::{SimConfig, SimulationEngine};
pub use perimeter_core as core;
pub use repository::{InMemoryRepository, MissionRepository};
pub use scenario::ScenarioConfig;
