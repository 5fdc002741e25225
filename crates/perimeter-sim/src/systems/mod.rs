//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are free functions over `&mut World` (or `&World` for read-only)
//! plus the small controller structs the engine owns between ticks.

pub mod detection;
pub mod intruders;
pub mod navigation;
pub mod scan_schedule;
pub mod snapshot;
