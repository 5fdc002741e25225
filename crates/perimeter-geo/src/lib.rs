//! Geospatial math for the perimeter simulation.
//!
//! Spherical distance and bearing, the grid-reference codec and the
//! viewport grid overlay. Everything here is pure and deterministic.

pub use perimeter_core as core;

pub mod geodesy;
pub mod grid_layout;
pub mod grid_ref;

// Re-export key functions for convenience.
pub use geodesy::{bearing_between, destination_point, haversine_distance, heading_to_text};
pub use grid_layout::{choose_grid_step, grid_precision_for_step, layout_grid};
pub use grid_ref::{grid_reference, grid_reference_or_unknown};
