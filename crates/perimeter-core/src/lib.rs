//! Core types and definitions for the PERIMETER simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! geographic types, components, commands, render snapshots, events,
//! persistence records, errors and constants.
//! It has no dependency on any runtime, rendering or network framework.

pub mod commands;
pub mod components;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod persistence;
pub mod state;
pub mod types;
