//! Simulation state and terrain generation.
//!
//! [`SimulationState`] owns the terrain, water, sediment and normal grids;
//! the generators here seed its initial terrain.

mod heightmap;
mod state;

pub use heightmap::{generate_heightmap, generate_steep_terrain};
pub use state::{FieldStats, SimulationState, StateError};
