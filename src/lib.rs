//! Grid-based hydraulic erosion.
//!
//! This crate evolves a heightfield terrain together with an overlying water
//! layer and suspended sediment using an explicit-time-step virtual pipe
//! model: stability-limited outflow, capacity-driven erosion and deposition,
//! semi-Lagrangian sediment transport, evaporation, ridge smoothing and
//! surface normals.

pub mod grid;
pub mod parallel;
pub mod noise;
pub mod terrain;
pub mod erosion;

pub use grid::Grid;
pub use parallel::{Executor, Serial, Threaded};
pub use noise::TerrainNoiseConfig;
pub use terrain::{FieldStats, SimulationState, StateError};
pub use erosion::{ErosionConfig, FluidSimulation, SimulationError};
