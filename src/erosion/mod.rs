//! Hydraulic erosion engine.
//!
//! Water is moved with a virtual pipe model, dissolves and deposits terrain
//! according to the flow's sediment capacity, carries sediment
//! semi-Lagrangianly and evaporates; steep ridges are relaxed afterwards.
//! [`FluidSimulation`] runs the passes in order, one tick at a time.

mod config;
pub mod flow;
pub mod simulation;
pub mod sources;
pub mod surface;
pub mod transport;

pub use config::ErosionConfig;
pub use flow::Outflow;
pub use simulation::{FluidSimulation, SimulationError};
