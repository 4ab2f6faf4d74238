//! Noise generation module for terrain synthesis.
//!
//! Uses simdnoise for SIMD-accelerated gradient noise.

mod fractal;

pub use fractal::{sample_octave_grid, TerrainNoiseConfig};
