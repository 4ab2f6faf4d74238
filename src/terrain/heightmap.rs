//! Initial terrain generators.

use crate::noise::{sample_octave_grid, TerrainNoiseConfig};
use super::state::SimulationState;

/// Slope of the pyramid produced by [`generate_steep_terrain`], in height per cell.
const STEEP_SLOPE: f32 = 0.2;

/// Fills the terrain with octave noise and clears water and sediment.
///
/// # Arguments
/// * `state` - The state whose terrain is replaced
/// * `config` - Octave noise configuration (seed included)
pub fn generate_heightmap(state: &mut SimulationState, config: &TerrainNoiseConfig) {
    let heights = sample_octave_grid(state.width(), state.height(), config);
    state.terrain.as_mut_slice().copy_from_slice(heights.as_slice());
    state.clear_fluids();
    log::debug!(
        "generated {}x{} noise terrain (seed {}, {} octaves)",
        state.width(),
        state.height(),
        config.seed,
        config.octaves
    );
}

/// Fills the terrain with a pyramid centred on the grid and clears water and
/// sediment.
///
/// Each cell gets `0.2 * max(|col - W/2|, |row - H/2|)` (integer halves), so
/// water poured anywhere runs down four straight faces.
pub fn generate_steep_terrain(state: &mut SimulationState) {
    let cx = (state.width() / 2) as f32;
    let cy = (state.height() / 2) as f32;
    let width = state.width();

    for (i, h) in state.terrain.as_mut_slice().iter_mut().enumerate() {
        let col = (i % width) as f32;
        let row = (i / width) as f32;
        *h = STEEP_SLOPE * (col - cx).abs().max((row - cy).abs());
    }
    state.clear_fluids();
}

impl SimulationState {
    /// Replaces the terrain with reproducible rolling hills.
    ///
    /// Four octaves of gradient noise starting at 0.05 cycles/cell, each at
    /// half the frequency and twice the amplitude of the previous one; the
    /// sum is scaled by 5.2. Water and sediment are reset to zero.
    pub fn create_procedural_terrain(&mut self, seed: i32) {
        generate_heightmap(self, &TerrainNoiseConfig::with_seed(seed));
    }

    /// Replaces the terrain using a custom noise configuration.
    pub fn create_terrain_with(&mut self, config: &TerrainNoiseConfig) {
        generate_heightmap(self, config);
    }

    /// Replaces the terrain with a centred pyramid.
    pub fn create_steep_terrain(&mut self) {
        generate_steep_terrain(self);
    }
}
