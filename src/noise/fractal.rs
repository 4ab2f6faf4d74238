//! Multi-octave gradient noise sampled over a whole grid.

use serde::{Deserialize, Serialize};
use simdnoise::NoiseBuilder;

use crate::grid::Grid;

/// Configuration for octave-summed terrain noise.
///
/// Unlike a normalised fBm, the octaves are summed raw and the total is
/// multiplied by `scale`, so the amplitude of the result grows with
/// `persistence`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainNoiseConfig {
    /// Number of noise octaves.
    pub octaves: u8,
    /// Frequency of the first octave, in cycles per cell.
    pub frequency: f32,
    /// Frequency multiplier per octave.
    pub lacunarity: f32,
    /// Amplitude multiplier per octave.
    pub persistence: f32,
    /// Multiplier applied to the octave sum.
    pub scale: f32,
    /// Random seed for reproducible generation.
    pub seed: i32,
}

impl Default for TerrainNoiseConfig {
    /// Four octaves starting at 0.05 cycles/cell, each at half the frequency
    /// and twice the amplitude of the previous one, scaled by 4 * 1.3.
    fn default() -> Self {
        Self {
            octaves: 4,
            frequency: 0.05,
            lacunarity: 0.5,
            persistence: 2.0,
            scale: 5.2,
            seed: 0,
        }
    }
}

impl TerrainNoiseConfig {
    /// Creates the default rolling-hills configuration with the given seed.
    pub fn with_seed(seed: i32) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }
}

/// Samples octave noise for every cell of a `width x height` grid.
///
/// Cell `(row, col)` receives `scale * Σ noise(row·f, col·f)·amp`. The
/// noise generator is seeded only from `config.seed`, so equal configs give
/// bitwise equal grids.
pub fn sample_octave_grid(width: usize, height: usize, config: &TerrainNoiseConfig) -> Grid<f32> {
    let mut out = Grid::new(width, height);
    if width == 0 || height == 0 {
        return out;
    }

    let mut amplitude = 1.0f32;
    let mut frequency = config.frequency;

    for _ in 0..config.octaves {
        // simdnoise walks x fastest, matching row-major storage with col = x, row = y
        let (octave, _min, _max) = NoiseBuilder::gradient_2d_offset(0.0, width, 0.0, height)
            .with_seed(config.seed)
            .with_freq(frequency)
            .generate();

        for (h, n) in out.as_mut_slice().iter_mut().zip(octave) {
            *h += n * amplitude;
        }

        amplitude *= config.persistence;
        frequency *= config.lacunarity;
    }

    for h in out.as_mut_slice() {
        *h *= config.scale;
    }

    out
}
