//! Erosion configuration.

use serde::{Deserialize, Serialize};

/// Physical and numerical constants of the erosion model.
///
/// The defaults are tuned for a host loop stepping `dt = 1000 / 60` per frame
/// on a grid with unit cell spacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErosionConfig {
    /// Cell spacing along x (columns).
    pub cell_size_x: f32,
    /// Cell spacing along y (rows).
    pub cell_size_y: f32,
    /// Gravitational acceleration.
    pub gravity: f32,
    /// Cross-section of the virtual pipe between two cells (A).
    pub pipe_area: f32,
    /// Length of the virtual pipe between two cells (L).
    pub pipe_length: f32,

    /// Sediment capacity constant (Kc).
    pub sediment_capacity: f32,
    /// Dissolving constant (Ks).
    pub dissolving_rate: f32,
    /// Deposition constant (Kd).
    pub deposition_rate: f32,
    /// Evaporation constant (Ke), per unit time.
    pub evaporation_rate: f32,

    /// Water depth at which transport capacity stops growing with depth.
    pub capacity_depth: f32,
    /// Lower bound of `sin(tilt)` so flat ground still carries sediment.
    pub min_tilt_sine: f32,
    /// Depth below which water is removed after evaporation.
    pub dry_threshold: f32,
    /// Neighbour height difference above which a ridge is smoothed.
    pub talus_threshold: f32,

    /// Raindrops added per tick when rain is on.
    pub raindrops_per_tick: u32,
    /// Radius of the flood source, in cells.
    pub flood_radius: i32,
    /// Flood amount per unit time; a tick adds `flood_rate * dt * (r² - d²)`.
    pub flood_rate: f32,
    /// Seed of the rain position generator.
    pub rain_seed: u64,
}

impl Default for ErosionConfig {
    fn default() -> Self {
        Self {
            cell_size_x: 1.0,
            cell_size_y: 1.0,
            gravity: 9.81,
            pipe_area: 0.00005,
            pipe_length: 1.0,

            sediment_capacity: 25.0,
            dissolving_rate: 0.0012,
            deposition_rate: 0.0012,
            evaporation_rate: 0.000055,

            capacity_depth: 0.01,
            min_tilt_sine: 0.1,
            dry_threshold: 0.005,
            talus_threshold: 0.2,

            raindrops_per_tick: 100,
            flood_radius: 10,
            flood_rate: 0.01,
            rain_seed: 0,
        }
    }
}

impl ErosionConfig {
    /// Returns the same configuration with erosion and deposition switched off.
    pub fn without_erosion(self) -> Self {
        Self {
            dissolving_rate: 0.0,
            deposition_rate: 0.0,
            ..self
        }
    }

    /// Area of one cell (`dx * dy`).
    #[inline]
    pub fn cell_area(&self) -> f32 {
        self.cell_size_x * self.cell_size_y
    }

    /// Checks that every constant is finite and in range.
    pub fn validate(&self) -> Result<(), String> {
        let positive = [
            ("cell_size_x", self.cell_size_x),
            ("cell_size_y", self.cell_size_y),
            ("gravity", self.gravity),
            ("pipe_area", self.pipe_area),
            ("pipe_length", self.pipe_length),
            ("capacity_depth", self.capacity_depth),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{name} must be finite and > 0, got {value}"));
            }
        }

        let non_negative = [
            ("sediment_capacity", self.sediment_capacity),
            ("dissolving_rate", self.dissolving_rate),
            ("deposition_rate", self.deposition_rate),
            ("evaporation_rate", self.evaporation_rate),
            ("min_tilt_sine", self.min_tilt_sine),
            ("dry_threshold", self.dry_threshold),
            ("talus_threshold", self.talus_threshold),
            ("flood_rate", self.flood_rate),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be finite and >= 0, got {value}"));
            }
        }

        if self.dissolving_rate > 1.0 || self.deposition_rate > 1.0 {
            return Err("dissolving_rate and deposition_rate must be <= 1".to_string());
        }
        if self.min_tilt_sine > 1.0 {
            return Err(format!("min_tilt_sine must be <= 1, got {}", self.min_tilt_sine));
        }
        if self.flood_radius < 0 {
            return Err(format!("flood_radius must be >= 0, got {}", self.flood_radius));
        }
        Ok(())
    }
}
