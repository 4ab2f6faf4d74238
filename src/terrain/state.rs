//! The four co-located simulation fields.

use glam::Vec3;
use thiserror::Error;

use crate::grid::Grid;

/// Errors raised while assembling a [`SimulationState`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("{field} grid is {found:?} but terrain is {expected:?} (width, height)")]
    DimensionMismatch {
        field: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },
}

/// Terrain, water, suspended sediment and surface normals over one grid.
///
/// All four grids always share the same dimensions.
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Terrain height in meters (any sign).
    pub(crate) terrain: Grid<f32>,
    /// Water depth in meters (>= 0).
    pub(crate) water: Grid<f32>,
    /// Suspended sediment (>= 0).
    pub(crate) sediment: Grid<f32>,
    /// Unit surface normal of terrain + water.
    pub(crate) normals: Grid<Vec3>,
}

/// Summary of the current fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldStats {
    pub terrain_min: f32,
    pub terrain_max: f32,
    pub total_water: f64,
    pub total_sediment: f64,
    /// Cells with water depth > 0.
    pub wet_cells: usize,
}

impl SimulationState {
    /// Creates flat, dry terrain with upward normals.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            terrain: Grid::new(width, height),
            water: Grid::new(width, height),
            sediment: Grid::new(width, height),
            normals: Grid::filled(width, height, Vec3::Z),
        }
    }

    /// Assembles a state from existing fields.
    ///
    /// Fails if water or sediment do not match the terrain's dimensions.
    pub fn from_grids(
        terrain: Grid<f32>,
        water: Grid<f32>,
        sediment: Grid<f32>,
    ) -> Result<Self, StateError> {
        let normals = Grid::filled(terrain.width(), terrain.height(), Vec3::Z);
        let state = Self {
            terrain,
            water,
            sediment,
            normals,
        };
        state.check_dimensions()?;
        Ok(state)
    }

    /// Verifies that all four fields share the terrain's dimensions.
    pub fn check_dimensions(&self) -> Result<(), StateError> {
        let expected = (self.terrain.width(), self.terrain.height());
        let fields = [
            ("water", (self.water.width(), self.water.height())),
            ("sediment", (self.sediment.width(), self.sediment.height())),
            ("normals", (self.normals.width(), self.normals.height())),
        ];
        for (field, found) in fields {
            if found != expected {
                return Err(StateError::DimensionMismatch {
                    field,
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.terrain.width()
    }

    pub fn height(&self) -> usize {
        self.terrain.height()
    }

    pub fn terrain(&self) -> &Grid<f32> {
        &self.terrain
    }

    pub fn water(&self) -> &Grid<f32> {
        &self.water
    }

    pub fn sediment(&self) -> &Grid<f32> {
        &self.sediment
    }

    pub fn normals(&self) -> &Grid<Vec3> {
        &self.normals
    }

    /// Mutable terrain access for seeding initial conditions.
    ///
    /// Resizing the returned grid breaks the shared-dimension invariant; use
    /// [`SimulationState::resize`] instead.
    pub fn terrain_mut(&mut self) -> &mut Grid<f32> {
        &mut self.terrain
    }

    /// Mutable water access for seeding initial conditions. Same caveat as
    /// [`SimulationState::terrain_mut`].
    pub fn water_mut(&mut self) -> &mut Grid<f32> {
        &mut self.water
    }

    pub fn sediment_mut(&mut self) -> &mut Grid<f32> {
        &mut self.sediment
    }

    /// Resizes all four fields and resets them to flat, dry terrain.
    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    /// Clears water and suspended sediment.
    pub fn clear_fluids(&mut self) {
        self.water.fill(0.0);
        self.sediment.fill(0.0);
    }

    pub fn stats(&self) -> FieldStats {
        let (terrain_min, terrain_max) = self.terrain.range();
        FieldStats {
            terrain_min,
            terrain_max,
            total_water: self.water.sum(),
            total_sediment: self.sediment.sum(),
            wet_cells: self.water.iter().filter(|&&w| w > 0.0).count(),
        }
    }
}
