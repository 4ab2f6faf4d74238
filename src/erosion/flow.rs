//! Virtual-pipe water flow.
//!
//! Each cell is connected to its four neighbours by pipes. The outflow flux
//! through a pipe is accelerated by the difference in water surface height
//! (`terrain + water`), never negative, and scaled so that a cell cannot ship
//! more water in one step than it holds. Water depth is then updated from the
//! net flux and the flux balance yields the velocity field.
//!
//! Directions: `left` is column - 1, `right` column + 1, `bottom` row - 1,
//! `top` row + 1.

use glam::Vec2;

use crate::erosion::ErosionConfig;
use crate::grid::Grid;
use crate::parallel::Executor;

/// Outflow flux of one cell towards each neighbour.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Outflow {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Outflow {
    #[inline]
    pub fn total(&self) -> f32 {
        self.left + self.right + self.top + self.bottom
    }

    #[inline]
    fn scaled(self, k: f32) -> Self {
        Self {
            left: self.left * k,
            right: self.right * k,
            top: self.top * k,
            bottom: self.bottom * k,
        }
    }
}

/// Reads the flux of `(row, col)`, or zero if it lies off the grid.
#[inline]
fn flux_or_zero(flux: &Grid<Outflow>, row: isize, col: isize) -> Outflow {
    if row < 0 || col < 0 || row >= flux.height() as isize || col >= flux.width() as isize {
        Outflow::default()
    } else {
        flux.get(row as usize, col as usize)
    }
}

/// Updates the outflow flux of every cell.
///
/// `flux' = max(0, flux + dt·A·g/L·(h_self - h_neighbour))` for each neighbour
/// on the grid; flux towards the outside is 0. The four fluxes are then
/// multiplied by `K = min(1, water·dx·dy / (Σflux·dt))`.
pub fn update_outflow<E: Executor>(
    exec: &E,
    terrain: &Grid<f32>,
    water: &Grid<f32>,
    flux: &mut Grid<Outflow>,
    dt: f32,
    config: &ErosionConfig,
) {
    let width = terrain.width();
    let height = terrain.height();
    let factor = dt * config.pipe_area * config.gravity / config.pipe_length;
    let cell_area = config.cell_area();

    let surface = |row: usize, col: usize| terrain.get(row, col) + water.get(row, col);

    exec.for_each_row(flux.as_mut_slice(), width, |row, cells| {
        for (col, f) in cells.iter_mut().enumerate() {
            let h0 = surface(row, col);
            let pipe = |old: f32, neighbour: f32| (old + factor * (h0 - neighbour)).max(0.0);

            let mut next = Outflow {
                left: if col > 0 { pipe(f.left, surface(row, col - 1)) } else { 0.0 },
                right: if col + 1 < width { pipe(f.right, surface(row, col + 1)) } else { 0.0 },
                bottom: if row > 0 { pipe(f.bottom, surface(row - 1, col)) } else { 0.0 },
                top: if row + 1 < height { pipe(f.top, surface(row + 1, col)) } else { 0.0 },
            };

            let shipped = next.total() * dt;
            if shipped > 0.0 {
                let available = water.get(row, col).max(0.0) * cell_area;
                let k = (available / shipped).min(1.0);
                next = next.scaled(k);
            }
            *f = next;
        }
    });
}

/// Moves water by the net flux and derives the velocity field.
///
/// Velocity uses the mean of the depths before and after the update; a cell
/// whose mean depth is 0 gets zero velocity.
pub fn update_water_and_velocity<E: Executor>(
    exec: &E,
    flux: &Grid<Outflow>,
    water: &mut Grid<f32>,
    velocity: &mut Grid<Vec2>,
    dt: f32,
    config: &ErosionConfig,
) {
    let width = flux.width();
    let dx = config.cell_size_x;
    let dy = config.cell_size_y;
    let cell_area = config.cell_area();

    exec.for_each_row2(
        water.as_mut_slice(),
        velocity.as_mut_slice(),
        width,
        |row, depths, velocities| {
            let r = row as isize;
            for col in 0..depths.len() {
                let c = col as isize;
                let here = flux.get(row, col);
                let from_left = flux_or_zero(flux, r, c - 1);
                let from_right = flux_or_zero(flux, r, c + 1);
                let from_below = flux_or_zero(flux, r - 1, c);
                let from_above = flux_or_zero(flux, r + 1, c);

                let inflow = from_left.right + from_right.left + from_below.top + from_above.bottom;
                let outflow = here.total();

                let before = depths[col];
                let after = (before + dt * (inflow - outflow) / cell_area).max(0.0);
                depths[col] = after;

                let mean = 0.5 * (before + after);
                velocities[col] = if mean == 0.0 {
                    Vec2::ZERO
                } else {
                    Vec2::new(
                        0.5 * (from_left.right - here.left - from_right.left + here.right) / (dy * mean),
                        0.5 * (from_below.top - here.bottom - from_above.bottom + here.top) / (dx * mean),
                    )
                };
            }
        },
    );
}
