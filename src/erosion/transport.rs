//! Sediment exchange with the terrain and transport by the flow.

use glam::{Vec2, Vec3};

use crate::erosion::ErosionConfig;
use crate::grid::Grid;
use crate::parallel::Executor;

/// Terrain-to-sediment exchange of one cell.
///
/// Positive values dissolve terrain into the flow, negative values deposit
/// sediment. The returned amount is removed from the terrain and added to
/// both water and sediment.
fn exchange(
    terrain: &Grid<f32>,
    row: usize,
    col: usize,
    water: f32,
    sediment: f32,
    velocity: Vec2,
    config: &ErosionConfig,
) -> f32 {
    let (r, c) = (row as isize, col as isize);
    let normal = Vec3::new(
        terrain.sample_clamped(r, c + 1) - terrain.sample_clamped(r, c - 1),
        terrain.sample_clamped(r + 1, c) - terrain.sample_clamped(r - 1, c),
        2.0,
    )
    .normalize();

    // sine of the angle between the terrain normal and vertical
    let tilt_sine = (1.0 - normal.z * normal.z).max(0.0).sqrt().max(config.min_tilt_sine);
    let depth_factor = water.min(config.capacity_depth) / config.capacity_depth;
    let capacity = config.sediment_capacity * velocity.length() * tilt_sine * depth_factor;

    let delta = capacity - sediment;
    if delta > 0.0 {
        config.dissolving_rate * delta
    } else if delta < 0.0 {
        // cannot deposit more than the water column holds
        (config.deposition_rate * delta).max(-water)
    } else {
        0.0
    }
}

/// Dissolves terrain into suspended sediment where the flow has spare
/// capacity and deposits sediment where it carries too much.
///
/// The exchange of every cell is computed into `scratch` from the committed
/// terrain first, then applied, so `Δterrain = -Δwater = -Δsediment` per cell.
pub fn erode_and_deposit<E: Executor>(
    exec: &E,
    terrain: &mut Grid<f32>,
    water: &mut Grid<f32>,
    sediment: &mut Grid<f32>,
    velocity: &Grid<Vec2>,
    scratch: &mut Grid<f32>,
    config: &ErosionConfig,
) {
    let width = terrain.width();

    {
        let terrain: &Grid<f32> = terrain;
        let water: &Grid<f32> = water;
        let sediment: &Grid<f32> = sediment;
        exec.for_each_row(scratch.as_mut_slice(), width, |row, amounts| {
            for (col, d) in amounts.iter_mut().enumerate() {
                *d = exchange(
                    terrain,
                    row,
                    col,
                    water.get(row, col),
                    sediment.get(row, col),
                    velocity.get(row, col),
                    config,
                );
            }
        });
    }

    let amounts: &Grid<f32> = scratch;
    exec.for_each_row3(
        terrain.as_mut_slice(),
        water.as_mut_slice(),
        sediment.as_mut_slice(),
        width,
        |row, t, w, s| {
            for col in 0..t.len() {
                let d = amounts.get(row, col);
                t[col] -= d;
                w[col] += d;
                s[col] += d;
            }
        },
    );
}

/// Semi-Lagrangian advection of suspended sediment.
///
/// Each cell traces back along its velocity by `dt`, bilinearly samples the
/// sediment around the source point (corners clamped to the grid) into
/// `scratch`, and the buffers are swapped once every cell is done.
pub fn advect_sediment<E: Executor>(
    exec: &E,
    sediment: &mut Grid<f32>,
    velocity: &Grid<Vec2>,
    scratch: &mut Grid<f32>,
    dt: f32,
) {
    let width = sediment.width();

    {
        let source: &Grid<f32> = sediment;
        exec.for_each_row(scratch.as_mut_slice(), width, |row, out| {
            for (col, value) in out.iter_mut().enumerate() {
                let v = velocity.get(row, col);
                let from_x = col as f32 - v.x * dt;
                let from_y = row as f32 - v.y * dt;

                let x0f = from_x.floor();
                let y0f = from_y.floor();
                let fx = from_x - x0f;
                let fy = from_y - y0f;

                let x0 = x0f as isize;
                let y0 = y0f as isize;
                let x1 = x0.saturating_add(1);
                let y1 = y0.saturating_add(1);

                let bottom = lerp(source.sample_clamped(y0, x0), source.sample_clamped(y0, x1), fx);
                let top = lerp(source.sample_clamped(y1, x0), source.sample_clamped(y1, x1), fx);
                *value = lerp(bottom, top, fy);
            }
        });
    }

    std::mem::swap(sediment, scratch);
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
