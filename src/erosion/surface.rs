//! Evaporation, terrain relaxation and surface normals.

use glam::Vec3;

use crate::erosion::ErosionConfig;
use crate::grid::Grid;
use crate::parallel::Executor;

/// Scales every depth by `max(0, 1 - Ke·dt)` and dries out cells below
/// `config.dry_threshold`.
pub fn evaporate<E: Executor>(exec: &E, water: &mut Grid<f32>, dt: f32, config: &ErosionConfig) {
    let factor = (1.0 - config.evaporation_rate * dt).max(0.0);
    let threshold = config.dry_threshold;
    let width = water.width();

    exec.for_each_row(water.as_mut_slice(), width, |_, depths| {
        for w in depths.iter_mut() {
            *w = (*w * factor).max(0.0);
            if *w < threshold {
                *w = 0.0;
            }
        }
    });
}

/// Relaxes ridges steeper than `config.talus_threshold`.
///
/// A cell sitting on a ridge along x (both horizontal differences share a
/// sign and one exceeds the threshold) is replaced by the mean of itself and
/// its four neighbours. Cells not on an x ridge get the same test along y.
/// Local extrema and plain slopes are left alone. Results go to `scratch`
/// and are swapped in once every cell is done.
pub fn smooth_terrain<E: Executor>(
    exec: &E,
    terrain: &mut Grid<f32>,
    scratch: &mut Grid<f32>,
    config: &ErosionConfig,
) {
    let max_diff = config.talus_threshold;
    let width = terrain.width();

    {
        let source: &Grid<f32> = terrain;
        exec.for_each_row(scratch.as_mut_slice(), width, |row, out| {
            let r = row as isize;
            for (col, value) in out.iter_mut().enumerate() {
                let c = col as isize;
                let h = source.get(row, col);
                let hl = source.sample_clamped(r, c - 1);
                let hr = source.sample_clamped(r, c + 1);
                let ht = source.sample_clamped(r + 1, c);
                let hb = source.sample_clamped(r - 1, c);

                let (dl, dr) = (h - hl, h - hr);
                let (dt, db) = (h - ht, h - hb);

                let ridge_x = (dl.abs() > max_diff || dr.abs() > max_diff) && dl * dr > 0.0;
                let ridge_y = (dt.abs() > max_diff || db.abs() > max_diff) && dt * db > 0.0;

                *value = if ridge_x || ridge_y {
                    (h + hl + hr + ht + hb) / 5.0
                } else {
                    h
                };
            }
        });
    }

    std::mem::swap(terrain, scratch);
}

/// Recomputes the unit normal of the water surface (`terrain + water`) from
/// central differences.
pub fn compute_surface_normals<E: Executor>(
    exec: &E,
    terrain: &Grid<f32>,
    water: &Grid<f32>,
    normals: &mut Grid<Vec3>,
) {
    let width = terrain.width();
    let surface = |r: isize, c: isize| terrain.sample_clamped(r, c) + water.sample_clamped(r, c);

    exec.for_each_row(normals.as_mut_slice(), width, |row, out| {
        let r = row as isize;
        for (col, n) in out.iter_mut().enumerate() {
            let c = col as isize;
            let left = surface(r, c - 1);
            let right = surface(r, c + 1);
            let top = surface(r + 1, c);
            let bottom = surface(r - 1, c);
            *n = Vec3::new(left - right, bottom - top, 2.0).normalize();
        }
    });
}
