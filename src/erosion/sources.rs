//! Water sources: scattered rain and a circular flood drop.

use glam::IVec2;
use rand::Rng;

use crate::grid::Grid;

/// Water each raindrop adds to every cell of its 3x3 footprint.
///
/// A drop therefore injects 9/16 of a unit volume, not 1.
pub const RAINDROP_CELL_VOLUME: f32 = 1.0 / 16.0;

/// Drops `count` raindrops at uniformly random interior cells.
///
/// Each drop adds [`RAINDROP_CELL_VOLUME`] to its centre and to each of the 8
/// neighbours. Centres are drawn from columns `1..=W-2` and rows `1..=H-2`
/// so the footprint never leaves the grid. Returns `false` without touching
/// `rng` when the grid has no interior (W or H below 3).
pub fn make_rain<R: Rng + ?Sized>(water: &mut Grid<f32>, rng: &mut R, count: u32) -> bool {
    let (width, height) = (water.width(), water.height());
    if width < 3 || height < 3 {
        return false;
    }

    for _ in 0..count {
        let col = rng.gen_range(1..=width - 2);
        let row = rng.gen_range(1..=height - 2);
        for r in row - 1..=row + 1 {
            for c in col - 1..=col + 1 {
                water[(r, c)] += RAINDROP_CELL_VOLUME;
            }
        }
    }
    true
}

/// Adds a circular drop of water centred on `center` (x = column, y = row).
///
/// Every in-grid cell at squared distance `d² <= radius²` from the centre
/// receives `amount * (radius² - d²)`. Cells of the disc that fall outside
/// the grid are skipped.
pub fn add_water_drop(water: &mut Grid<f32>, center: IVec2, radius: i32, amount: f32) {
    let r2 = radius as i64 * radius as i64;
    let (width, height) = (water.width() as i64, water.height() as i64);

    for dy in -radius..=radius {
        let row = center.y as i64 + dy as i64;
        if row < 0 || row >= height {
            continue;
        }
        for dx in -radius..=radius {
            let col = center.x as i64 + dx as i64;
            if col < 0 || col >= width {
                continue;
            }
            let d2 = dx as i64 * dx as i64 + dy as i64 * dy as i64;
            if d2 <= r2 {
                water[(row as usize, col as usize)] += amount * (r2 - d2) as f32;
            }
        }
    }
}

/// Total volume [`add_water_drop`] injects into a `width x height` grid.
pub fn water_drop_volume(width: usize, height: usize, center: IVec2, radius: i32, amount: f32) -> f64 {
    let r2 = radius as i64 * radius as i64;
    let mut total = 0.0f64;
    for row in 0..height as i64 {
        for col in 0..width as i64 {
            let dx = col - center.x as i64;
            let dy = row - center.y as i64;
            let d2 = dx * dx + dy * dy;
            if d2 <= r2 {
                total += (amount * (r2 - d2) as f32) as f64;
            }
        }
    }
    total
}
