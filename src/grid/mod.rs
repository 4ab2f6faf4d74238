//! Dense 2D field storage.
//!
//! Every simulation field (terrain, water, sediment, normals, fluxes) lives in
//! a [`Grid`]: a flat row-major `Vec<T>` addressed by `(row, col)` or by linear
//! index. Plain indexing is not clamped; passes that may step off the grid go
//! through [`Grid::sample_clamped`].

use std::ops::{Index, IndexMut};

/// Row-major 2D grid with fixed element type.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    /// Creates a `width x height` grid filled with `T::default()`.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, T::default())
    }

    /// Resizes the grid to `width x height`.
    ///
    /// The linear prefix of the old data is kept and new cells are
    /// default-filled, so cell `(row, col)` only keeps its value when the
    /// width is unchanged.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.data.resize(width * height, T::default());
    }
}

impl<T: Clone> Grid<T> {
    /// Creates a `width x height` grid with every cell set to `value`.
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Sets every cell to `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T> Grid<T> {
    /// Wraps existing row-major data.
    ///
    /// Returns `None` if `data.len() != width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Option<Self> {
        if data.len() != width * height {
            return None;
        }
        Some(Self { width, height, data })
    }

    /// Number of columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells (`width * height`).
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns true if `other` has the same width and height.
    pub fn same_shape<U>(&self, other: &Grid<U>) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Linear index of `(row, col)`.
    #[inline]
    pub fn index_of(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.height && col < self.width);
        row * self.width + col
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T: Copy> Grid<T> {
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[self.index_of(row, col)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        let i = self.index_of(row, col);
        self.data[i] = value;
    }

    #[inline]
    pub fn get_index(&self, i: usize) -> T {
        self.data[i]
    }

    #[inline]
    pub fn set_index(&mut self, i: usize, value: T) {
        self.data[i] = value;
    }

    /// Reads `(row, col)` with both coordinates clamped into the grid.
    ///
    /// The grid must not be empty.
    #[inline]
    pub fn sample_clamped(&self, row: isize, col: isize) -> T {
        let r = row.clamp(0, self.height as isize - 1) as usize;
        let c = col.clamp(0, self.width as isize - 1) as usize;
        self.data[r * self.width + c]
    }
}

impl Grid<f32> {
    /// Sum of all cells, accumulated in f64.
    pub fn sum(&self) -> f64 {
        self.data.iter().map(|&v| v as f64).sum()
    }

    /// `(min, max)` over all cells, or `(0.0, 0.0)` for an empty grid.
    pub fn range(&self) -> (f32, f32) {
        if self.data.is_empty() {
            return (0.0, 0.0);
        }
        self.data
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.data[self.index_of(row, col)]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        let i = self.index_of(row, col);
        &mut self.data[i]
    }
}

impl<T> Index<usize> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, i: usize) -> &T {
        &self.data[i]
    }
}

impl<T> IndexMut<usize> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.data[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_has_width_times_height_cells() {
        let grid: Grid<f32> = Grid::new(7, 3);
        assert_eq!(grid.width(), 7);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.len(), 21);
        assert!(grid.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_row_col_and_linear_addressing_agree() {
        let mut grid: Grid<f32> = Grid::new(4, 3);
        grid.set(2, 1, 5.0);
        assert_eq!(grid.get_index(2 * 4 + 1), 5.0);
        assert_eq!(grid[(2, 1)], 5.0);

        grid[7] = 3.0;
        assert_eq!(grid.get(1, 3), 3.0);
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        assert!(Grid::from_vec(3, 3, vec![0.0f32; 8]).is_none());
        assert!(Grid::from_vec(3, 3, vec![0.0f32; 9]).is_some());
    }

    #[test]
    fn test_resize_keeps_cell_count_invariant() {
        let mut grid: Grid<f32> = Grid::filled(4, 4, 1.0);
        grid.resize(6, 5);
        assert_eq!(grid.len(), 30);
        assert_eq!(grid.get_index(15), 1.0);
        assert_eq!(grid.get_index(16), 0.0);

        grid.resize(2, 2);
        assert_eq!(grid.len(), 4);
    }

    #[test]
    fn test_sample_clamped_stays_on_grid() {
        let data: Vec<f32> = (0..9).map(|i| i as f32).collect();
        let grid = Grid::from_vec(3, 3, data).unwrap();

        assert_eq!(grid.sample_clamped(-1, -1), 0.0);
        assert_eq!(grid.sample_clamped(1, 5), 5.0);
        assert_eq!(grid.sample_clamped(10, 1), 7.0);
        assert_eq!(grid.sample_clamped(1, 1), 4.0);
    }

    #[test]
    fn test_sum_and_range() {
        let grid = Grid::from_vec(2, 2, vec![-1.0f32, 2.0, 0.5, 3.5]).unwrap();
        assert!((grid.sum() - 5.0).abs() < 1e-9);
        assert_eq!(grid.range(), (-1.0, 3.5));
    }
}
