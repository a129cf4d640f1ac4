//! Square, row-major grids shared by every generation stage.

use rayon::prelude::*;

use crate::error::{ProcgenError, Result};

/// Convert a continuous grid-space coordinate to a cell index.
///
/// Truncates toward zero, so `-0.5` maps to cell `0`. Ray marching relies on
/// this: a step can land on the cell it just left, or skip a diagonal
/// neighbour. Every float→cell conversion in the crate goes through here.
#[inline]
pub fn grid_coord(v: f32) -> i32 {
    v as i32
}

/// A square `size × size` grid stored row-major (`y * size + x`).
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    size: usize,
    data: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn new_with(size: usize, value: T) -> Self {
        Self {
            size,
            data: vec![value; size * size],
        }
    }
}

impl<T> Grid<T> {
    /// Build a grid by evaluating `f(x, y)` for every cell in parallel.
    /// Cells come back in row-major order regardless of scheduling.
    pub fn par_from_fn<F>(size: usize, f: F) -> Self
    where
        T: Send,
        F: Fn(usize, usize) -> T + Sync + Send,
    {
        let data = (0..size * size)
            .into_par_iter()
            .map(|idx| f(idx % size, idx / size))
            .collect();
        Self { size, data }
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.size && y < self.size);
        y * self.size + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Bounds-checked lookup with signed coordinates (as produced by [`grid_coord`]).
    /// Ray marching stops at the first `None`.
    pub fn try_get(&self, x: i32, y: i32) -> Option<&T> {
        if self.contains(x, y) {
            Some(&self.data[y as usize * self.size + x as usize])
        } else {
            None
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.size && (y as usize) < self.size
    }

    /// Fail with `DimensionMismatch` unless `other` has the same side length.
    pub fn ensure_same_size<U>(&self, other: &Grid<U>) -> Result<()> {
        ensure_size(other, self.size)
    }

    /// Row-major view of the cells.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let size = self.size;
        self.data
            .iter()
            .enumerate()
            .map(move |(idx, val)| (idx % size, idx / size, val))
    }

    /// Parallel mutable iteration; each item owns exactly one cell.
    pub fn par_iter_mut<'a>(
        &'a mut self,
    ) -> impl IndexedParallelIterator<Item = (usize, usize, &'a mut T)> + 'a
    where
        T: Send + 'a,
    {
        let size = self.size;
        self.data
            .par_iter_mut()
            .enumerate()
            .map(move |(idx, val)| (idx % size, idx / size, val))
    }
}

/// Reject a zero-sized grid.
pub(crate) fn ensure_positive_size(size: usize) -> Result<()> {
    if size == 0 {
        Err(ProcgenError::config("grid size", "must be at least 1"))
    } else {
        Ok(())
    }
}

/// Fail with `DimensionMismatch` unless `grid` has side `expected`.
pub fn ensure_size<T>(grid: &Grid<T>, expected: usize) -> Result<()> {
    if grid.size() == expected {
        Ok(())
    } else {
        Err(ProcgenError::DimensionMismatch {
            expected,
            actual: grid.size(),
        })
    }
}
