//! Row-partitioned data-parallel execution.
//!
//! Every dense pass of the simulation writes one or more output grids row by
//! row while reading its inputs through shared borrows. [`Executor`] is the
//! capability the passes are written against, so the backend can be swapped
//! without touching the physics: [`Threaded`] spreads rows over the rayon
//! pool, [`Serial`] walks them on the calling thread.
//!
//! Each call returns only after every row is done, which is the barrier
//! between consecutive passes.

use rayon::prelude::*;

/// Parallel map over the rows of one or more equally-shaped grids.
///
/// `width` is the row length; all slices must have the same length, a
/// multiple of `width`. The closure receives the row index and the mutable
/// row slice of each output.
pub trait Executor: Send + Sync {
    fn for_each_row<A, F>(&self, a: &mut [A], width: usize, f: F)
    where
        A: Send,
        F: Fn(usize, &mut [A]) + Send + Sync;

    fn for_each_row2<A, B, F>(&self, a: &mut [A], b: &mut [B], width: usize, f: F)
    where
        A: Send,
        B: Send,
        F: Fn(usize, &mut [A], &mut [B]) + Send + Sync;

    fn for_each_row3<A, B, C, F>(&self, a: &mut [A], b: &mut [B], c: &mut [C], width: usize, f: F)
    where
        A: Send,
        B: Send,
        C: Send,
        F: Fn(usize, &mut [A], &mut [B], &mut [C]) + Send + Sync;
}

/// Rayon-backed executor.
#[derive(Debug, Clone, Copy, Default)]
pub struct Threaded;

/// Single-threaded executor. Produces bitwise the same results as
/// [`Threaded`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Serial;

impl Executor for Threaded {
    fn for_each_row<A, F>(&self, a: &mut [A], width: usize, f: F)
    where
        A: Send,
        F: Fn(usize, &mut [A]) + Send + Sync,
    {
        if width == 0 {
            return;
        }
        a.par_chunks_mut(width)
            .enumerate()
            .for_each(|(row, ra)| f(row, ra));
    }

    fn for_each_row2<A, B, F>(&self, a: &mut [A], b: &mut [B], width: usize, f: F)
    where
        A: Send,
        B: Send,
        F: Fn(usize, &mut [A], &mut [B]) + Send + Sync,
    {
        debug_assert_eq!(a.len(), b.len());
        if width == 0 {
            return;
        }
        a.par_chunks_mut(width)
            .zip(b.par_chunks_mut(width))
            .enumerate()
            .for_each(|(row, (ra, rb))| f(row, ra, rb));
    }

    fn for_each_row3<A, B, C, F>(&self, a: &mut [A], b: &mut [B], c: &mut [C], width: usize, f: F)
    where
        A: Send,
        B: Send,
        C: Send,
        F: Fn(usize, &mut [A], &mut [B], &mut [C]) + Send + Sync,
    {
        debug_assert_eq!(a.len(), b.len());
        debug_assert_eq!(a.len(), c.len());
        if width == 0 {
            return;
        }
        a.par_chunks_mut(width)
            .zip(b.par_chunks_mut(width))
            .zip(c.par_chunks_mut(width))
            .enumerate()
            .for_each(|(row, ((ra, rb), rc))| f(row, ra, rb, rc));
    }
}

impl Executor for Serial {
    fn for_each_row<A, F>(&self, a: &mut [A], width: usize, f: F)
    where
        A: Send,
        F: Fn(usize, &mut [A]) + Send + Sync,
    {
        if width == 0 {
            return;
        }
        for (row, ra) in a.chunks_mut(width).enumerate() {
            f(row, ra);
        }
    }

    fn for_each_row2<A, B, F>(&self, a: &mut [A], b: &mut [B], width: usize, f: F)
    where
        A: Send,
        B: Send,
        F: Fn(usize, &mut [A], &mut [B]) + Send + Sync,
    {
        debug_assert_eq!(a.len(), b.len());
        if width == 0 {
            return;
        }
        for (row, (ra, rb)) in a.chunks_mut(width).zip(b.chunks_mut(width)).enumerate() {
            f(row, ra, rb);
        }
    }

    fn for_each_row3<A, B, C, F>(&self, a: &mut [A], b: &mut [B], c: &mut [C], width: usize, f: F)
    where
        A: Send,
        B: Send,
        C: Send,
        F: Fn(usize, &mut [A], &mut [B], &mut [C]) + Send + Sync,
    {
        debug_assert_eq!(a.len(), b.len());
        debug_assert_eq!(a.len(), c.len());
        if width == 0 {
            return;
        }
        let rows = a
            .chunks_mut(width)
            .zip(b.chunks_mut(width))
            .zip(c.chunks_mut(width));
        for (row, ((ra, rb), rc)) in rows.enumerate() {
            f(row, ra, rb, rc);
        }
    }
}
