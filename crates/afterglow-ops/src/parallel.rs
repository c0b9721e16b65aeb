//! Row-parallel loop used by the per-pixel kernels.
//!
//! With the `parallel` feature rows are handed to rayon; without it the same
//! closure runs sequentially. Each row is written by exactly one call, so
//! results do not depend on the feature.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Calls `f(y, row)` for every `row_len`-sized chunk of `data`.
#[cfg(feature = "parallel")]
pub(crate) fn for_each_row<F>(data: &mut [f32], row_len: usize, f: F)
where
    F: Fn(usize, &mut [f32]) + Sync + Send,
{
    if row_len == 0 {
        return;
    }
    data.par_chunks_mut(row_len).enumerate().for_each(|(y, row)| f(y, row));
}

/// Calls `f(y, row)` for every `row_len`-sized chunk of `data` (single-threaded fallback).
#[cfg(not(feature = "parallel"))]
pub(crate) fn for_each_row<F>(data: &mut [f32], row_len: usize, f: F)
where
    F: Fn(usize, &mut [f32]),
{
    if row_len == 0 {
        return;
    }
    data.chunks_mut(row_len).enumerate().for_each(|(y, row)| f(y, row));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_indexed_in_order() {
        let mut data = vec![0.0f32; 12];
        for_each_row(&mut data, 4, |y, row| row.fill(y as f32));
        assert_eq!(&data[..4], &[0.0; 4]);
        assert_eq!(&data[8..], &[2.0; 4]);
    }
}
