//! Row-parallel output buffers.
//!
//! Every built-in operation produces its output one row at a time from a
//! read-only source, so rows are independent. [`map_rows`] allocates the
//! destination and fills rows through rayon when the `parallel` feature is
//! enabled, sequentially otherwise.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Allocates a `row_len * height` buffer and fills each row with `f(y, row)`.
pub fn map_rows<T, F>(row_len: usize, height: usize, f: F) -> Vec<T>
where
    T: Default + Clone + Send,
    F: Fn(usize, &mut [T]) + Sync + Send,
{
    let mut out = vec![T::default(); row_len * height];
    if row_len == 0 {
        return out;
    }

    #[cfg(feature = "parallel")]
    out.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| f(y, row));

    #[cfg(not(feature = "parallel"))]
    out.chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| f(y, row));

    out
}
