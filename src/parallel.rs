//! Parallel map helpers built on ndarray's rayon re-export.
//!
//! Work inside one epoch is independent per action (and per grid belief),
//! so it is expressed as a map whose results are joined in order.

use ndarray::parallel::prelude::*;

/// Map `f` over `0..n`, on the rayon pool when `parallel` is set.
///
/// The first error aborts the map; results keep index order either way.
pub fn try_map_indices<T, E, F>(n: usize, parallel: bool, f: F) -> Result<Vec<T>, E>
where
    T: Send,
    E: Send,
    F: Fn(usize) -> Result<T, E> + Send + Sync,
{
    if parallel {
        (0..n).into_par_iter().map(f).collect()
    } else {
        (0..n).map(f).collect()
    }
}

/// Map `f` over a slice, on the rayon pool when `parallel` is set.
pub fn map_slice<S, T, F>(items: &[S], parallel: bool, f: F) -> Vec<T>
where
    S: Sync,
    T: Send,
    F: Fn(&S) -> T + Send + Sync,
{
    if parallel {
        items.par_iter().map(f).collect()
    } else {
        items.iter().map(f).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_is_kept() {
        let seq: Result<Vec<usize>, ()> = try_map_indices(100, false, |i| Ok(i * i));
        let par: Result<Vec<usize>, ()> = try_map_indices(100, true, |i| Ok(i * i));
        assert_eq!(seq, par);
    }

    #[test]
    fn test_error_propagates() {
        let result: Result<Vec<usize>, String> =
            try_map_indices(10, true, |i| if i == 7 { Err(format!("bad {}", i)) } else { Ok(i) });
        assert_eq!(result, Err("bad 7".to_string()));
    }

    #[test]
    fn test_map_slice() {
        let items = vec![1.0f64, 4.0, 9.0];
        assert_eq!(map_slice(&items, true, |x| x.sqrt()), vec![1.0, 2.0, 3.0]);
    }
}
