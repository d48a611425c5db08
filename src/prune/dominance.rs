use crate::alpha::AlphaVector;
use crate::numeric::Tolerance;
use crate::vector_set::VectorSet;

/// Pointwise dominance filter.
///
/// A vector is dropped when a single other vector is at least as good in
/// every state. Of a group of equal vectors the earliest survives, and the
/// survivors keep their input order.
pub fn dominance_prune(set: &VectorSet, tol: &Tolerance) -> VectorSet {
    let mut kept: Vec<&AlphaVector> = Vec::with_capacity(set.len());

    for candidate in set.iter() {
        if kept.iter().any(|w| w.weakly_dominates(candidate, tol)) {
            continue;
        }
        kept.retain(|w| !candidate.weakly_dominates(w, tol));
        kept.push(candidate);
    }

    kept.into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_removes_dominated_and_duplicates() {
        let tol = Tolerance::default();
        let set: VectorSet = vec![
            AlphaVector::new(0, array![1.0, 0.0]),
            AlphaVector::new(1, array![0.5, -1.0]),
            AlphaVector::new(2, array![0.0, 1.0]),
            AlphaVector::new(3, array![1.0, 1e-12]),
            AlphaVector::new(4, array![0.6, 0.6]),
        ]
        .into_iter()
        .collect();

        let pruned = dominance_prune(&set, &tol);
        let actions: Vec<usize> = pruned.iter().map(|v| v.action).collect();
        assert_eq!(actions, vec![0, 2, 4]);
    }

    #[test]
    fn test_later_vector_replaces_earlier() {
        let tol = Tolerance::default();
        let set: VectorSet = vec![
            AlphaVector::new(0, array![0.0, 0.0]),
            AlphaVector::new(1, array![1.0, 1.0]),
        ]
        .into_iter()
        .collect();

        let pruned = dominance_prune(&set, &tol);
        assert_eq!(pruned.len(), 1);
        assert_eq!(pruned.get(0).unwrap().action, 1);
    }
}
