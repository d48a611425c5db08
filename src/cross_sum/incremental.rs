use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::lp::region::max_margin;
use crate::lp::LpError;
use crate::prune::{dominance_prune, Pruner};
use crate::vector_set::VectorSet;

use super::region_diffs;

/// `prune(... prune(prune(Z_1 (+) Z_2) (+) Z_3) ... (+) Z_k)`
pub fn incremental(projections: &[VectorSet], pruner: &Pruner<'_>) -> Result<VectorSet, LpError> {
    let (first, rest) = match projections.split_first() {
        Some(split) => split,
        None => return Ok(VectorSet::new()),
    };
    if rest.is_empty() {
        return pruner.prune(first);
    }

    let mut acc = first.clone();
    for z in rest {
        acc = pruner.prune(&acc.cross_sum(z))?;
        if acc.is_empty() {
            break;
        }
    }
    Ok(acc)
}

/// Incremental pruning where each step only forms the sums `a + b` whose
/// regions in `A` and `B` share interior.
///
/// `R(a + b, A (+) B) = R(a, A) ∩ R(b, B)`, so one margin program per pair
/// decides usefulness and no separate prune of the product is needed.
/// Without LP pruning there are no regions to intersect and the plain fold
/// is used.
pub fn restricted_region(projections: &[VectorSet], pruner: &Pruner<'_>) -> Result<VectorSet, LpError> {
    if !pruner.uses_lp() {
        return incremental(projections, pruner);
    }

    let (first, rest) = match projections.split_first() {
        Some(split) => split,
        None => return Ok(VectorSet::new()),
    };
    if rest.is_empty() {
        return pruner.prune(first);
    }

    let mut acc = first.clone();
    for z in rest {
        acc = restricted_step(&acc, z, pruner)?;
        if acc.is_empty() {
            break;
        }
    }
    Ok(acc)
}

fn restricted_step(a: &VectorSet, b: &VectorSet, pruner: &Pruner<'_>) -> Result<VectorSet, LpError> {
    let tol = pruner.tolerance();
    let a = dominance_prune(a, tol);
    let b = dominance_prune(b, tol);
    let states = match a.dimension() {
        Some(n) => n,
        None => return Ok(VectorSet::new()),
    };

    let b_regions: Vec<_> = (0..b.len()).map(|j| region_diffs(&b, j)).collect();
    let mut result = VectorSet::with_capacity(a.len().max(b.len()));

    for (i, va) in a.iter().enumerate() {
        let a_region = region_diffs(&a, i);
        for (j, vb) in b.iter().enumerate() {
            let mut diffs = a_region.clone();
            diffs.extend(b_regions[j].iter().cloned());
            let useful = max_margin(pruner.lp(), states, &diffs)?
                .map_or(false, |m| m.value > pruner.margin());
            if useful {
                result.push(va.plus(vb.view()));
            }
        }
    }

    Ok(dominance_prune(&result, tol))
}

/// Incremental pruning that always merges the two smallest sets, keeping
/// intermediate products as small as possible.
pub fn generalized(projections: &[VectorSet], pruner: &Pruner<'_>) -> Result<VectorSet, LpError> {
    if projections.len() == 1 {
        return pruner.prune(&projections[0]);
    }

    let mut sets: Vec<Option<VectorSet>> = projections.iter().cloned().map(Some).collect();
    let mut heap: BinaryHeap<Reverse<(usize, usize)>> = sets
        .iter()
        .enumerate()
        .map(|(i, z)| Reverse((z.as_ref().map_or(0, |z| z.len()), i)))
        .collect();

    loop {
        let first = match heap.pop() {
            Some(Reverse((_, i))) => sets[i].take().unwrap_or_default(),
            None => return Ok(VectorSet::new()),
        };
        let second = match heap.pop() {
            Some(Reverse((_, j))) => sets[j].take().unwrap_or_default(),
            None => return Ok(first),
        };

        let merged = pruner.prune(&first.cross_sum(&second))?;
        if merged.is_empty() {
            return Ok(merged);
        }
        heap.push(Reverse((merged.len(), sets.len())));
        sets.push(Some(merged));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alpha::AlphaVector;
    use crate::config::PruneStrength;
    use crate::lp::DenseSimplex;
    use crate::numeric::Tolerance;
    use ndarray::array;

    fn set(rows: &[[f64; 2]]) -> VectorSet {
        rows.iter()
            .map(|r| AlphaVector::new(0, array![r[0], r[1]]))
            .collect()
    }

    #[test]
    fn test_restricted_step_skips_disjoint_regions() {
        let lp = DenseSimplex::default();
        let pruner = Pruner::new(PruneStrength::Normal, Tolerance::default(), 1e-9, &lp);
        // same split point, so only the "left+left" and "right+right" sums survive
        let a = set(&[[1.0, 0.0], [0.0, 1.0]]);
        let b = set(&[[2.0, 0.0], [0.0, 2.0]]);

        let result = restricted_step(&a, &b, &pruner).unwrap();
        let expected = set(&[[3.0, 0.0], [0.0, 3.0]]);
        assert!(result.approx_eq_set(&expected, pruner.tolerance()));
    }

    #[test]
    fn test_generalized_merges_smallest_first() {
        let lp = DenseSimplex::default();
        let pruner = Pruner::new(PruneStrength::Normal, Tolerance::default(), 1e-9, &lp);
        let sets = vec![
            set(&[[1.0, 0.0], [0.0, 1.0], [0.6, 0.6]]),
            set(&[[0.5, 0.5]]),
            set(&[[1.0, 0.0], [0.0, 1.0]]),
        ];

        let a = generalized(&sets, &pruner).unwrap();
        let b = incremental(&sets, &pruner).unwrap();
        assert!(a.approx_eq_set(&b, pruner.tolerance()));
    }
}
