use tracing::trace;

use crate::belief::BeliefSampler;
use crate::lp::region::max_in_region;
use crate::lp::LpError;
use crate::prune::Pruner;
use crate::vector_set::VectorSet;

use super::{best_tuple, distinct_sets, incremental, tuple_vector};

/// Linear support.
///
/// Seeds the result with the best sums at the simplex corners and centre.
/// Then, for every vector `v` found and every single-observation swap, it
/// maximizes the gain of the swap over the region where `v` is best. A
/// positive gain at `x*` means the envelope is still too low there, and the
/// best sum at `x*` is added. Regions only shrink as vectors are added, so
/// one pass over the growing list suffices.
///
/// Falls back to the incremental fold when pruning does not use LP.
pub fn linear_support(projections: &[VectorSet], pruner: &Pruner<'_>) -> Result<VectorSet, LpError> {
    if !pruner.uses_lp() {
        return incremental(projections, pruner);
    }
    let tol = pruner.tolerance();
    let sets = distinct_sets(projections, tol);
    let states = match sets.first().and_then(|z| z.dimension()) {
        Some(n) => n,
        None => return Ok(VectorSet::new()),
    };

    let mut found = VectorSet::new();
    let mut tuples: Vec<Vec<usize>> = Vec::new();
    for point in BeliefSampler::corners_and_center(states).iter() {
        if let Some(tuple) = best_tuple(&sets, point.view(), tol) {
            let vector = tuple_vector(&sets, &tuple);
            if !found.contains(&vector, tol) {
                found.push(vector);
                tuples.push(tuple);
            }
        }
    }

    let mut k = 0;
    while k < found.len() {
        let tuple = tuples[k].clone();
        for (o, z) in sets.iter().enumerate() {
            let current = &z.vectors()[tuple[o]].values;
            for j in (0..z.len()).filter(|&j| j != tuple[o]) {
                let gain = &z.vectors()[j].values - current;
                loop {
                    let v = found.vectors()[k].view();
                    let others = found
                        .iter()
                        .enumerate()
                        .filter(|&(i, _)| i != k)
                        .map(|(_, w)| w.view());
                    let optimum = match max_in_region(pruner.lp(), gain.view(), v, others)? {
                        Some(m) if m.value > pruner.margin() => m,
                        _ => break,
                    };
                    let best = match best_tuple(&sets, optimum.point.view(), tol) {
                        Some(best) => best,
                        None => break,
                    };
                    let vector = tuple_vector(&sets, &best);
                    if found.contains(&vector, tol) {
                        break;
                    }
                    trace!(vertex_gain = optimum.value, found = found.len() + 1, "support point found");
                    found.push(vector);
                    tuples.push(best);
                }
            }
        }
        k += 1;
    }

    pruner.prune(&found)
}
