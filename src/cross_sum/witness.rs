use ndarray::Array1;
use tracing::trace;

use crate::lp::region::find_region_point;
use crate::lp::LpError;
use crate::prune::Pruner;
use crate::vector_set::VectorSet;

use super::{best_tuple, distinct_sets, incremental, tuple_vector};

/// Witness algorithm.
///
/// Vectors of the sum are identified by their per-observation choices. If
/// the set `U` found so far is incomplete, some vector of `U` has a
/// neighbour (one choice swapped) that beats all of `U` at some belief; the
/// best sum at that belief is then new. The search ends when no neighbour
/// of any vector in `U` has such a witness.
///
/// Only envelope vectors are ever built, so without LP pruning the plain
/// incremental fold is used instead.
pub fn witness(projections: &[VectorSet], pruner: &Pruner<'_>) -> Result<VectorSet, LpError> {
    if !pruner.uses_lp() {
        return incremental(projections, pruner);
    }
    let tol = pruner.tolerance();
    let sets = distinct_sets(projections, tol);
    let states = match sets.first().and_then(|z| z.dimension()) {
        Some(n) => n,
        None => return Ok(VectorSet::new()),
    };

    let start = Array1::from_elem(states, 1.0 / states as f64);
    let first = match best_tuple(&sets, start.view(), tol) {
        Some(tuple) => tuple,
        None => return Ok(VectorSet::new()),
    };

    let mut found = VectorSet::new();
    found.push(tuple_vector(&sets, &first));
    let mut tuples = vec![first];
    let mut agenda = vec![0usize];

    while let Some(k) = agenda.pop() {
        let tuple = tuples[k].clone();
        for (o, z) in sets.iter().enumerate() {
            for j in (0..z.len()).filter(|&j| j != tuple[o]) {
                let mut neighbour = tuple.clone();
                neighbour[o] = j;
                let candidate = tuple_vector(&sets, &neighbour);

                // one neighbour can expose several missing vectors
                while !found.contains(&candidate, tol) {
                    let point = match find_region_point(
                        pruner.lp(),
                        candidate.view(),
                        found.iter().map(|v| v.view()),
                        pruner.margin(),
                    )? {
                        Some(point) => point,
                        None => break,
                    };
                    let best = match best_tuple(&sets, point.view(), tol) {
                        Some(best) => best,
                        None => break,
                    };
                    let vector = tuple_vector(&sets, &best);
                    if found.contains(&vector, tol) {
                        break;
                    }
                    trace!(observation = o, found = found.len() + 1, "witness point found");
                    found.push(vector);
                    tuples.push(best);
                    agenda.push(tuples.len() - 1);
                }
            }
        }
    }

    pruner.prune(&found)
}
