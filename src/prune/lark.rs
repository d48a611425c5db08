use ndarray::ArrayView1;
use tracing::trace;

use crate::lp::region::find_region_point;
use crate::lp::{LpError, LpSolver};
use crate::numeric::Tolerance;
use crate::vector_set::VectorSet;

/// Lark's filter.
///
/// Every survivor is the best vector, under the lexicographic tie rule of
/// [`VectorSet::best_index`], at some belief. A vector is discarded as soon
/// as the witness program finds no belief where it beats the survivors by
/// more than `margin`.
///
/// The input is expected to be free of duplicates; run the dominance filter
/// first. Survivors keep their input order.
pub fn lark_prune(
    set: &VectorSet,
    tol: &Tolerance,
    margin: f64,
    lp: &dyn LpSolver,
) -> Result<VectorSet, LpError> {
    let states = match set.dimension() {
        Some(n) => n,
        None => return Ok(VectorSet::new()),
    };

    let mut kept: Vec<usize> = Vec::new();
    let mut pending: Vec<usize> = (0..set.len()).collect();

    // the best vector at each corner is always part of the envelope
    for s in 0..states {
        let mut corner = ndarray::Array1::zeros(states);
        corner[s] = 1.0;
        if let Some(best) = best_among(set, &pending, corner.view(), tol) {
            pending.retain(|&i| i != best);
            kept.push(best);
        }
    }

    while let Some(candidate) = pending.pop() {
        let v = set.vectors()[candidate].view();
        let witness = find_region_point(
            lp,
            v,
            kept.iter().map(|&i| set.vectors()[i].view()),
            margin,
        )?;

        match witness {
            None => {
                trace!(candidate, kept = kept.len(), "no witness, vector pruned");
            }
            Some(point) => {
                pending.push(candidate);
                if let Some(best) = best_among(set, &pending, point.view(), tol) {
                    pending.retain(|&i| i != best);
                    kept.push(best);
                }
            }
        }
    }

    kept.sort_unstable();
    Ok(kept.into_iter().map(|i| set.vectors()[i].clone()).collect())
}

fn best_among(
    set: &VectorSet,
    indices: &[usize],
    point: ArrayView1<f64>,
    tol: &Tolerance,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for &i in indices {
        let v = &set.vectors()[i];
        let value = v.value_at(point);
        let better = match best {
            None => true,
            Some((j, best_value)) => {
                tol.greater_than(value, best_value)
                    || (tol.equal(value, best_value) && v.lex_greater(&set.vectors()[j], tol))
            }
        };
        if better {
            best = Some((i, value));
        }
    }
    best.map(|(i, _)| i)
}
