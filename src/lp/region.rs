//! Belief-region queries expressed as linear programs over the simplex.

use ndarray::{Array1, ArrayView1};

use super::{LpError, LpOutcome, LpProblem, LpSolver, Relation};
use crate::vector_set::VectorSet;

/// Belief point together with the margin achieved there.
#[derive(Debug, Clone, PartialEq)]
pub struct Margin {
    pub point: Array1<f64>,
    pub value: f64,
}

/// `maximize delta` subject to `x . d >= delta` for every `d` in `diffs`,
/// with `x` in the probability simplex.
///
/// With no constraints the margin is unbounded; the uniform belief is
/// returned with an infinite value. `None` when the backend reports the
/// program infeasible, which callers read as "no such belief".
pub fn max_margin(
    lp: &dyn LpSolver,
    states: usize,
    diffs: &[Array1<f64>],
) -> Result<Option<Margin>, LpError> {
    if diffs.is_empty() {
        return Ok(Some(Margin {
            point: Array1::from_elem(states, 1.0 / states as f64),
            value: f64::INFINITY,
        }));
    }

    // variables: x_0 .. x_{n-1}, delta
    let mut objective = Array1::zeros(states + 1);
    objective[states] = 1.0;
    let mut problem = LpProblem::maximize(objective);
    problem.set_free(states);

    for d in diffs {
        // -x . d + delta <= 0
        let mut row = Array1::zeros(states + 1);
        row.slice_mut(ndarray::s![..states]).assign(&d.mapv(|v| -v));
        row[states] = 1.0;
        problem.add_constraint(row, Relation::LessEq, 0.0);
    }
    let mut simplex_row = Array1::ones(states + 1);
    simplex_row[states] = 0.0;
    problem.add_constraint(simplex_row, Relation::Equal, 1.0);

    match lp.solve(&problem)? {
        LpOutcome::Optimal { solution, objective } => Ok(Some(Margin {
            point: clamp_to_simplex(solution.slice(ndarray::s![..states]).to_owned()),
            value: objective,
        })),
        LpOutcome::Infeasible => Ok(None),
        // delta is bounded by the finite half-spaces over the simplex
        LpOutcome::Unbounded => Err(LpError::Numerical(
            "margin program reported unbounded".to_string(),
        )),
    }
}

/// Witness point for `v` against `others`: a belief where `v` beats every
/// vector of `others` by more than `threshold`.
pub fn find_region_point<'a, I>(
    lp: &dyn LpSolver,
    v: ArrayView1<f64>,
    others: I,
    threshold: f64,
) -> Result<Option<Array1<f64>>, LpError>
where
    I: IntoIterator<Item = ArrayView1<'a, f64>>,
{
    let diffs: Vec<Array1<f64>> = others.into_iter().map(|w| &v - &w).collect();
    Ok(max_margin(lp, v.len(), &diffs)?
        .filter(|m| m.value > threshold)
        .map(|m| m.point))
}

/// `maximize objective . x` over the beliefs where `v` is at least as good
/// as every vector of `others`. `None` when that region is empty.
pub fn max_in_region<'a, I>(
    lp: &dyn LpSolver,
    objective: ArrayView1<f64>,
    v: ArrayView1<f64>,
    others: I,
) -> Result<Option<Margin>, LpError>
where
    I: IntoIterator<Item = ArrayView1<'a, f64>>,
{
    let states = v.len();
    let mut problem = LpProblem::maximize(objective.to_owned());
    for w in others {
        // x . (w - v) <= 0
        problem.add_constraint(&w - &v, Relation::LessEq, 0.0);
    }
    problem.add_constraint(Array1::ones(states), Relation::Equal, 1.0);

    match lp.solve(&problem)? {
        LpOutcome::Optimal { solution, objective } => Ok(Some(Margin {
            point: clamp_to_simplex(solution),
            value: objective,
        })),
        LpOutcome::Infeasible => Ok(None),
        LpOutcome::Unbounded => Err(LpError::Numerical(
            "region program over the simplex reported unbounded".to_string(),
        )),
    }
}

/// `min_x max_{v in set} v . x` over the simplex.
pub fn min_envelope_value(lp: &dyn LpSolver, set: &VectorSet) -> Result<Option<f64>, LpError> {
    let states = match set.dimension() {
        Some(n) => n,
        None => return Ok(None),
    };

    // maximize -t s.t. x . v - t <= 0, sum x = 1
    let mut objective = Array1::zeros(states + 1);
    objective[states] = -1.0;
    let mut problem = LpProblem::maximize(objective);
    problem.set_free(states);
    for v in set.iter() {
        let mut row = Array1::zeros(states + 1);
        row.slice_mut(ndarray::s![..states]).assign(&v.values);
        row[states] = -1.0;
        problem.add_constraint(row, Relation::LessEq, 0.0);
    }
    let mut simplex_row = Array1::ones(states + 1);
    simplex_row[states] = 0.0;
    problem.add_constraint(simplex_row, Relation::Equal, 1.0);

    match lp.solve(&problem)? {
        LpOutcome::Optimal { objective, .. } => Ok(Some(-objective)),
        other => Err(LpError::Numerical(format!(
            "envelope minimum program reported {:?}",
            other
        ))),
    }
}

/// `sup_x (V_a(x) - V_b(x))` where `V` is the upper envelope of a set.
///
/// `None` when either set is empty.
pub fn sup_difference(
    lp: &dyn LpSolver,
    a: &VectorSet,
    b: &VectorSet,
) -> Result<Option<f64>, LpError> {
    if a.is_empty() || b.is_empty() {
        return Ok(None);
    }
    let mut best = f64::NEG_INFINITY;
    for v in a.iter() {
        let diffs: Vec<Array1<f64>> = b.iter().map(|u| &v.values - &u.values).collect();
        if let Some(margin) = max_margin(lp, v.len(), &diffs)? {
            best = best.max(margin.value);
        }
    }
    Ok(Some(best))
}

/// Bellman residual: `sup_x |V_a(x) - V_b(x)|`.
pub fn sup_norm_distance(
    lp: &dyn LpSolver,
    a: &VectorSet,
    b: &VectorSet,
) -> Result<Option<f64>, LpError> {
    let forward = sup_difference(lp, a, b)?;
    let backward = sup_difference(lp, b, a)?;
    Ok(match (forward, backward) {
        (Some(f), Some(g)) => Some(f.max(g).max(0.0)),
        _ => None,
    })
}

/// Remove tiny negative components left by pivoting and renormalize.
fn clamp_to_simplex(mut point: Array1<f64>) -> Array1<f64> {
    point.mapv_inplace(|p| p.max(0.0));
    let sum = point.sum();
    if sum > 0.0 {
        point /= sum;
    } else {
        let n = point.len();
        point.fill(1.0 / n as f64);
    }
    point
}
