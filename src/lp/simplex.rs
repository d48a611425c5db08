use std::time::{Duration, Instant};

use ndarray::{Array1, Array2, Axis};

use super::{LpError, LpOutcome, LpProblem, LpSolver, Relation};

/// Two-phase dense tableau simplex with Bland's pivoting rule.
///
/// Free variables are split into a positive and a negative part. Bland's
/// rule rules out cycling on the degenerate programs pruning produces
/// (many constraints through the same vertex).
#[derive(Debug, Clone)]
pub struct DenseSimplex {
    /// Pivot and feasibility tolerance
    pub tolerance: f64,
    /// Pivot budget per call, across both phases
    pub max_iterations: usize,
    /// Wall-clock budget per call
    pub time_limit: Option<Duration>,
}

impl DenseSimplex {
    pub fn new(tolerance: f64) -> Self {
        DenseSimplex {
            tolerance,
            max_iterations: 50_000,
            time_limit: None,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_time_limit(mut self, time_limit: Option<Duration>) -> Self {
        self.time_limit = time_limit;
        self
    }

    /// Pivot until optimal. Returns `false` if the program is unbounded
    /// along some allowed column.
    fn iterate(
        &self,
        tableau: &mut Array2<f64>,
        basis: &mut [usize],
        allowed_columns: usize,
        iterations: &mut usize,
        start: Instant,
    ) -> Result<bool, LpError> {
        let obj = tableau.nrows() - 1;
        let rhs = tableau.ncols() - 1;

        loop {
            // Bland: lowest-index improving column
            let entering = match (0..allowed_columns).find(|&j| tableau[[obj, j]] < -self.tolerance) {
                Some(j) => j,
                None => return Ok(true),
            };

            if *iterations >= self.max_iterations {
                return Err(LpError::IterationLimit {
                    iterations: *iterations,
                });
            }
            if let Some(limit) = self.time_limit {
                let elapsed = start.elapsed();
                if elapsed > limit {
                    return Err(LpError::Timeout {
                        elapsed_ms: elapsed.as_millis(),
                    });
                }
            }

            let mut leaving: Option<(usize, f64)> = None;
            for i in 0..obj {
                let a = tableau[[i, entering]];
                if a <= self.tolerance {
                    continue;
                }
                let ratio = tableau[[i, rhs]] / a;
                leaving = match leaving {
                    None => Some((i, ratio)),
                    Some((r, best)) => {
                        if ratio < best - self.tolerance
                            || ((ratio - best).abs() <= self.tolerance && basis[i] < basis[r])
                        {
                            Some((i, ratio))
                        } else {
                            Some((r, best))
                        }
                    }
                };
            }

            let (row, _) = match leaving {
                Some(l) => l,
                None => return Ok(false),
            };

            pivot(tableau, row, entering);
            basis[row] = entering;
            *iterations += 1;

            if !tableau[[obj, rhs]].is_finite() {
                return Err(LpError::Numerical(format!(
                    "objective became {} after {} pivots",
                    tableau[[obj, rhs]],
                    iterations
                )));
            }
        }
    }
}

impl Default for DenseSimplex {
    fn default() -> Self {
        DenseSimplex::new(crate::numeric::DEFAULT_EPSILON)
    }
}

fn pivot(tableau: &mut Array2<f64>, row: usize, col: usize) {
    let p = tableau[[row, col]];
    {
        let mut pivot_row = tableau.row_mut(row);
        pivot_row /= p;
    }
    let pivot_row = tableau.row(row).to_owned();
    for i in 0..tableau.nrows() {
        if i == row {
            continue;
        }
        let factor = tableau[[i, col]];
        if factor.abs() > 0.0 {
            tableau.row_mut(i).scaled_add(-factor, &pivot_row);
        }
    }
}

impl LpSolver for DenseSimplex {
    fn solve(&self, problem: &LpProblem) -> Result<LpOutcome, LpError> {
        let start = Instant::now();
        let n = problem.num_variables();
        let free: Vec<usize> = (0..n).filter(|&j| problem.free[j]).collect();
        let n_struct = n + free.len();
        let m = problem.constraints.len();

        if problem.objective.iter().any(|c| !c.is_finite()) {
            return Err(LpError::Numerical("non-finite objective".to_string()));
        }

        // Normalized rows: rhs >= 0, free variables split.
        let mut rows: Vec<(Array1<f64>, Relation, f64)> = Vec::with_capacity(m);
        for c in &problem.constraints {
            if c.rhs.is_nan() || c.coefficients.iter().any(|a| !a.is_finite()) {
                return Err(LpError::Numerical("non-finite constraint".to_string()));
            }
            let mut coeffs = Array1::zeros(n_struct);
            coeffs.slice_mut(ndarray::s![..n]).assign(&c.coefficients);
            for (k, &j) in free.iter().enumerate() {
                coeffs[n + k] = -c.coefficients[j];
            }
            let (coeffs, relation, rhs) = if c.rhs < 0.0 {
                let flipped = match c.relation {
                    Relation::LessEq => Relation::GreaterEq,
                    Relation::GreaterEq => Relation::LessEq,
                    Relation::Equal => Relation::Equal,
                };
                (-coeffs, flipped, -c.rhs)
            } else {
                (coeffs, c.relation, c.rhs)
            };
            rows.push((coeffs, relation, rhs));
        }

        let n_slack = rows
            .iter()
            .filter(|(_, r, _)| *r != Relation::Equal)
            .count();
        let n_art = rows
            .iter()
            .filter(|(_, r, _)| *r != Relation::LessEq)
            .count();
        let art_start = n_struct + n_slack;
        let cols = art_start + n_art;

        let mut tableau = Array2::<f64>::zeros((m + 1, cols + 1));
        let mut basis = vec![0usize; m];
        let mut slack = n_struct;
        let mut art = art_start;
        for (i, (coeffs, relation, rhs)) in rows.iter().enumerate() {
            tableau
                .row_mut(i)
                .slice_mut(ndarray::s![..n_struct])
                .assign(coeffs);
            tableau[[i, cols]] = *rhs;
            match relation {
                Relation::LessEq => {
                    tableau[[i, slack]] = 1.0;
                    basis[i] = slack;
                    slack += 1;
                }
                Relation::GreaterEq => {
                    tableau[[i, slack]] = -1.0;
                    slack += 1;
                    tableau[[i, art]] = 1.0;
                    basis[i] = art;
                    art += 1;
                }
                Relation::Equal => {
                    tableau[[i, art]] = 1.0;
                    basis[i] = art;
                    art += 1;
                }
            }
        }

        let mut iterations = 0;

        if n_art > 0 {
            // Phase 1: maximize -(sum of artificials)
            for j in art_start..cols {
                tableau[[m, j]] = 1.0;
            }
            for i in 0..m {
                if basis[i] >= art_start {
                    let row = tableau.row(i).to_owned();
                    tableau.row_mut(m).scaled_add(-1.0, &row);
                }
            }
            self.iterate(&mut tableau, &mut basis, cols, &mut iterations, start)?;
            if tableau[[m, cols]] < -10.0 * self.tolerance {
                return Ok(LpOutcome::Infeasible);
            }

            // Drive remaining artificials out of the basis; drop rows that
            // turn out to be redundant.
            let mut keep = Vec::with_capacity(m);
            for i in 0..m {
                if basis[i] < art_start {
                    keep.push(i);
                    continue;
                }
                let replacement = (0..art_start).find(|&j| tableau[[i, j]].abs() > self.tolerance);
                if let Some(j) = replacement {
                    pivot(&mut tableau, i, j);
                    basis[i] = j;
                    keep.push(i);
                }
            }
            if keep.len() < m {
                let mut all_rows = keep.clone();
                all_rows.push(m);
                tableau = tableau.select(Axis(0), &all_rows);
                basis = keep.iter().map(|&i| basis[i]).collect();
            }
        }

        // Phase 2
        let m = basis.len();
        tableau.row_mut(m).fill(0.0);
        for j in 0..n {
            tableau[[m, j]] = -problem.objective[j];
        }
        for (k, &j) in free.iter().enumerate() {
            tableau[[m, n + k]] = problem.objective[j];
        }
        for i in 0..m {
            let coef = tableau[[m, basis[i]]];
            if coef.abs() > 0.0 {
                let row = tableau.row(i).to_owned();
                tableau.row_mut(m).scaled_add(-coef, &row);
            }
        }

        if !self.iterate(&mut tableau, &mut basis, art_start, &mut iterations, start)? {
            return Ok(LpOutcome::Unbounded);
        }

        let mut expanded = Array1::<f64>::zeros(n_struct);
        for (i, &b) in basis.iter().enumerate() {
            if b < n_struct {
                expanded[b] = tableau[[i, cols]];
            }
        }
        let mut solution = expanded.slice(ndarray::s![..n]).to_owned();
        for (k, &j) in free.iter().enumerate() {
            solution[j] -= expanded[n + k];
        }
        let objective = problem.objective.dot(&solution);

        Ok(LpOutcome::Optimal {
            solution,
            objective,
        })
    }

    fn name(&self) -> &str {
        "dense-simplex"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn solver() -> DenseSimplex {
        DenseSimplex::new(1e-9)
    }

    #[test]
    fn test_textbook_maximum() {
        // max 3x + 5y, x <= 4, 2y <= 12, 3x + 2y <= 18 -> (2, 6), 36
        let mut p = LpProblem::maximize(array![3.0, 5.0]);
        p.add_constraint(array![1.0, 0.0], Relation::LessEq, 4.0);
        p.add_constraint(array![0.0, 2.0], Relation::LessEq, 12.0);
        p.add_constraint(array![3.0, 2.0], Relation::LessEq, 18.0);
        match solver().solve(&p).unwrap() {
            LpOutcome::Optimal { solution, objective } => {
                assert!((objective - 36.0).abs() < 1e-9);
                assert!((solution[0] - 2.0).abs() < 1e-9);
                assert!((solution[1] - 6.0).abs() < 1e-9);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_equality_and_free_variable() {
        // max d s.t. x0 + x1 = 1, d <= x0 - x1, d <= x1 - x0 -> d = 0 at (0.5, 0.5)
        let mut p = LpProblem::maximize(array![0.0, 0.0, 1.0]);
        p.set_free(2);
        p.add_constraint(array![1.0, 1.0, 0.0], Relation::Equal, 1.0);
        p.add_constraint(array![-1.0, 1.0, 1.0], Relation::LessEq, 0.0);
        p.add_constraint(array![1.0, -1.0, 1.0], Relation::LessEq, 0.0);
        match solver().solve(&p).unwrap() {
            LpOutcome::Optimal { solution, objective } => {
                assert!(objective.abs() < 1e-9);
                assert!((solution[0] - 0.5).abs() < 1e-9);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_negative_free_optimum() {
        // max d s.t. d <= -3 -> -3
        let mut p = LpProblem::maximize(array![1.0]);
        p.set_free(0);
        p.add_constraint(array![1.0], Relation::LessEq, -3.0);
        match solver().solve(&p).unwrap() {
            LpOutcome::Optimal { objective, .. } => assert!((objective + 3.0).abs() < 1e-9),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_infeasible_and_unbounded() {
        let mut p = LpProblem::maximize(array![1.0]);
        p.add_constraint(array![1.0], Relation::GreaterEq, 2.0);
        p.add_constraint(array![1.0], Relation::LessEq, 1.0);
        assert_eq!(solver().solve(&p).unwrap(), LpOutcome::Infeasible);

        let mut p = LpProblem::maximize(array![1.0, 0.0]);
        p.add_constraint(array![0.0, 1.0], Relation::LessEq, 1.0);
        assert_eq!(solver().solve(&p).unwrap(), LpOutcome::Unbounded);
    }

    #[test]
    fn test_iteration_limit_is_error() {
        let mut p = LpProblem::maximize(array![1.0, 1.0]);
        p.add_constraint(array![1.0, 2.0], Relation::LessEq, 4.0);
        p.add_constraint(array![3.0, 1.0], Relation::LessEq, 6.0);
        let result = solver().with_max_iterations(0).solve(&p);
        assert!(matches!(result, Err(LpError::IterationLimit { .. })));
    }
}
