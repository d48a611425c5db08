//! # Linear programming
//!
//! Pruning and domination checks ask one kind of question: "is there a
//! belief at which this vector beats all of these others?". This module
//! defines the solver seam ([`LpSolver`]), a small problem description
//! ([`LpProblem`]), the default backend ([`DenseSimplex`]) and the
//! belief-region queries built on top of them ([`region`]).
//!
//! An infeasible or unbounded program is a normal [`LpOutcome`]. A backend
//! that cannot finish (iteration cap, timeout, numerical breakdown) returns
//! an [`LpError`], which the solver treats as fatal.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use ndarray::Array1;

pub mod region;
pub mod simplex;

pub use simplex::DenseSimplex;

/// Row relation of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    LessEq,
    GreaterEq,
    Equal,
}

#[derive(Debug, Clone)]
pub struct Constraint {
    pub coefficients: Array1<f64>,
    pub relation: Relation,
    pub rhs: f64,
}

/// `maximize objective . x` subject to the constraints, with `x >= 0`
/// except for variables flagged as free.
#[derive(Debug, Clone)]
pub struct LpProblem {
    pub objective: Array1<f64>,
    pub constraints: Vec<Constraint>,
    pub free: Vec<bool>,
}

impl LpProblem {
    pub fn maximize(objective: Array1<f64>) -> Self {
        let n = objective.len();
        LpProblem {
            objective,
            constraints: Vec::new(),
            free: vec![false; n],
        }
    }

    pub fn num_variables(&self) -> usize {
        self.objective.len()
    }

    pub fn set_free(&mut self, variable: usize) {
        self.free[variable] = true;
    }

    pub fn add_constraint(&mut self, coefficients: Array1<f64>, relation: Relation, rhs: f64) {
        debug_assert_eq!(coefficients.len(), self.objective.len());
        self.constraints.push(Constraint {
            coefficients,
            relation,
            rhs,
        });
    }
}

/// Normal results of solving an [`LpProblem`].
#[derive(Debug, Clone, PartialEq)]
pub enum LpOutcome {
    Optimal { solution: Array1<f64>, objective: f64 },
    Infeasible,
    Unbounded,
}

/// Backend failures. Any of these makes the current epoch unusable.
#[derive(Debug, Clone, PartialEq)]
pub enum LpError {
    IterationLimit { iterations: usize },
    Timeout { elapsed_ms: u128 },
    Numerical(String),
}

impl fmt::Display for LpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LpError::IterationLimit { iterations } => {
                write!(f, "iteration limit reached after {} pivots", iterations)
            }
            LpError::Timeout { elapsed_ms } => write!(f, "timed out after {} ms", elapsed_ms),
            LpError::Numerical(msg) => write!(f, "numerical failure: {}", msg),
        }
    }
}

impl std::error::Error for LpError {}

/// Pluggable LP backend.
///
/// Implementations are shared by the per-action tasks of one epoch, hence
/// the `Send + Sync` bound.
pub trait LpSolver: Send + Sync {
    fn solve(&self, problem: &LpProblem) -> Result<LpOutcome, LpError>;

    /// Short backend name for logs.
    fn name(&self) -> &str {
        "lp"
    }
}

impl<T: LpSolver + ?Sized> LpSolver for &T {
    fn solve(&self, problem: &LpProblem) -> Result<LpOutcome, LpError> {
        (**self).solve(problem)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T: LpSolver + ?Sized> LpSolver for Box<T> {
    fn solve(&self, problem: &LpProblem) -> Result<LpOutcome, LpError> {
        (**self).solve(problem)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Wraps a backend and counts calls, safely across threads.
pub struct CountingSolver<L> {
    inner: L,
    calls: AtomicU64,
}

impl<L: LpSolver> CountingSolver<L> {
    pub fn new(inner: L) -> Self {
        CountingSolver {
            inner,
            calls: AtomicU64::new(0),
        }
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }
}

impl<L: LpSolver> LpSolver for CountingSolver<L> {
    fn solve(&self, problem: &LpProblem) -> Result<LpOutcome, LpError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.inner.solve(problem)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
