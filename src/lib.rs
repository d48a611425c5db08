//! # incprune - Exact POMDP Value Iteration by Incremental Pruning
//!
//! incprune computes, stage by stage, the minimal set of alpha vectors that
//! represents the optimal value function of a discrete POMDP. Each epoch
//! projects the previous layer through every action and observation,
//! combines the projections with a cross-sum, merges the actions and prunes
//! everything that never attains the upper envelope.
//!
//! ## Key Features
//!
//! - **Pruning**: pointwise dominance, exact LP witness pruning and an
//!   epsilon-relaxed variant
//! - **Cross-sum variants**: enumeration, incremental pruning (normal,
//!   restricted region, generalized), witness, two-pass and linear support
//! - **Stopping criteria**: exact set equality, sampled value change and a
//!   Bellman-residual bound computed by LP
//! - **Finite grid**: point-based backups over a fixed belief grid
//! - **Pluggable LP backend**: anything implementing [`lp::LpSolver`]
//! - **Parallel epochs**: actions are backed up concurrently with rayon
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use incprune::builders::SolverConfigBuilder;
//! use incprune::config::{IncPruneVariant, StoppingCriterion};
//! use incprune::problems;
//! use incprune::solver::Solver;
//!
//! let config = SolverConfigBuilder::new()
//!     .incprune(IncPruneVariant::Normal)
//!     .stopping(StoppingCriterion::Bellman)
//!     .stop_delta(1e-3)
//!     .build()?;
//!
//! let solver = Solver::with_default_lp(problems::tiger(), config)?;
//! let report = solver.solve_from_terminal()?;
//! println!(
//!     "{} after {} epochs, {} vectors",
//!     report.termination,
//!     report.epochs,
//!     report.value_function.vectors().len()
//! );
//! # Ok::<(), incprune::error::SolverError>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`alpha`] - Alpha vectors and their domination tests
//! - [`belief`] - Beliefs, belief lists, sampling, grids and file I/O
//! - [`builders`] - Builder patterns for models and configurations
//! - [`config`] - Solver configuration and option names
//! - [`cross_sum`] - The cross-sum variants
//! - [`diagnostics`] - NaN, overflow and bounds checks
//! - [`error`] - Error types and result handling
//! - [`export`] - Alpha files, metrics CSV and run reports
//! - [`finite_grid`] - Point-based approximate backups
//! - [`lp`] - LP seam, dense simplex and belief-region queries
//! - [`metrics`] - Per-epoch statistics
//! - [`model`] - Discrete POMDP model and conditional probability tables
//! - [`numeric`] - Epsilon-tolerant comparisons
//! - [`parallel`] - Parallel map helpers
//! - [`problems`] - Built-in example problems
//! - [`projection`] - Per-action, per-observation projections
//! - [`prune`] - Pruning strengths
//! - [`solver`] - The value-iteration driver
//! - [`stopping`] - Stopping criteria
//! - [`value_function`] - Layers and the final value function
//! - [`vector_set`] - Sets of alpha vectors

pub mod alpha;
pub mod belief;
pub mod builders;
pub mod config;
pub mod cross_sum;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod finite_grid;
pub mod lp;
pub mod metrics;
pub mod model;
pub mod numeric;
pub mod parallel;
pub mod problems;
pub mod projection;
pub mod prune;
pub mod solver;
pub mod stopping;
pub mod value_function;
pub mod vector_set;

pub use alpha::AlphaVector;
pub use belief::Belief;
pub use config::SolverConfig;
pub use error::{Result, SolverError};
pub use model::{PomdpModel, ProblemDimensions};
pub use solver::{SolveReport, Solver, Termination};
pub use value_function::{Layer, ValueFunction};
pub use vector_set::VectorSet;

#[cfg(test)]
mod tests;
