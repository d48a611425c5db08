//! # Value-iteration driver
//!
//! One epoch turns the previous layer into the next one:
//!
//! ```text
//! AwaitingPreviousLayer -> Projecting -> CrossSumming -> MergingActions
//!     -> Pruning -> StoppingCheck -> (next epoch | done)
//! ```
//!
//! Projection and cross-sum of different actions run in parallel and meet
//! again at the merge. Epochs themselves are strictly sequential. The
//! deadline is only looked at between epochs, so an aborted run still
//! returns a complete layer.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::belief::{BeliefGrid, BeliefList, BeliefSampler};
use crate::config::{Method, SolverConfig, StoppingCriterion};
use crate::cross_sum::CrossSumEngine;
use crate::diagnostics::{check_value_bounds, ensure_finite};
use crate::error::{BackupPhase, ErrorContext, Result, SolverError};
use crate::finite_grid::FiniteGrid;
use crate::lp::region::min_envelope_value;
use crate::lp::{CountingSolver, DenseSimplex, LpSolver};
use crate::metrics::{EpochStats, SolverMetrics};
use crate::model::PomdpModel;
use crate::numeric::Tolerance;
use crate::parallel::try_map_indices;
use crate::projection::ProjectionTables;
use crate::prune::Pruner;
use crate::stopping::StoppingRule;
use crate::value_function::{Layer, ValueFunction};
use crate::vector_set::VectorSet;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    Converged,
    HorizonReached,
    EpochLimit,
    Deadline,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Termination::Converged => "converged",
            Termination::HorizonReached => "horizon reached",
            Termination::EpochLimit => "epoch limit reached",
            Termination::Deadline => "deadline reached",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone)]
pub struct SolveReport {
    pub value_function: ValueFunction,
    /// Epochs run by this call
    pub epochs: usize,
    pub termination: Termination,
    pub metrics: SolverMetrics,
}

pub struct Solver<L: LpSolver> {
    model: PomdpModel,
    config: SolverConfig,
    lp: CountingSolver<L>,
    tables: ProjectionTables,
    tolerance: Tolerance,
    samples: BeliefList,
    grid: Option<FiniteGrid>,
}

impl Solver<DenseSimplex> {
    /// Solver backed by the built-in simplex, configured from `config`.
    pub fn with_default_lp(model: PomdpModel, config: SolverConfig) -> Result<Self> {
        let lp = config.lp_solver();
        Solver::new(model, config, lp)
    }
}

impl<L: LpSolver> Solver<L> {
    pub fn new(model: PomdpModel, config: SolverConfig, lp: L) -> Result<Self> {
        config.validate()?;
        model.validate()?;

        let states = model.dims().states;
        let tolerance = config.prune_tolerance()?;

        let mut sampler = BeliefSampler::new(config.seed);
        let mut samples = BeliefSampler::corners_and_center(states);
        for b in sampler.random_list(states, config.belief_samples).iter() {
            samples.append(b);
        }

        let grid = match config.method {
            Method::Exact => None,
            Method::FiniteGrid => {
                let grid = BeliefGrid::regular(states, config.grid_resolution)?;
                Some(FiniteGrid::new(&grid, tolerance, config.fg_tolerance()?))
            }
        };

        info!(
            states,
            actions = model.dims().actions,
            observations = model.dims().observations,
            method = %config.method,
            cross_sum = %config.cross_sum,
            prune = %config.prune,
            lp = lp.name(),
            "solver ready"
        );

        Ok(Solver {
            tables: ProjectionTables::new(&model),
            model,
            config,
            lp: CountingSolver::new(lp),
            tolerance,
            samples,
            grid,
        })
    }

    /// Use `grid` instead of the regular grid for the finite-grid method.
    pub fn with_grid(mut self, grid: BeliefGrid) -> Result<Self> {
        self.check_beliefs(grid.points())?;
        self.grid = Some(FiniteGrid::new(&grid, self.tolerance, self.config.fg_tolerance()?));
        Ok(self)
    }

    /// Replace the beliefs used by the `weak` criterion and for reporting.
    pub fn with_samples(mut self, samples: BeliefList) -> Result<Self> {
        self.check_beliefs(&samples)?;
        self.samples = samples;
        Ok(self)
    }

    fn check_beliefs(&self, list: &BeliefList) -> Result<()> {
        let states = self.model.dims().states;
        match list.iter().find(|b| b.len() != states) {
            Some(b) => Err(SolverError::dimension_mismatch(
                format!("beliefs over {} states", states),
                format!("a belief of length {}", b.len()),
            )),
            None => Ok(()),
        }
    }

    pub fn model(&self) -> &PomdpModel {
        &self.model
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    pub fn samples(&self) -> &BeliefList {
        &self.samples
    }

    /// LP calls made so far by every epoch of this solver.
    pub fn lp_calls(&self) -> u64 {
        self.lp.calls()
    }

    /// Run one epoch on top of `previous`.
    pub fn backup(&self, previous: &Layer) -> Result<Layer> {
        let stage = previous.stage + 1;
        self.check_previous(previous, stage)?;

        match &self.grid {
            Some(grid) if self.config.method == Method::FiniteGrid => {
                self.grid_backup(grid, previous, stage)
            }
            _ => self.exact_backup(previous, stage),
        }
    }

    fn check_previous(&self, previous: &Layer, stage: usize) -> Result<()> {
        let context = ErrorContext::stage(stage).with_phase(BackupPhase::AwaitingPreviousLayer);
        if previous.merged.is_empty() {
            return Err(SolverError::EmptyCandidateSet { context });
        }
        let states = self.model.dims().states;
        if let Some(bad) = previous.merged.iter().find(|v| v.len() != states) {
            return Err(SolverError::dimension_mismatch(
                format!("vectors of length {}", states),
                format!("length {}", bad.len()),
            ));
        }
        ensure_finite(&previous.merged, context)
    }

    fn exact_backup(&self, previous: &Layer, stage: usize) -> Result<Layer> {
        let lp: &dyn LpSolver = &self.lp;
        let pruner = Pruner::from_config(&self.config, self.config.prune, lp)?;
        let purge = Pruner::from_config(&self.config, self.config.proj_purge, lp)?;
        let engine = CrossSumEngine::from_config(&self.config, pruner);

        let per_action = try_map_indices(self.model.dims().actions, self.config.parallel, |a| {
            self.backup_action(&previous.merged, a, stage, &purge, &engine)
        })?;

        debug!(stage, sizes = ?per_action.iter().map(|s| s.len()).collect::<Vec<_>>(), "merging actions");
        let mut union = VectorSet::with_capacity(per_action.iter().map(|s| s.len()).sum());
        for set in &per_action {
            union.extend(set.clone());
        }

        let context = ErrorContext::stage(stage).with_phase(BackupPhase::Pruning);
        let merged = pruner
            .prune(&union)
            .map_err(|e| SolverError::lp(context.clone(), e))?;
        if merged.is_empty() {
            return Err(SolverError::EmptyCandidateSet { context });
        }
        ensure_finite(&merged, context)?;

        Ok(Layer {
            stage,
            per_action,
            merged,
        })
    }

    /// Projection and cross-sum of one action, reward included.
    fn backup_action(
        &self,
        previous: &VectorSet,
        action: usize,
        stage: usize,
        purge: &Pruner<'_>,
        engine: &CrossSumEngine<'_>,
    ) -> Result<VectorSet> {
        let context = ErrorContext::stage(stage).with_action(action);

        let mut projections = Vec::with_capacity(self.model.dims().observations);
        for o in 0..self.model.dims().observations {
            let obs_context = context
                .clone()
                .with_observation(o)
                .with_phase(BackupPhase::Projecting);
            let projected = self.tables.project(previous, action, o);
            ensure_finite(&projected, obs_context.clone())?;
            let purged = purge
                .prune(&projected)
                .map_err(|e| SolverError::lp(obs_context, e))?;
            projections.push(purged);
        }
        debug!(
            stage,
            action,
            sizes = ?projections.iter().map(|z| z.len()).collect::<Vec<_>>(),
            "projected"
        );

        let cross_context = context.with_phase(BackupPhase::CrossSumming);
        let mut set = engine
            .combine(&projections)
            .map_err(|e| SolverError::lp(cross_context.clone(), e))?;
        if set.is_empty() {
            return Err(SolverError::EmptyCandidateSet {
                context: cross_context,
            });
        }
        set.shift(self.model.reward_vector(action));
        let set = set.with_action(action);
        ensure_finite(&set, cross_context)?;

        debug!(stage, action, vectors = set.len(), variant = %engine.variant(), "cross-summed");
        Ok(set)
    }

    fn grid_backup(&self, grid: &FiniteGrid, previous: &Layer, stage: usize) -> Result<Layer> {
        let merged = grid.backup(&self.model, &self.tables, &previous.merged, self.config.parallel);
        let context = ErrorContext::stage(stage).with_phase(BackupPhase::MergingActions);
        if merged.is_empty() {
            return Err(SolverError::EmptyCandidateSet { context });
        }
        ensure_finite(&merged, context)?;

        let per_action = (0..self.model.dims().actions)
            .map(|a| merged.iter().filter(|v| v.action == a).cloned().collect())
            .collect();
        debug!(stage, vectors = merged.len(), points = grid.len(), "grid backup");

        Ok(Layer {
            stage,
            per_action,
            merged,
        })
    }

    /// Solve starting from the horizon-0 layer.
    pub fn solve_from_terminal(&self) -> Result<SolveReport> {
        self.solve(Layer::terminal(self.model.dims()))
    }

    /// Run epochs from `initial` until a stopping condition holds.
    ///
    /// With a finite horizon only the `exact` criterion may end the run
    /// early, since identical layers stay identical; approximate criteria
    /// are ignored until the horizon is reached.
    pub fn solve(&self, initial: Layer) -> Result<SolveReport> {
        let start = Instant::now();
        let deadline = self.config.deadline();
        let horizon = self.config.horizon;
        let rule = StoppingRule::new(
            self.config.stopping,
            self.config.stop_delta,
            self.model.discount(),
            self.tolerance,
        );
        let early_stop = horizon.is_none() || rule.criterion() == StoppingCriterion::Exact;

        let mut metrics = SolverMetrics::new(0);
        let mut current = initial;
        let mut epochs = 0;

        let termination = loop {
            if horizon.map_or(false, |h| current.stage >= h) {
                break Termination::HorizonReached;
            }
            if epochs >= self.config.max_epochs {
                warn!(epochs, "epoch limit reached before convergence");
                break Termination::EpochLimit;
            }
            if let Some(limit) = deadline {
                if start.elapsed() >= limit {
                    warn!(epochs, stage = current.stage, "deadline reached, keeping last complete layer");
                    break Termination::Deadline;
                }
            }

            let epoch_start = Instant::now();
            let calls_before = self.lp.calls();

            let next = self.backup(&current)?;
            epochs += 1;

            let context = ErrorContext::stage(next.stage).with_phase(BackupPhase::StoppingCheck);
            let check = rule
                .check(&current.merged, &next.merged, &self.samples, &self.lp)
                .map_err(|e| SolverError::lp(context.clone(), e))?;
            let min_value = min_envelope_value(&self.lp, &next.merged)
                .map_err(|e| SolverError::lp(context, e))?;
            let max_value = next.merged.max_component();
            if let (Some(lo), Some(hi)) = (min_value, max_value) {
                check_value_bounds(lo, hi, self.model.value_bounds(), self.tolerance.epsilon() * 1e3);
            }

            metrics.record(EpochStats {
                epoch: next.stage,
                vectors: next.merged.len(),
                per_action: next.action_sizes(),
                lp_calls: self.lp.calls() - calls_before,
                elapsed_ms: epoch_start.elapsed().as_millis(),
                residual: check.residual,
                min_value,
                max_value,
            });
            info!(
                stage = next.stage,
                vectors = next.merged.len(),
                residual = ?check.residual,
                converged = check.converged,
                "epoch complete"
            );

            current = next;
            if check.converged && early_stop {
                break Termination::Converged;
            }
        };

        info!(%termination, epochs, stage = current.stage, vectors = current.merged.len(), "solve finished");
        Ok(SolveReport {
            value_function: ValueFunction::new(current, self.model.discount()),
            epochs,
            termination,
            metrics,
        })
    }
}
