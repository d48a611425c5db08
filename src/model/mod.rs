//! # Discrete POMDP model
//!
//! The solver only needs a handful of things from a problem: its
//! dimensions, `P(s'|s,a)`, `P(o|s',a)`, the expected immediate reward
//! `R(s,a)` and the discount factor. Parsing problem files is left to
//! callers; models are assembled in code, usually through
//! [`crate::builders::PomdpModelBuilder`].

pub mod cpd;

pub use cpd::{Cpd, KroneckerDelta, TableCpd};

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};

/// Sizes of the state, action and observation spaces.
///
/// Fixed once a model is built and passed by value wherever a component
/// needs to know vector lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProblemDimensions {
    pub states: usize,
    pub actions: usize,
    pub observations: usize,
}

impl ProblemDimensions {
    pub fn new(states: usize, actions: usize, observations: usize) -> Self {
        ProblemDimensions {
            states,
            actions,
            observations,
        }
    }
}

/// Probability-row tolerance used by model validation.
const STOCHASTIC_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PomdpModel {
    dims: ProblemDimensions,
    /// `transitions[a]`: condition `s`, outcome `s'`
    transitions: Vec<Cpd>,
    /// `observations[a]`: condition `s'`, outcome `o`
    observations: Vec<Cpd>,
    /// `rewards[[s, a]]`
    rewards: Array2<f64>,
    discount: f64,
    initial_belief: Option<Array1<f64>>,
}

impl PomdpModel {
    /// Assemble and validate a model.
    pub fn new(
        transitions: Vec<Cpd>,
        observations: Vec<Cpd>,
        rewards: Array2<f64>,
        discount: f64,
    ) -> Result<Self> {
        let states = rewards.nrows();
        let actions = rewards.ncols();
        let num_obs = observations.first().map(|o| o.outcomes()).unwrap_or(0);
        let model = PomdpModel {
            dims: ProblemDimensions::new(states, actions, num_obs),
            transitions,
            observations,
            rewards,
            discount,
            initial_belief: None,
        };
        model.validate()?;
        Ok(model)
    }

    /// Assemble a model whose tables are stochastic by construction.
    pub(crate) fn from_parts(
        transitions: Vec<Cpd>,
        observations: Vec<Cpd>,
        rewards: Array2<f64>,
        discount: f64,
    ) -> Self {
        let num_obs = observations.first().map(|o| o.outcomes()).unwrap_or(0);
        let model = PomdpModel {
            dims: ProblemDimensions::new(rewards.nrows(), rewards.ncols(), num_obs),
            transitions,
            observations,
            rewards,
            discount,
            initial_belief: None,
        };
        debug_assert!(model.validate().is_ok());
        model
    }

    pub fn with_initial_belief(mut self, belief: Array1<f64>) -> Result<Self> {
        if belief.len() != self.dims.states {
            return Err(SolverError::dimension_mismatch(
                format!("initial belief of length {}", self.dims.states),
                format!("length {}", belief.len()),
            ));
        }
        self.initial_belief = Some(belief);
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        let ProblemDimensions {
            states,
            actions,
            observations,
        } = self.dims;

        if states == 0 || actions == 0 || observations == 0 {
            return Err(SolverError::InvalidModel(format!(
                "empty model: {} states, {} actions, {} observations",
                states, actions, observations
            )));
        }
        if !(0.0..=1.0).contains(&self.discount) {
            return Err(SolverError::InvalidModel(format!(
                "discount must lie in [0, 1], got {}",
                self.discount
            )));
        }
        if self.transitions.len() != actions || self.observations.len() != actions {
            return Err(SolverError::dimension_mismatch(
                format!("{} transition and observation CPDs", actions),
                format!(
                    "{} transition and {} observation CPDs",
                    self.transitions.len(),
                    self.observations.len()
                ),
            ));
        }
        for (a, cpd) in self.transitions.iter().enumerate() {
            if cpd.conditions() != states || cpd.outcomes() != states {
                return Err(SolverError::dimension_mismatch(
                    format!("{0}x{0} transition table for action {1}", states, a),
                    format!("{}x{}", cpd.conditions(), cpd.outcomes()),
                ));
            }
            cpd.sanity_check(STOCHASTIC_TOLERANCE).map_err(|e| {
                SolverError::InvalidModel(format!("transitions of action {}: {}", a, e))
            })?;
        }
        for (a, cpd) in self.observations.iter().enumerate() {
            if cpd.conditions() != states || cpd.outcomes() != observations {
                return Err(SolverError::dimension_mismatch(
                    format!("{}x{} observation table for action {}", states, observations, a),
                    format!("{}x{}", cpd.conditions(), cpd.outcomes()),
                ));
            }
            cpd.sanity_check(STOCHASTIC_TOLERANCE).map_err(|e| {
                SolverError::InvalidModel(format!("observations of action {}: {}", a, e))
            })?;
        }
        if self.rewards.iter().any(|r| !r.is_finite()) {
            return Err(SolverError::InvalidModel("non-finite reward".to_string()));
        }
        Ok(())
    }

    pub fn dims(&self) -> ProblemDimensions {
        self.dims
    }

    pub fn discount(&self) -> f64 {
        self.discount
    }

    pub fn transition(&self, action: usize) -> &Cpd {
        &self.transitions[action]
    }

    pub fn observation(&self, action: usize) -> &Cpd {
        &self.observations[action]
    }

    /// Immediate reward vector `R(., a)`.
    pub fn reward_vector(&self, action: usize) -> ArrayView1<'_, f64> {
        self.rewards.column(action)
    }

    pub fn rewards(&self) -> &Array2<f64> {
        &self.rewards
    }

    /// Initial belief, uniform when none was given.
    pub fn initial_belief(&self) -> Array1<f64> {
        self.initial_belief.clone().unwrap_or_else(|| {
            Array1::from_elem(self.dims.states, 1.0 / self.dims.states as f64)
        })
    }

    /// Smallest and largest immediate reward.
    pub fn reward_bounds(&self) -> (f64, f64) {
        let min = self.rewards.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.rewards.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (min, max)
    }

    /// Envelope every finite-horizon value function started from zero stays in.
    ///
    /// `None` when the discount is 1 and no finite bound exists.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        if self.discount >= 1.0 {
            return None;
        }
        let (min, max) = self.reward_bounds();
        let scale = 1.0 / (1.0 - self.discount);
        Some((min.min(0.0) * scale, max.max(0.0) * scale))
    }
}
