use std::collections::HashMap;

use ndarray::Array2;

use crate::error::{Result, SolverError};
use crate::model::{Cpd, KroneckerDelta, PomdpModel, ProblemDimensions, TableCpd};

/// Builder for [`PomdpModel`].
///
/// Tables start at zero, so every row has to be filled in before `build`
/// passes validation. Rewards can be given as `R(s,a)` directly or as
/// `R(s,a,s',o)`, which is reduced to its expectation under the model.
pub struct PomdpModelBuilder {
    dims: ProblemDimensions,
    transitions: Vec<Cpd>,
    observations: Vec<Cpd>,
    rewards: Array2<f64>,
    outcome_rewards: HashMap<(usize, usize, usize, usize), f64>,
    discount: Option<f64>,
    initial_belief: Option<Vec<f64>>,
}

impl PomdpModelBuilder {
    pub fn new(dims: ProblemDimensions) -> Self {
        PomdpModelBuilder {
            dims,
            transitions: (0..dims.actions)
                .map(|_| TableCpd::zeros(dims.states, dims.states).into())
                .collect(),
            observations: (0..dims.actions)
                .map(|_| TableCpd::zeros(dims.states, dims.observations).into())
                .collect(),
            rewards: Array2::zeros((dims.states, dims.actions)),
            outcome_rewards: HashMap::new(),
            discount: None,
            initial_belief: None,
        }
    }

    pub fn discount(mut self, discount: f64) -> Self {
        self.discount = Some(discount);
        self
    }

    /// Set `P(to | from, action)`.
    pub fn transition(mut self, action: usize, from: usize, to: usize, prob: f64) -> Self {
        if let Some(table) = self.transitions.get_mut(action).and_then(table_mut) {
            table.set(from, to, prob);
        }
        self
    }

    /// Make `action` move every state deterministically to `targets[s]`.
    pub fn deterministic_transition(mut self, action: usize, targets: Vec<usize>) -> Self {
        if let Some(cpd) = self.transitions.get_mut(action) {
            *cpd = KroneckerDelta::new(targets, self.dims.states).into();
        }
        self
    }

    /// Set `P(obs | next_state, action)`.
    pub fn observation(mut self, action: usize, next_state: usize, obs: usize, prob: f64) -> Self {
        if let Some(table) = self.observations.get_mut(action).and_then(table_mut) {
            table.set(next_state, obs, prob);
        }
        self
    }

    /// Same observation distribution for every next state.
    pub fn uniform_observations(mut self, action: usize) -> Self {
        if let Some(cpd) = self.observations.get_mut(action) {
            *cpd = TableCpd::uniform(self.dims.states, self.dims.observations).into();
        }
        self
    }

    /// Set `R(state, action)`.
    pub fn reward(mut self, state: usize, action: usize, reward: f64) -> Self {
        if state < self.dims.states && action < self.dims.actions {
            self.rewards[[state, action]] = reward;
        }
        self
    }

    /// Set `R(state, action, next_state, obs)`. Added on top of `R(state, action)`
    /// after weighting by `P(next_state|state,action) P(obs|next_state,action)`.
    pub fn outcome_reward(
        mut self,
        state: usize,
        action: usize,
        next_state: usize,
        obs: usize,
        reward: f64,
    ) -> Self {
        self.outcome_rewards
            .insert((state, action, next_state, obs), reward);
        self
    }

    pub fn initial_belief(mut self, belief: Vec<f64>) -> Self {
        self.initial_belief = Some(belief);
        self
    }

    pub fn build(self) -> Result<PomdpModel> {
        let discount = self.discount.ok_or_else(|| SolverError::InvalidModel(
            "discount not specified".to_string(),
        ))?;

        let mut rewards = self.rewards;
        for (&(s, a, next, o), &r) in &self.outcome_rewards {
            let in_range = s < self.dims.states
                && a < self.dims.actions
                && next < self.dims.states
                && o < self.dims.observations;
            if !in_range {
                return Err(SolverError::InvalidModel(format!(
                    "reward index ({}, {}, {}, {}) out of range",
                    s, a, next, o
                )));
            }
            let weight = self.transitions[a].get(s, next) * self.observations[a].get(next, o);
            rewards[[s, a]] += weight * r;
        }

        let model = PomdpModel::new(self.transitions, self.observations, rewards, discount)?;
        match self.initial_belief {
            Some(b) => model.with_initial_belief(b.into()),
            None => Ok(model),
        }
    }
}

/// Mutable table view of a CPD, densifying a delta first.
fn table_mut(cpd: &mut Cpd) -> Option<&mut TableCpd> {
    if let Cpd::KroneckerDelta(_) = cpd {
        *cpd = TableCpd::new(cpd.to_dense()).into();
    }
    match cpd {
        Cpd::Table(t) => Some(t),
        Cpd::KroneckerDelta(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiger_like() -> PomdpModelBuilder {
        let dims = ProblemDimensions::new(2, 2, 2);
        PomdpModelBuilder::new(dims)
            .discount(0.9)
            .deterministic_transition(0, vec![0, 1])
            .transition(1, 0, 0, 0.5)
            .transition(1, 0, 1, 0.5)
            .transition(1, 1, 0, 0.5)
            .transition(1, 1, 1, 0.5)
            .observation(0, 0, 0, 0.8)
            .observation(0, 0, 1, 0.2)
            .observation(0, 1, 0, 0.2)
            .observation(0, 1, 1, 0.8)
            .uniform_observations(1)
    }

    #[test]
    fn test_build_valid_model() {
        let model = tiger_like().reward(0, 0, -1.0).reward(1, 0, -1.0).build().unwrap();
        assert_eq!(model.dims(), ProblemDimensions::new(2, 2, 2));
        assert_eq!(model.reward_vector(0).to_vec(), vec![-1.0, -1.0]);
    }

    #[test]
    fn test_outcome_rewards_are_expected() {
        // paid only when listening in state 0 yields observation 0
        let model = tiger_like().outcome_reward(0, 0, 0, 0, 10.0).build().unwrap();
        assert!((model.rewards()[[0, 0]] - 8.0).abs() < 1e-12);
        assert_eq!(model.rewards()[[1, 0]], 0.0);
    }

    #[test]
    fn test_missing_rows_fail_validation() {
        let dims = ProblemDimensions::new(2, 1, 1);
        let result = PomdpModelBuilder::new(dims).discount(0.9).build();
        assert!(matches!(result, Err(SolverError::InvalidModel(_))));
    }

    #[test]
    fn test_missing_discount() {
        let dims = ProblemDimensions::new(1, 1, 1);
        let result = PomdpModelBuilder::new(dims)
            .deterministic_transition(0, vec![0])
            .uniform_observations(0)
            .build();
        assert!(result.is_err());
    }
}
