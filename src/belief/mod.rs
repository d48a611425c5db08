//! # Belief Module
//!
//! A belief is a probability distribution over the discrete states of a
//! model. This module provides the belief value type and its helpers.
//!
//! ## Available Components
//!
//! - `Belief`: dense distribution with epsilon-tolerant equality and a Bayes update
//! - `BeliefList`: ordered, owning collection of beliefs with per-entry marks
//! - `io`: line-oriented text persistence for belief lists
//! - `BeliefSampler`: seeded random, corner and reachable belief generation
//! - `BeliefGrid`: fixed-resolution simplex grid for the finite-grid method

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};
use crate::model::PomdpModel;

pub mod grid;
pub mod io;
pub mod list;
pub mod sampler;

pub use grid::BeliefGrid;
pub use io::{read_belief_list, write_belief_list};
pub use list::{BeliefList, MarkedBelief};
pub use sampler::BeliefSampler;

/// Probability distribution over states.
///
/// Construction does not enforce that the components sum to one; callers
/// are responsible for passing valid distributions. See [`Belief::is_valid`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Belief {
    probs: Array1<f64>,
}

impl Belief {
    /// Zero-initialized belief over `states` states.
    pub fn new(states: usize) -> Self {
        Belief {
            probs: Array1::zeros(states),
        }
    }

    pub fn from_array(probs: Array1<f64>) -> Self {
        Belief { probs }
    }

    pub fn from_vec(probs: Vec<f64>) -> Self {
        Belief {
            probs: Array1::from_vec(probs),
        }
    }

    pub fn uniform(states: usize) -> Self {
        Belief {
            probs: Array1::from_elem(states, 1.0 / states as f64),
        }
    }

    /// All mass on `state`.
    pub fn corner(states: usize, state: usize) -> Self {
        let mut probs = Array1::zeros(states);
        probs[state] = 1.0;
        Belief { probs }
    }

    pub fn len(&self) -> usize {
        self.probs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    pub fn view(&self) -> ArrayView1<'_, f64> {
        self.probs.view()
    }

    pub fn as_array(&self) -> &Array1<f64> {
        &self.probs
    }

    pub fn into_array(self) -> Array1<f64> {
        self.probs
    }

    pub fn get(&self, state: usize) -> f64 {
        self.probs[state]
    }

    /// `sum_s b[s] * v[s]`
    pub fn dot(&self, values: ArrayView1<f64>) -> f64 {
        self.probs.dot(&values)
    }

    /// Every component differs by less than `epsilon` (absolute test).
    pub fn approx_eq(&self, other: &Belief, epsilon: f64) -> bool {
        self.probs.len() == other.probs.len()
            && self
                .probs
                .iter()
                .zip(other.probs.iter())
                .all(|(a, b)| (a - b).abs() < epsilon)
    }

    /// Non-negative and summing to one within `epsilon`.
    pub fn is_valid(&self, epsilon: f64) -> bool {
        self.probs.iter().all(|&p| p.is_finite() && p > -epsilon)
            && (self.probs.sum() - 1.0).abs() < epsilon
    }

    /// Bayes filter: posterior after taking `action` and seeing `observation`.
    ///
    /// Returns the posterior together with `P(o | b, a)`, or `None` when the
    /// observation cannot occur from this belief.
    pub fn update(
        &self,
        model: &PomdpModel,
        action: usize,
        observation: usize,
    ) -> Result<Option<(Belief, f64)>> {
        let dims = model.dims();
        if self.len() != dims.states {
            return Err(SolverError::dimension_mismatch(
                format!("belief of length {}", dims.states),
                format!("length {}", self.len()),
            ));
        }
        let transition = model.transition(action);
        let obs = model.observation(action);

        let mut next = Array1::zeros(dims.states);
        for s in 0..dims.states {
            let p = self.probs[s];
            if p <= 0.0 {
                continue;
            }
            for s_next in 0..dims.states {
                next[s_next] += p * transition.get(s, s_next);
            }
        }
        for s_next in 0..dims.states {
            next[s_next] *= obs.get(s_next, observation);
        }

        let norm = next.sum();
        if norm <= 0.0 {
            return Ok(None);
        }
        next /= norm;
        Ok(Some((Belief { probs: next }, norm)))
    }
}

/// Equality for optional beliefs: both absent, or both present and equal
/// component-wise within `epsilon`.
pub fn beliefs_equal(a: Option<&Belief>, b: Option<&Belief>, epsilon: f64) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.approx_eq(b, epsilon),
        _ => false,
    }
}
