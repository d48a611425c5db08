//! Convergence tests between successive value-function layers.

use crate::belief::BeliefList;
use crate::config::StoppingCriterion;
use crate::lp::region::sup_norm_distance;
use crate::lp::{LpError, LpSolver};
use crate::numeric::Tolerance;
use crate::vector_set::VectorSet;

/// Outcome of one stopping check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopCheck {
    pub converged: bool,
    /// Measured change between the layers, when the criterion computes one.
    pub residual: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
pub struct StoppingRule {
    criterion: StoppingCriterion,
    stop_delta: f64,
    discount: f64,
    tolerance: Tolerance,
}

impl StoppingRule {
    pub fn new(criterion: StoppingCriterion, stop_delta: f64, discount: f64, tolerance: Tolerance) -> Self {
        StoppingRule {
            criterion,
            stop_delta,
            discount,
            tolerance,
        }
    }

    pub fn criterion(&self) -> StoppingCriterion {
        self.criterion
    }

    /// Residual below which the `bellman` criterion stops.
    ///
    /// `||V' - V|| <= delta (1 - gamma) / (2 gamma)` bounds the loss of the
    /// greedy policy by `delta`. With `gamma = 0` one backup is already
    /// exact and `delta` itself is used.
    pub fn bellman_threshold(&self) -> f64 {
        if self.discount <= 0.0 {
            self.stop_delta
        } else {
            self.stop_delta * (1.0 - self.discount) / (2.0 * self.discount)
        }
    }

    pub fn check(
        &self,
        previous: &VectorSet,
        next: &VectorSet,
        samples: &BeliefList,
        lp: &dyn LpSolver,
    ) -> Result<StopCheck, LpError> {
        match self.criterion {
            StoppingCriterion::Exact => Ok(StopCheck {
                converged: next.approx_eq_set(previous, &self.tolerance),
                residual: sampled_difference(previous, next, samples),
            }),
            StoppingCriterion::Weak => {
                let residual = sampled_difference(previous, next, samples);
                Ok(StopCheck {
                    converged: residual.map_or(false, |r| r < self.stop_delta),
                    residual,
                })
            }
            StoppingCriterion::Bellman => {
                let residual = sup_norm_distance(lp, previous, next)?;
                Ok(StopCheck {
                    converged: residual.map_or(false, |r| r <= self.bellman_threshold()),
                    residual,
                })
            }
        }
    }
}

/// `max_b |V'(b) - V(b)|` over the sampled beliefs.
pub fn sampled_difference(previous: &VectorSet, next: &VectorSet, samples: &BeliefList) -> Option<f64> {
    samples
        .iter()
        .filter_map(|b| Some((next.value(b)? - previous.value(b)?).abs()))
        .fold(None, |acc, d| Some(acc.map_or(d, |a: f64| a.max(d))))
}
