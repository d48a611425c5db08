// Test modules for all components
pub mod test_cross_sum;
pub mod test_edge_cases;

use crate::lp::{LpError, LpOutcome, LpProblem, LpSolver};

/// Backend that fails every call.
pub(crate) struct FailingLp;

impl LpSolver for FailingLp {
    fn solve(&self, _problem: &LpProblem) -> Result<LpOutcome, LpError> {
        Err(LpError::IterationLimit { iterations: 0 })
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Backend that reports every program infeasible.
pub(crate) struct InfeasibleLp;

impl LpSolver for InfeasibleLp {
    fn solve(&self, _problem: &LpProblem) -> Result<LpOutcome, LpError> {
        Ok(LpOutcome::Infeasible)
    }
}
