//! # Pruning
//!
//! Removes vectors that never attain the upper envelope of a set.
//!
//! | strength        | test                                             |
//! |-----------------|--------------------------------------------------|
//! | `none`          | nothing removed                                  |
//! | `domonly`       | single-vector pointwise dominance                |
//! | `normal_prune`  | dominance, then an LP witness per vector          |
//! | `epsilon_prune` | as `normal_prune`, with the witness margin raised |
//!
//! An infeasible witness program just means "prune this vector". A backend
//! failure ([`LpError`]) is returned to the caller, which treats it as fatal.

use tracing::trace;

use crate::config::{PruneStrength, SolverConfig};
use crate::error::Result;
use crate::lp::{LpError, LpSolver};
use crate::numeric::Tolerance;
use crate::vector_set::VectorSet;

pub mod dominance;
pub mod lark;

pub use dominance::dominance_prune;
pub use lark::lark_prune;

/// A pruning strength bound to its tolerances and LP backend.
#[derive(Clone, Copy)]
pub struct Pruner<'a> {
    strength: PruneStrength,
    tolerance: Tolerance,
    margin: f64,
    lp: &'a dyn LpSolver,
}

impl<'a> Pruner<'a> {
    pub fn new(strength: PruneStrength, tolerance: Tolerance, margin: f64, lp: &'a dyn LpSolver) -> Self {
        Pruner {
            strength,
            tolerance,
            margin,
            lp,
        }
    }

    /// Pruner for `strength` using the tolerances of `config`.
    pub fn from_config(
        config: &SolverConfig,
        strength: PruneStrength,
        lp: &'a dyn LpSolver,
    ) -> Result<Self> {
        Ok(Pruner::new(
            strength,
            config.prune_tolerance()?,
            config.margin_for(strength),
            lp,
        ))
    }

    /// Same backend and tolerances with a different strength.
    pub fn with_strength(&self, strength: PruneStrength) -> Self {
        Pruner { strength, ..*self }
    }

    pub fn strength(&self) -> PruneStrength {
        self.strength
    }

    /// Whether pruning keeps only vectors with a witness belief.
    pub fn uses_lp(&self) -> bool {
        matches!(self.strength, PruneStrength::Normal | PruneStrength::Epsilon)
    }

    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    /// Margin a witness point must exceed for a vector to count as useful.
    pub fn margin(&self) -> f64 {
        self.margin
    }

    pub fn lp(&self) -> &'a dyn LpSolver {
        self.lp
    }

    pub fn prune(&self, set: &VectorSet) -> std::result::Result<VectorSet, LpError> {
        if set.is_empty() {
            return Ok(VectorSet::new());
        }

        let pruned = match self.strength {
            PruneStrength::None => set.clone(),
            PruneStrength::DomOnly => dominance_prune(set, &self.tolerance),
            PruneStrength::Normal | PruneStrength::Epsilon => {
                let filtered = dominance_prune(set, &self.tolerance);
                lark_prune(&filtered, &self.tolerance, self.margin, self.lp)?
            }
        };

        trace!(
            strength = %self.strength,
            before = set.len(),
            after = pruned.len(),
            "pruned vector set"
        );
        Ok(pruned)
    }
}

impl std::fmt::Debug for Pruner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pruner")
            .field("strength", &self.strength)
            .field("tolerance", &self.tolerance)
            .field("margin", &self.margin)
            .field("lp", &self.lp.name())
            .finish()
    }
}
