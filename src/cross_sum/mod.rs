//! # Cross-sum engine
//!
//! Given the projected sets `Z_1 .. Z_k` of one action (one per
//! observation), every variant returns the parsimonious form of
//! `Z_1 (+) Z_2 (+) ... (+) Z_k`, where `(+)` is the Minkowski sum. They
//! differ only in how much of the full product they materialize:
//!
//! - `enum` builds the whole product and prunes once.
//! - `incprune` folds the sets pairwise and prunes after every step
//!   (`normal`), restricts each step to pairs whose belief regions overlap
//!   (`restricted_region`), or always merges the two smallest sets first
//!   (`generalized`).
//! - `witness` grows the result from one vector by checking single-
//!   observation swaps for witness beliefs.
//! - `twopass` walks observation choices depth-first and keeps a partial
//!   choice only while the intersection of its regions has interior.
//! - `linsup` starts from the simplex corners and repeatedly maximizes the
//!   gain of a swap over the region of each vector found so far.
//!
//! `restricted_region`, `witness`, `twopass` and `linsup` only ever build
//! vectors that own a belief region. Under `domonly` or `none` pruning the
//! other variants keep non-envelope vectors too, so these four run the plain
//! incremental fold instead and all variants return the same set.
//!
//! The immediate reward is not included; the caller shifts the result.

use ndarray::{Array1, ArrayView1};

use crate::alpha::AlphaVector;
use crate::config::{CrossSumVariant, IncPruneVariant, SolverConfig};
use crate::lp::LpError;
use crate::numeric::Tolerance;
use crate::prune::{dominance_prune, Pruner};
use crate::vector_set::VectorSet;

pub mod enumerate;
pub mod incremental;
pub mod linear_support;
pub mod two_pass;
pub mod witness;

pub use enumerate::{enumerate, full_cross_sum};
pub use incremental::{generalized, incremental, restricted_region};
pub use linear_support::linear_support;
pub use two_pass::two_pass;
pub use witness::witness;

/// One cross-sum variant bound to the pruner it reports through.
#[derive(Debug, Clone, Copy)]
pub struct CrossSumEngine<'a> {
    variant: CrossSumVariant,
    incprune: IncPruneVariant,
    pruner: Pruner<'a>,
}

impl<'a> CrossSumEngine<'a> {
    pub fn new(variant: CrossSumVariant, incprune: IncPruneVariant, pruner: Pruner<'a>) -> Self {
        CrossSumEngine {
            variant,
            incprune,
            pruner,
        }
    }

    pub fn from_config(config: &SolverConfig, pruner: Pruner<'a>) -> Self {
        CrossSumEngine::new(config.cross_sum, config.incprune, pruner)
    }

    pub fn variant(&self) -> CrossSumVariant {
        self.variant
    }

    /// Pruned cross-sum of `projections`. Empty if any input set is empty.
    pub fn combine(&self, projections: &[VectorSet]) -> Result<VectorSet, LpError> {
        if projections.is_empty() || projections.iter().any(|z| z.is_empty()) {
            return Ok(VectorSet::new());
        }

        let pruner = &self.pruner;
        match self.variant {
            CrossSumVariant::Enumerate => enumerate(projections, pruner),
            CrossSumVariant::IncPrune => match self.incprune {
                IncPruneVariant::Normal => incremental(projections, pruner),
                IncPruneVariant::RestrictedRegion => restricted_region(projections, pruner),
                IncPruneVariant::Generalized => generalized(projections, pruner),
            },
            CrossSumVariant::Witness => witness(projections, pruner),
            CrossSumVariant::TwoPass => two_pass(projections, pruner),
            CrossSumVariant::LinearSupport => linear_support(projections, pruner),
        }
    }
}

/// Per-observation best choice at `point`.
pub(crate) fn best_tuple(sets: &[VectorSet], point: ArrayView1<f64>, tol: &Tolerance) -> Option<Vec<usize>> {
    sets.iter().map(|z| z.best_index(point, tol)).collect()
}

/// Sum of the chosen vector of every observation.
pub(crate) fn tuple_vector(sets: &[VectorSet], tuple: &[usize]) -> AlphaVector {
    let first = &sets[0].vectors()[tuple[0]];
    let mut values = first.values.clone();
    for (z, &j) in sets.iter().zip(tuple.iter()).skip(1) {
        values += &z.vectors()[j].values;
    }
    AlphaVector::new(first.action, values)
}

/// `v_i - v_k` for every other `k`: the half-spaces of the region where
/// `v_i` is best in `set`.
pub(crate) fn region_diffs(set: &VectorSet, index: usize) -> Vec<Array1<f64>> {
    let v = &set.vectors()[index].values;
    set.iter()
        .enumerate()
        .filter(|&(k, _)| k != index)
        .map(|(_, w)| v - &w.values)
        .collect()
}

/// Inputs with duplicates and pointwise-dominated vectors removed, so that
/// every remaining vector owns a region of its own.
pub(crate) fn distinct_sets(projections: &[VectorSet], tol: &Tolerance) -> Vec<VectorSet> {
    projections.iter().map(|z| dominance_prune(z, tol)).collect()
}
