use crate::lp::LpError;
use crate::prune::Pruner;
use crate::vector_set::VectorSet;

/// The unpruned Minkowski sum: `|Z_1| * ... * |Z_k|` vectors.
pub fn full_cross_sum(projections: &[VectorSet]) -> VectorSet {
    let mut iter = projections.iter();
    let first = match iter.next() {
        Some(z) => z.clone(),
        None => return VectorSet::new(),
    };
    iter.fold(first, |acc, z| acc.cross_sum(z))
}

/// Materialize the whole product, then prune once.
pub fn enumerate(projections: &[VectorSet], pruner: &Pruner<'_>) -> Result<VectorSet, LpError> {
    pruner.prune(&full_cross_sum(projections))
}
