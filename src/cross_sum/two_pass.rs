use ndarray::Array1;

use crate::lp::region::max_margin;
use crate::lp::{LpError, LpSolver};
use crate::prune::Pruner;
use crate::vector_set::VectorSet;

use super::{distinct_sets, incremental, region_diffs, tuple_vector};

/// Two-pass construction.
///
/// The first pass walks observation choices depth-first and extends a
/// partial choice only while the intersection of the chosen vectors'
/// regions still has interior. The second pass builds one vector per
/// complete choice that survived. Region tests need LP pruning; under
/// `domonly` or `none` this is the plain incremental fold.
pub fn two_pass(projections: &[VectorSet], pruner: &Pruner<'_>) -> Result<VectorSet, LpError> {
    if !pruner.uses_lp() {
        return incremental(projections, pruner);
    }
    let sets = distinct_sets(projections, pruner.tolerance());
    let states = match sets.first().and_then(|z| z.dimension()) {
        Some(n) => n,
        None => return Ok(VectorSet::new()),
    };

    let regions: Vec<Vec<Vec<Array1<f64>>>> = sets
        .iter()
        .map(|z| (0..z.len()).map(|j| region_diffs(z, j)).collect())
        .collect();

    let search = RegionSearch {
        sets: &sets,
        regions: &regions,
        states,
        margin: pruner.margin(),
        lp: pruner.lp(),
    };
    let mut tuples = Vec::new();
    search.extend(&mut Vec::with_capacity(sets.len()), &[], &mut tuples)?;

    let vectors: VectorSet = tuples.iter().map(|t| tuple_vector(&sets, t)).collect();
    pruner.prune(&vectors)
}

struct RegionSearch<'s> {
    sets: &'s [VectorSet],
    regions: &'s [Vec<Vec<Array1<f64>>>],
    states: usize,
    margin: f64,
    lp: &'s dyn LpSolver,
}

impl RegionSearch<'_> {
    fn extend(
        &self,
        prefix: &mut Vec<usize>,
        diffs: &[Array1<f64>],
        out: &mut Vec<Vec<usize>>,
    ) -> Result<(), LpError> {
        let depth = prefix.len();
        if depth == self.sets.len() {
            out.push(prefix.clone());
            return Ok(());
        }

        for j in 0..self.sets[depth].len() {
            let mut extended = diffs.to_vec();
            extended.extend(self.regions[depth][j].iter().cloned());
            if !extended.is_empty() {
                let open = max_margin(self.lp, self.states, &extended)?
                    .map_or(false, |m| m.value > self.margin);
                if !open {
                    continue;
                }
            }
            prefix.push(j);
            self.extend(prefix, &extended, out)?;
            prefix.pop();
        }
        Ok(())
    }
}
