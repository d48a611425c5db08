//! Point-based backups over a fixed belief grid.
//!
//! Each epoch keeps, for every grid belief, the best backed-up vector at
//! that belief. The result is a lower bound on the exact backup that never
//! needs an LP.

use crate::alpha::AlphaVector;
use crate::belief::{Belief, BeliefGrid};
use crate::model::PomdpModel;
use crate::numeric::Tolerance;
use crate::parallel::map_slice;
use crate::projection::ProjectionTables;
use crate::vector_set::VectorSet;

#[derive(Debug, Clone)]
pub struct FiniteGrid {
    points: Vec<Belief>,
    tolerance: Tolerance,
    fg_tolerance: Tolerance,
}

impl FiniteGrid {
    /// `tolerance` breaks ties between vectors; `fg_tolerance` decides when
    /// two backed-up vectors are the same.
    pub fn new(grid: &BeliefGrid, tolerance: Tolerance, fg_tolerance: Tolerance) -> Self {
        FiniteGrid {
            points: grid.points().iter().cloned().collect(),
            tolerance,
            fg_tolerance,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Belief] {
        &self.points
    }

    /// Backed-up layer: distinct best vectors over the grid, in grid order.
    pub fn backup(
        &self,
        model: &PomdpModel,
        tables: &ProjectionTables,
        previous: &VectorSet,
        parallel: bool,
    ) -> VectorSet {
        if previous.is_empty() {
            return VectorSet::new();
        }

        let dims = model.dims();
        let projections: Vec<Vec<VectorSet>> = (0..dims.actions)
            .map(|a| {
                (0..dims.observations)
                    .map(|o| tables.project(previous, a, o))
                    .collect()
            })
            .collect();

        let best = map_slice(&self.points, parallel, |b| {
            self.point_backup(model, &projections, b)
        });

        let mut result = VectorSet::with_capacity(self.points.len());
        for v in best.into_iter().flatten() {
            if !result.contains(&v, &self.fg_tolerance) {
                result.push(v);
            }
        }
        result
    }

    /// Best vector of the exact backup at `belief`:
    /// `max_a R(., a) + sum_o argmax_{z in Z_ao} z . b`.
    fn point_backup(
        &self,
        model: &PomdpModel,
        projections: &[Vec<VectorSet>],
        belief: &Belief,
    ) -> Option<AlphaVector> {
        let candidates: VectorSet = projections
            .iter()
            .enumerate()
            .filter_map(|(a, per_obs)| {
                let mut values = model.reward_vector(a).to_owned();
                for z in per_obs {
                    values += &z.best_vector(belief, &self.tolerance)?.values;
                }
                Some(AlphaVector::new(a, values))
            })
            .collect();

        candidates
            .best_index(belief.view(), &self.tolerance)
            .and_then(|i| candidates.get(i).cloned())
    }
}
