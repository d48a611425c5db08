//! Projection of a vector set through one action and observation.
//!
//! `alpha'[s] = gamma * sum_{s'} P(s'|s,a) P(o|s',a) alpha[s']`
//!
//! The per-(action, observation) matrices are built once per model and then
//! shared read-only by every epoch and every parallel task.

use ndarray::{Array2, Axis};

use crate::alpha::AlphaVector;
use crate::model::PomdpModel;
use crate::vector_set::VectorSet;

#[derive(Debug, Clone)]
pub struct ProjectionTables {
    /// `matrices[a][o][[s, s']] = gamma * P(s'|s,a) * P(o|s',a)`
    matrices: Vec<Vec<Array2<f64>>>,
}

impl ProjectionTables {
    pub fn new(model: &PomdpModel) -> Self {
        let dims = model.dims();
        let gamma = model.discount();

        let matrices = (0..dims.actions)
            .map(|a| {
                let transition = model.transition(a).to_dense();
                let observation = model.observation(a).to_dense();
                (0..dims.observations)
                    .map(|o| {
                        let obs_column = observation.column(o);
                        let mut m = transition.clone();
                        for mut row in m.axis_iter_mut(Axis(0)) {
                            row *= &obs_column;
                        }
                        m * gamma
                    })
                    .collect()
            })
            .collect();

        ProjectionTables { matrices }
    }

    pub fn actions(&self) -> usize {
        self.matrices.len()
    }

    pub fn observations(&self) -> usize {
        self.matrices.first().map_or(0, |m| m.len())
    }

    pub fn matrix(&self, action: usize, observation: usize) -> &Array2<f64> {
        &self.matrices[action][observation]
    }

    /// One projected vector per source vector, tagged with `action`.
    pub fn project(&self, set: &VectorSet, action: usize, observation: usize) -> VectorSet {
        let m = self.matrix(action, observation);
        set.iter()
            .map(|v| AlphaVector::new(action, m.dot(&v.values)))
            .collect()
    }

    /// Projection of a single vector.
    pub fn project_vector(&self, vector: &AlphaVector, action: usize, observation: usize) -> AlphaVector {
        AlphaVector::new(action, self.matrix(action, observation).dot(&vector.values))
    }
}
