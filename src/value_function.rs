//! Value-function layers and the artifact handed to downstream planners.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::alpha::AlphaVector;
use crate::belief::Belief;
use crate::error::{Result, SolverError};
use crate::model::ProblemDimensions;
use crate::numeric::Tolerance;
use crate::vector_set::VectorSet;

/// Result of one epoch: the pruned vectors of every action and their
/// pruned union.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub stage: usize,
    /// Empty for layers that were not produced by a backup.
    pub per_action: Vec<VectorSet>,
    pub merged: VectorSet,
}

impl Layer {
    /// Horizon-0 layer: a single zero vector.
    pub fn terminal(dims: ProblemDimensions) -> Self {
        Layer::from_vectors(
            0,
            std::iter::once(AlphaVector::zeros(0, dims.states)).collect(),
        )
    }

    /// Layer built from an arbitrary set, e.g. a lower bound to start from.
    pub fn from_vectors(stage: usize, merged: VectorSet) -> Self {
        Layer {
            stage,
            per_action: Vec::new(),
            merged,
        }
    }

    pub fn len(&self) -> usize {
        self.merged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.merged.is_empty()
    }

    pub fn vectors(&self) -> &VectorSet {
        &self.merged
    }

    /// Vector count of every action before merging.
    pub fn action_sizes(&self) -> Vec<usize> {
        self.per_action.iter().map(|s| s.len()).collect()
    }
}

/// Final value function: the last completed layer plus the discount it was
/// computed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueFunction {
    pub layer: Layer,
    pub discount: f64,
}

impl ValueFunction {
    pub fn new(layer: Layer, discount: f64) -> Self {
        ValueFunction { layer, discount }
    }

    pub fn stage(&self) -> usize {
        self.layer.stage
    }

    pub fn vectors(&self) -> &VectorSet {
        &self.layer.merged
    }

    pub fn value(&self, belief: &Belief) -> Option<f64> {
        self.layer.merged.value(belief)
    }

    pub fn best_vector(&self, belief: &Belief, tol: &Tolerance) -> Option<&AlphaVector> {
        self.layer.merged.best_vector(belief, tol)
    }

    /// Action of the best vector at `belief`.
    pub fn best_action(&self, belief: &Belief, tol: &Tolerance) -> Option<usize> {
        self.best_vector(belief, tol).map(|v| v.action)
    }

    /// Save in bincode format.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let vf: ValueFunction = bincode::deserialize_from(reader)?;
        if let Some(n) = vf.layer.merged.dimension() {
            if let Some(bad) = vf.layer.merged.iter().find(|v| v.len() != n) {
                return Err(SolverError::dimension_mismatch(
                    format!("vectors of length {}", n),
                    format!("length {}", bad.len()),
                ));
            }
        }
        Ok(vf)
    }
}
