use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};

/// Dense conditional probability table, `P(outcome | cond)` stored row-wise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCpd {
    table: Array2<f64>,
}

impl TableCpd {
    pub fn new(table: Array2<f64>) -> Self {
        TableCpd { table }
    }

    /// Zero table with `conditions` rows and `outcomes` columns.
    pub fn zeros(conditions: usize, outcomes: usize) -> Self {
        TableCpd {
            table: Array2::zeros((conditions, outcomes)),
        }
    }

    /// Uniform distribution over outcomes for every condition.
    pub fn uniform(conditions: usize, outcomes: usize) -> Self {
        TableCpd {
            table: Array2::from_elem((conditions, outcomes), 1.0 / outcomes as f64),
        }
    }

    pub fn set(&mut self, cond: usize, outcome: usize, prob: f64) {
        self.table[[cond, outcome]] = prob;
    }

    pub fn table(&self) -> &Array2<f64> {
        &self.table
    }
}

/// Deterministic CPD: every condition maps to exactly one outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KroneckerDelta {
    outcomes: usize,
    targets: Vec<usize>,
}

impl KroneckerDelta {
    pub fn new(targets: Vec<usize>, outcomes: usize) -> Self {
        KroneckerDelta { outcomes, targets }
    }

    /// The identity map over `n` values.
    pub fn identity(n: usize) -> Self {
        KroneckerDelta {
            outcomes: n,
            targets: (0..n).collect(),
        }
    }

    pub fn target(&self, cond: usize) -> usize {
        self.targets[cond]
    }
}

/// Conditional probability distribution over a discrete outcome space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cpd {
    Table(TableCpd),
    KroneckerDelta(KroneckerDelta),
}

impl Cpd {
    pub fn conditions(&self) -> usize {
        match self {
            Cpd::Table(t) => t.table.nrows(),
            Cpd::KroneckerDelta(k) => k.targets.len(),
        }
    }

    pub fn outcomes(&self) -> usize {
        match self {
            Cpd::Table(t) => t.table.ncols(),
            Cpd::KroneckerDelta(k) => k.outcomes,
        }
    }

    /// `P(outcome | cond)`
    pub fn get(&self, cond: usize, outcome: usize) -> f64 {
        match self {
            Cpd::Table(t) => t.table[[cond, outcome]],
            Cpd::KroneckerDelta(k) => {
                if k.targets[cond] == outcome {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Draw an outcome for the given condition.
    pub fn sample<R: Rng + ?Sized>(&self, cond: usize, rng: &mut R) -> usize {
        match self {
            Cpd::KroneckerDelta(k) => k.targets[cond],
            Cpd::Table(t) => {
                let row = t.table.row(cond);
                let u: f64 = rng.gen();
                let mut cumsum = 0.0;
                for (outcome, &p) in row.iter().enumerate() {
                    cumsum += p;
                    if u < cumsum {
                        return outcome;
                    }
                }
                // Rounding left a sliver at the top; return the last supported outcome.
                row.iter()
                    .rposition(|&p| p > 0.0)
                    .unwrap_or(row.len().saturating_sub(1))
            }
        }
    }

    /// Check every row is a probability distribution within `tolerance`.
    pub fn sanity_check(&self, tolerance: f64) -> Result<()> {
        match self {
            Cpd::KroneckerDelta(k) => {
                if let Some(cond) = k.targets.iter().position(|&t| t >= k.outcomes) {
                    return Err(SolverError::InvalidModel(format!(
                        "delta target {} for condition {} exceeds {} outcomes",
                        k.targets[cond], cond, k.outcomes
                    )));
                }
                Ok(())
            }
            Cpd::Table(t) => {
                for (cond, row) in t.table.outer_iter().enumerate() {
                    if let Some(p) = row.iter().find(|&&p| !p.is_finite() || p < -tolerance) {
                        return Err(SolverError::InvalidModel(format!(
                            "invalid probability {} for condition {}",
                            p, cond
                        )));
                    }
                    let sum = row.sum();
                    if (sum - 1.0).abs() > tolerance {
                        return Err(SolverError::InvalidModel(format!(
                            "row {} sums to {} instead of 1",
                            cond, sum
                        )));
                    }
                }
                Ok(())
            }
        }
    }

    /// Dense `conditions x outcomes` matrix.
    pub fn to_dense(&self) -> Array2<f64> {
        match self {
            Cpd::Table(t) => t.table.clone(),
            Cpd::KroneckerDelta(k) => {
                let mut dense = Array2::zeros((k.targets.len(), k.outcomes));
                for (cond, &target) in k.targets.iter().enumerate() {
                    dense[[cond, target]] = 1.0;
                }
                dense
            }
        }
    }
}

impl From<TableCpd> for Cpd {
    fn from(table: TableCpd) -> Self {
        Cpd::Table(table)
    }
}

impl From<KroneckerDelta> for Cpd {
    fn from(delta: KroneckerDelta) -> Self {
        Cpd::KroneckerDelta(delta)
    }
}
