use std::collections::VecDeque;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Statistics of one completed epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    pub epoch: usize,
    /// Vectors in the merged, pruned layer
    pub vectors: usize,
    /// Vectors per action before merging
    pub per_action: Vec<usize>,
    /// LP calls made during the epoch, stopping check included
    pub lp_calls: u64,
    pub elapsed_ms: u128,
    /// Change reported by the stopping criterion
    pub residual: Option<f64>,
    /// Minimum of the envelope over the simplex
    pub min_value: Option<f64>,
    /// Maximum of the envelope over the simplex
    pub max_value: Option<f64>,
}

/// Per-epoch history of a solver run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolverMetrics {
    pub epochs: VecDeque<EpochStats>,
    /// Oldest entries are dropped beyond this many epochs; 0 keeps all.
    pub history_size: usize,
}

impl SolverMetrics {
    pub fn new(history_size: usize) -> Self {
        SolverMetrics {
            epochs: VecDeque::with_capacity(history_size.min(1024)),
            history_size,
        }
    }

    pub fn record(&mut self, stats: EpochStats) {
        if self.history_size > 0 && self.epochs.len() >= self.history_size {
            self.epochs.pop_front();
        }
        self.epochs.push_back(stats);
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn last(&self) -> Option<&EpochStats> {
        self.epochs.back()
    }

    pub fn total_lp_calls(&self) -> u64 {
        self.epochs.iter().map(|e| e.lp_calls).sum()
    }

    pub fn total_elapsed_ms(&self) -> u128 {
        self.epochs.iter().map(|e| e.elapsed_ms).sum()
    }

    /// Largest layer seen.
    pub fn peak_vectors(&self) -> usize {
        self.epochs.iter().map(|e| e.vectors).max().unwrap_or(0)
    }

    /// Mean residual over the last `window` epochs that report one.
    pub fn avg_residual(&self, window: usize) -> Option<f64> {
        let recent: Vec<f64> = self
            .epochs
            .iter()
            .rev()
            .filter_map(|e| e.residual)
            .take(window)
            .collect();
        if recent.is_empty() {
            return None;
        }
        Some(recent.iter().sum::<f64>() / recent.len() as f64)
    }

    pub fn clear(&mut self) {
        self.epochs.clear();
    }

    /// Save metrics as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::error::Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Load metrics from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(epoch: usize, residual: Option<f64>) -> EpochStats {
        EpochStats {
            epoch,
            vectors: epoch * 2,
            per_action: vec![epoch, epoch],
            lp_calls: 10,
            elapsed_ms: 5,
            residual,
            min_value: Some(-1.0),
            max_value: Some(1.0),
        }
    }

    #[test]
    fn test_history_limit() {
        let mut metrics = SolverMetrics::new(2);
        for epoch in 1..=3 {
            metrics.record(stats(epoch, None));
        }
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics.epochs.front().unwrap().epoch, 2);
        assert_eq!(metrics.total_lp_calls(), 20);
        assert_eq!(metrics.peak_vectors(), 6);
    }

    #[test]
    fn test_avg_residual_skips_missing() {
        let mut metrics = SolverMetrics::new(0);
        metrics.record(stats(1, Some(4.0)));
        metrics.record(stats(2, None));
        metrics.record(stats(3, Some(2.0)));
        assert_eq!(metrics.avg_residual(2), Some(3.0));
        assert_eq!(metrics.avg_residual(1), Some(2.0));
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");
        let mut metrics = SolverMetrics::new(0);
        metrics.record(stats(1, Some(0.5)));
        metrics.save(&path).unwrap();
        assert_eq!(SolverMetrics::load(&path).unwrap(), metrics);
    }
}
