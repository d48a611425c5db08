use crate::config::{
    CrossSumVariant, IncPruneVariant, Method, PruneStrength, SolverConfig, StoppingCriterion,
};
use crate::error::Result;

/// Builder for [`SolverConfig`]. Unset fields keep their defaults.
#[derive(Debug, Clone, Default)]
pub struct SolverConfigBuilder {
    config: SolverConfig,
}

impl SolverConfigBuilder {
    pub fn new() -> Self {
        SolverConfigBuilder {
            config: SolverConfig::default(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.config.method = method;
        self
    }

    pub fn cross_sum(mut self, variant: CrossSumVariant) -> Self {
        self.config.cross_sum = variant;
        self
    }

    /// Select incremental pruning with the given flavour.
    pub fn incprune(mut self, variant: IncPruneVariant) -> Self {
        self.config.cross_sum = CrossSumVariant::IncPrune;
        self.config.incprune = variant;
        self
    }

    pub fn prune(mut self, strength: PruneStrength) -> Self {
        self.config.prune = strength;
        self
    }

    pub fn proj_purge(mut self, strength: PruneStrength) -> Self {
        self.config.proj_purge = strength;
        self
    }

    pub fn stopping(mut self, criterion: StoppingCriterion) -> Self {
        self.config.stopping = criterion;
        self
    }

    pub fn horizon(mut self, horizon: usize) -> Self {
        self.config.horizon = Some(horizon);
        self
    }

    pub fn max_epochs(mut self, max_epochs: usize) -> Self {
        self.config.max_epochs = max_epochs;
        self
    }

    pub fn prune_epsilon(mut self, epsilon: f64) -> Self {
        self.config.prune_epsilon = epsilon;
        self
    }

    pub fn lp_epsilon(mut self, epsilon: f64) -> Self {
        self.config.lp_epsilon = epsilon;
        self
    }

    pub fn fg_epsilon(mut self, epsilon: f64) -> Self {
        self.config.fg_epsilon = epsilon;
        self
    }

    pub fn stop_delta(mut self, delta: f64) -> Self {
        self.config.stop_delta = delta;
        self
    }

    pub fn belief_samples(mut self, samples: usize) -> Self {
        self.config.belief_samples = samples;
        self
    }

    pub fn grid_resolution(mut self, resolution: usize) -> Self {
        self.config.grid_resolution = resolution;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn deadline_secs(mut self, secs: f64) -> Self {
        self.config.deadline_secs = Some(secs);
        self
    }

    pub fn lp_limits(mut self, max_iterations: usize, time_limit_ms: Option<u64>) -> Self {
        self.config.lp_max_iterations = max_iterations;
        self.config.lp_time_limit_ms = time_limit_ms;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    pub fn belief_precision(mut self, precision: usize) -> Self {
        self.config.belief_precision = precision;
        self
    }

    pub fn build(self) -> Result<SolverConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
