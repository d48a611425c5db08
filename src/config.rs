//! Solver configuration.
//!
//! All option names match the strings accepted by [`FromStr`], so a JSON
//! file written by [`SolverConfig::save_json`] can be edited by hand.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::belief::io::DEFAULT_PRECISION;
use crate::error::{Result, SolverError};
use crate::lp::DenseSimplex;
use crate::numeric::{Tolerance, DEFAULT_EPSILON, MIN_EPSILON};

/// Exact incremental pruning or the point-based finite-grid approximation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    #[serde(rename = "exact")]
    Exact,
    #[serde(rename = "finite_grid")]
    FiniteGrid,
}

/// Strategy for combining per-observation projections of one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossSumVariant {
    #[serde(rename = "enum")]
    Enumerate,
    #[serde(rename = "incprune")]
    IncPrune,
    #[serde(rename = "witness")]
    Witness,
    #[serde(rename = "twopass")]
    TwoPass,
    #[serde(rename = "linsup")]
    LinearSupport,
}

/// Flavour of incremental pruning, used when the variant is `incprune`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncPruneVariant {
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "restricted_region")]
    RestrictedRegion,
    #[serde(rename = "generalized")]
    Generalized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PruneStrength {
    /// Leave the set untouched. Only meaningful for `proj_purge`.
    #[serde(rename = "none")]
    None,
    #[serde(rename = "domonly")]
    DomOnly,
    #[serde(rename = "normal_prune")]
    Normal,
    #[serde(rename = "epsilon_prune")]
    Epsilon,
}

/// When an infinite-horizon run has converged.
///
/// Under a finite horizon only `Exact` stops early, since identical layers
/// stay identical. The approximate criteria say nothing about the
/// finite-horizon value and are ignored until the horizon is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoppingCriterion {
    #[serde(rename = "exact")]
    Exact,
    #[serde(rename = "weak")]
    Weak,
    #[serde(rename = "bellman")]
    Bellman,
}

macro_rules! named_options {
    ($ty:ident, $option:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub fn name(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = SolverError;

            fn from_str(s: &str) -> Result<Self> {
                match s.trim() {
                    $($name => Ok($ty::$variant),)+
                    other => Err(SolverError::invalid_config(
                        $option.to_string(),
                        format!(
                            "unknown value '{}', expected one of: {}",
                            other,
                            [$($name),+].join(", ")
                        ),
                    )),
                }
            }
        }
    };
}

named_options!(Method, "method", {
    Exact => "exact",
    FiniteGrid => "finite_grid",
});

named_options!(CrossSumVariant, "cross_sum", {
    Enumerate => "enum",
    IncPrune => "incprune",
    Witness => "witness",
    TwoPass => "twopass",
    LinearSupport => "linsup",
});

named_options!(IncPruneVariant, "incprune", {
    Normal => "normal",
    RestrictedRegion => "restricted_region",
    Generalized => "generalized",
});

named_options!(PruneStrength, "prune", {
    None => "none",
    DomOnly => "domonly",
    Normal => "normal_prune",
    Epsilon => "epsilon_prune",
});

named_options!(StoppingCriterion, "stopping", {
    Exact => "exact",
    Weak => "weak",
    Bellman => "bellman",
});

/// Every knob the solver reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub method: Method,
    pub cross_sum: CrossSumVariant,
    pub incprune: IncPruneVariant,
    /// Pruning applied to each epoch's merged set.
    pub prune: PruneStrength,
    /// Pruning applied to each projected set before cross-summing.
    pub proj_purge: PruneStrength,
    /// Convergence test between epochs. With a `horizon` set only `exact`
    /// can end the run early; `weak` and `bellman` are not checked and the
    /// run always reaches the horizon.
    pub stopping: StoppingCriterion,
    /// Number of epochs to plan for; `None` runs until convergence.
    pub horizon: Option<usize>,
    pub max_epochs: usize,

    /// Comparison tolerance, and the required margin under `epsilon_prune`.
    pub prune_epsilon: f64,
    /// Margin a witness point must exceed under `normal_prune`.
    pub lp_epsilon: f64,
    /// Vector equality tolerance for the finite-grid method.
    pub fg_epsilon: f64,
    pub stop_delta: f64,

    /// Beliefs sampled for the `weak` criterion and for reporting.
    pub belief_samples: usize,
    pub grid_resolution: usize,
    pub seed: u64,
    pub deadline_secs: Option<f64>,
    pub lp_max_iterations: usize,
    pub lp_time_limit_ms: Option<u64>,
    pub parallel: bool,
    pub belief_precision: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            method: Method::Exact,
            cross_sum: CrossSumVariant::IncPrune,
            incprune: IncPruneVariant::Normal,
            prune: PruneStrength::Normal,
            proj_purge: PruneStrength::Normal,
            stopping: StoppingCriterion::Weak,
            horizon: None,
            max_epochs: 500,
            prune_epsilon: DEFAULT_EPSILON,
            lp_epsilon: DEFAULT_EPSILON,
            fg_epsilon: DEFAULT_EPSILON,
            stop_delta: 1e-6,
            belief_samples: 100,
            grid_resolution: 4,
            seed: 42,
            deadline_secs: None,
            lp_max_iterations: 50_000,
            lp_time_limit_ms: None,
            parallel: true,
            belief_precision: DEFAULT_PRECISION,
        }
    }
}

impl SolverConfig {
    /// Reject settings that cannot produce a usable run.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("prune_epsilon", self.prune_epsilon),
            ("lp_epsilon", self.lp_epsilon),
            ("fg_epsilon", self.fg_epsilon),
        ] {
            if !value.is_finite() || value < MIN_EPSILON {
                return Err(SolverError::invalid_config(
                    name.to_string(),
                    format!("must be finite and at least {:e}, got {:e}", MIN_EPSILON, value),
                ));
            }
        }

        if !self.stop_delta.is_finite() || self.stop_delta <= 0.0 {
            return Err(SolverError::invalid_config(
                "stop_delta",
                "must be a positive finite number",
            ));
        }
        if self.prune == PruneStrength::None {
            return Err(SolverError::invalid_config(
                "prune",
                "'none' is only allowed for proj_purge",
            ));
        }
        if self.max_epochs == 0 {
            return Err(SolverError::invalid_config("max_epochs", "must be at least 1"));
        }
        if self.horizon == Some(0) {
            return Err(SolverError::invalid_config("horizon", "must be at least 1"));
        }
        if self.belief_precision == 0 {
            return Err(SolverError::invalid_config("belief_precision", "must be at least 1"));
        }
        if self.grid_resolution == 0 {
            return Err(SolverError::invalid_config("grid_resolution", "must be at least 1"));
        }
        if self.lp_max_iterations == 0 {
            return Err(SolverError::invalid_config("lp_max_iterations", "must be at least 1"));
        }
        if let Some(secs) = self.deadline_secs {
            if !secs.is_finite() || secs <= 0.0 {
                return Err(SolverError::invalid_config(
                    "deadline_secs",
                    "must be a positive finite number",
                ));
            }
        }
        Ok(())
    }

    pub fn prune_tolerance(&self) -> Result<Tolerance> {
        Tolerance::new(self.prune_epsilon)
    }

    pub fn fg_tolerance(&self) -> Result<Tolerance> {
        Tolerance::new(self.fg_epsilon)
    }

    /// Witness margin required by `strength`.
    pub fn margin_for(&self, strength: PruneStrength) -> f64 {
        match strength {
            PruneStrength::Epsilon => self.prune_epsilon,
            _ => self.lp_epsilon,
        }
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs_f64)
    }

    /// Default LP backend with this configuration's limits applied.
    ///
    /// `lp_epsilon` is the witness margin; the pivot tolerance is capped at
    /// `min(lp_epsilon, 1e-9)`.
    pub fn lp_solver(&self) -> DenseSimplex {
        DenseSimplex::new(self.lp_epsilon.min(DEFAULT_EPSILON))
            .with_max_iterations(self.lp_max_iterations)
            .with_time_limit(self.lp_time_limit_ms.map(Duration::from_millis))
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: SolverConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_names_round_trip() {
        for name in ["enum", "incprune", "witness", "twopass", "linsup"] {
            let v: CrossSumVariant = name.parse().unwrap();
            assert_eq!(v.to_string(), name);
        }
        assert_eq!("domonly".parse::<PruneStrength>().unwrap(), PruneStrength::DomOnly);
        assert_eq!(
            "restricted_region".parse::<IncPruneVariant>().unwrap(),
            IncPruneVariant::RestrictedRegion
        );
        assert_eq!("bellman".parse::<StoppingCriterion>().unwrap(), StoppingCriterion::Bellman);
    }

    #[test]
    fn test_lp_pivot_tolerance_is_capped() {
        let mut config = SolverConfig::default();
        config.lp_epsilon = 1e-3;
        assert_eq!(config.lp_solver().tolerance, DEFAULT_EPSILON);

        config.lp_epsilon = 1e-11;
        assert_eq!(config.lp_solver().tolerance, 1e-11);
    }

    #[test]
    fn test_unknown_option_is_config_error() {
        match "fastest".parse::<CrossSumVariant>() {
            Err(SolverError::InvalidConfig { name, .. }) => assert_eq!(name, "cross_sum"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_epsilon_floor() {
        let mut config = SolverConfig::default();
        assert!(config.validate().is_ok());
        config.lp_epsilon = 1e-13;
        assert!(config.validate().is_err());
        config.lp_epsilon = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_prune_none_rejected_for_final_prune() {
        let config = SolverConfig {
            prune: PruneStrength::None,
            ..SolverConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = SolverConfig {
            cross_sum: CrossSumVariant::Witness,
            horizon: Some(7),
            ..SolverConfig::default()
        };
        config.save_json(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"witness\""));
        assert_eq!(SolverConfig::load_json(&path).unwrap(), config);
    }
}
