//! Numerical health checks for vector sets.

use tracing::warn;

use crate::error::{ErrorContext, SolverError};
use crate::vector_set::VectorSet;

/// Components larger than this are reported as overflow risk.
pub const OVERFLOW_LIMIT: f64 = 1e100;

#[derive(Debug, Clone, PartialEq)]
pub enum NumericalIssue {
    NaN { count: usize },
    Infinity { count: usize },
    Overflow { count: usize },
    /// Envelope left the `[lower, upper]` value bounds of the model.
    OutOfBounds { value: f64, lower: f64, upper: f64 },
}

impl std::fmt::Display for NumericalIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NumericalIssue::NaN { count } => write!(f, "{} NaN components", count),
            NumericalIssue::Infinity { count } => write!(f, "{} infinite components", count),
            NumericalIssue::Overflow { count } => {
                write!(f, "{} components above {:e}", count, OVERFLOW_LIMIT)
            }
            NumericalIssue::OutOfBounds { value, lower, upper } => {
                write!(f, "value {} outside [{}, {}]", value, lower, upper)
            }
        }
    }
}

/// Count NaN, infinite and overflowing components.
pub fn check_vector_set(set: &VectorSet) -> Vec<NumericalIssue> {
    let mut nan_count = 0;
    let mut inf_count = 0;
    let mut overflow_count = 0;

    for &value in set.iter().flat_map(|v| v.values.iter()) {
        if value.is_nan() {
            nan_count += 1;
        } else if value.is_infinite() {
            inf_count += 1;
        } else if value.abs() > OVERFLOW_LIMIT {
            overflow_count += 1;
        }
    }

    let mut issues = Vec::new();
    if nan_count > 0 {
        issues.push(NumericalIssue::NaN { count: nan_count });
    }
    if inf_count > 0 {
        issues.push(NumericalIssue::Infinity { count: inf_count });
    }
    if overflow_count > 0 {
        issues.push(NumericalIssue::Overflow { count: overflow_count });
    }
    issues
}

/// Turn any issue found in `set` into a fatal error carrying `context`.
pub fn ensure_finite(set: &VectorSet, context: ErrorContext) -> Result<(), SolverError> {
    let issues = check_vector_set(set);
    if issues.is_empty() {
        return Ok(());
    }
    let reason = issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Err(SolverError::Numerical { context, reason })
}

/// Compare the envelope range `[min, max]` with the model's value bounds.
///
/// Leaving the bounds is not fatal (a custom initial layer may start
/// outside them) but is logged.
pub fn check_value_bounds(
    min: f64,
    max: f64,
    bounds: Option<(f64, f64)>,
    slack: f64,
) -> Vec<NumericalIssue> {
    let (lower, upper) = match bounds {
        Some(b) => b,
        None => return Vec::new(),
    };
    let mut issues = Vec::new();
    for value in [min, max] {
        if value < lower - slack || value > upper + slack {
            warn!(value, lower, upper, "value function outside model bounds");
            issues.push(NumericalIssue::OutOfBounds { value, lower, upper });
        }
    }
    issues
}
