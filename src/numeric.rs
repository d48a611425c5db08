//! Epsilon-tolerant float comparisons.
//!
//! Every comparison between values produced by the solver goes through a
//! [`Tolerance`]; raw `==` on `f64` is never used.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};

/// Default absolute tolerance for all comparisons.
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Smallest epsilon a configuration may request.
pub const MIN_EPSILON: f64 = 1e-12;

/// Absolute-difference comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    epsilon: f64,
}

impl Tolerance {
    /// Build a tolerance, rejecting values below [`MIN_EPSILON`].
    pub fn new(epsilon: f64) -> Result<Self> {
        if !epsilon.is_finite() || epsilon < MIN_EPSILON {
            return Err(SolverError::invalid_config(
                "epsilon".to_string(),
                format!("must be finite and at least {:e}, got {:e}", MIN_EPSILON, epsilon),
            ));
        }
        Ok(Tolerance { epsilon })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// `|a - b| < epsilon`
    #[inline]
    pub fn equal(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.epsilon
    }

    /// `a` is below `b` by at least epsilon.
    #[inline]
    pub fn less_than(&self, a: f64, b: f64) -> bool {
        a <= b - self.epsilon
    }

    /// `a` is above `b` by at least epsilon.
    #[inline]
    pub fn greater_than(&self, a: f64, b: f64) -> bool {
        a >= b + self.epsilon
    }

    #[inline]
    pub fn is_zero(&self, a: f64) -> bool {
        a.abs() < self.epsilon
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance {
            epsilon: DEFAULT_EPSILON,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trichotomy() {
        let tol = Tolerance::new(1e-6).unwrap();
        let pairs = [(1.0, 1.0), (1.0, 1.0 + 5e-7), (1.0, 1.1), (1.1, 1.0), (0.0, -1e-6)];
        for (a, b) in pairs {
            let hits = [tol.equal(a, b), tol.less_than(a, b), tol.greater_than(a, b)]
                .iter()
                .filter(|&&x| x)
                .count();
            assert_eq!(hits, 1, "exactly one relation must hold for ({}, {})", a, b);
        }
    }

    #[test]
    fn test_floor_rejected() {
        assert!(Tolerance::new(1e-13).is_err());
        assert!(Tolerance::new(f64::NAN).is_err());
        assert!(Tolerance::new(MIN_EPSILON).is_ok());
    }
}
