use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::belief::Belief;
use crate::numeric::Tolerance;

/// Linear function over beliefs, tagged with the action that achieves it.
///
/// `V(b) = sum_s b[s] * values[s]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlphaVector {
    pub action: usize,
    pub values: Array1<f64>,
}

impl AlphaVector {
    pub fn new(action: usize, values: Array1<f64>) -> Self {
        AlphaVector { action, values }
    }

    pub fn zeros(action: usize, states: usize) -> Self {
        AlphaVector {
            action,
            values: Array1::zeros(states),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn view(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    /// Value of this vector at `belief`.
    pub fn value(&self, belief: &Belief) -> f64 {
        belief.dot(self.values.view())
    }

    /// Value at an arbitrary point of the simplex given as a raw array.
    pub fn value_at(&self, point: ArrayView1<f64>) -> f64 {
        self.values.dot(&point)
    }

    /// Component-wise equal within tolerance; actions are ignored.
    pub fn approx_eq(&self, other: &AlphaVector, tol: &Tolerance) -> bool {
        self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|(&a, &b)| tol.equal(a, b))
    }

    /// No component of `self` is below the matching component of `other`.
    pub fn weakly_dominates(&self, other: &AlphaVector, tol: &Tolerance) -> bool {
        self.values
            .iter()
            .zip(other.values.iter())
            .all(|(&a, &b)| !tol.less_than(a, b))
    }

    /// Weakly dominates `other` and is strictly better in at least one state.
    pub fn strictly_dominates(&self, other: &AlphaVector, tol: &Tolerance) -> bool {
        self.weakly_dominates(other, tol)
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .any(|(&a, &b)| tol.greater_than(a, b))
    }

    /// Lexicographic comparison under tolerance, used to break exact ties
    /// between vectors that share a best value at some belief.
    pub fn lex_greater(&self, other: &AlphaVector, tol: &Tolerance) -> bool {
        for (&a, &b) in self.values.iter().zip(other.values.iter()) {
            if tol.greater_than(a, b) {
                return true;
            }
            if tol.less_than(a, b) {
                return false;
            }
        }
        false
    }

    /// Element-wise sum, keeping this vector's action.
    pub fn plus(&self, other: ArrayView1<f64>) -> AlphaVector {
        AlphaVector {
            action: self.action,
            values: &self.values + &other,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_value_is_dot_product() {
        let v = AlphaVector::new(1, array![2.0, -4.0]);
        let b = Belief::from_vec(vec![0.25, 0.75]);
        assert!((v.value(&b) - (-2.5)).abs() < 1e-12);
    }

    #[test]
    fn test_domination() {
        let tol = Tolerance::default();
        let a = AlphaVector::new(0, array![1.0, 2.0]);
        let b = AlphaVector::new(1, array![1.0, 1.5]);
        let c = AlphaVector::new(2, array![1.0 + 1e-12, 2.0]);

        assert!(a.strictly_dominates(&b, &tol));
        assert!(!b.weakly_dominates(&a, &tol));
        assert!(a.approx_eq(&c, &tol));
        assert!(a.weakly_dominates(&c, &tol) && c.weakly_dominates(&a, &tol));
        assert!(!a.strictly_dominates(&c, &tol));
    }

    #[test]
    fn test_lex_order() {
        let tol = Tolerance::default();
        let a = AlphaVector::new(0, array![1.0, 0.0]);
        let b = AlphaVector::new(0, array![1.0, -1.0]);
        assert!(a.lex_greater(&b, &tol));
        assert!(!b.lex_greater(&a, &tol));
        assert!(!a.lex_greater(&a, &tol));
    }
}
