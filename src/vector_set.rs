use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::alpha::AlphaVector;
use crate::belief::Belief;
use crate::numeric::Tolerance;

/// Unordered collection of alpha vectors.
///
/// Before pruning the set may hold dominated or numerically equal vectors;
/// the pruning functions in [`crate::prune`] restore parsimony.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorSet {
    vectors: Vec<AlphaVector>,
}

impl VectorSet {
    pub fn new() -> Self {
        VectorSet { vectors: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        VectorSet {
            vectors: Vec::with_capacity(capacity),
        }
    }

    pub fn from_vectors(vectors: Vec<AlphaVector>) -> Self {
        VectorSet { vectors }
    }

    pub fn push(&mut self, vector: AlphaVector) {
        self.vectors.push(vector);
    }

    pub fn extend(&mut self, other: VectorSet) {
        self.vectors.extend(other.vectors);
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AlphaVector> {
        self.vectors.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AlphaVector> {
        self.vectors.iter()
    }

    pub fn vectors(&self) -> &[AlphaVector] {
        &self.vectors
    }

    pub fn into_vectors(self) -> Vec<AlphaVector> {
        self.vectors
    }

    /// Number of states each vector spans, if the set is non-empty.
    pub fn dimension(&self) -> Option<usize> {
        self.vectors.first().map(|v| v.len())
    }

    /// Index of the vector with the highest value at `point`.
    ///
    /// Values within tolerance count as ties; ties go to the
    /// lexicographically larger vector, then to the earlier one.
    pub fn best_index(&self, point: ArrayView1<f64>, tol: &Tolerance) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, v) in self.vectors.iter().enumerate() {
            let value = v.value_at(point);
            best = match best {
                None => Some((i, value)),
                Some((j, best_value)) => {
                    if tol.greater_than(value, best_value)
                        || (tol.equal(value, best_value) && v.lex_greater(&self.vectors[j], tol))
                    {
                        Some((i, value))
                    } else {
                        Some((j, best_value))
                    }
                }
            };
        }
        best.map(|(i, _)| i)
    }

    /// Best vector at `belief`.
    pub fn best_vector(&self, belief: &Belief, tol: &Tolerance) -> Option<&AlphaVector> {
        self.best_index(belief.view(), tol).map(|i| &self.vectors[i])
    }

    /// Upper envelope value `max_v v . point`.
    pub fn value_at(&self, point: ArrayView1<f64>) -> Option<f64> {
        self.vectors
            .iter()
            .map(|v| v.value_at(point))
            .fold(None, |acc, x| Some(acc.map_or(x, |a: f64| a.max(x))))
    }

    pub fn value(&self, belief: &Belief) -> Option<f64> {
        self.value_at(belief.view())
    }

    /// True if some vector equals `vector` within tolerance.
    pub fn contains(&self, vector: &AlphaVector, tol: &Tolerance) -> bool {
        self.vectors.iter().any(|v| v.approx_eq(vector, tol))
    }

    /// Same vectors up to permutation and tolerance. Actions are ignored.
    pub fn approx_eq_set(&self, other: &VectorSet, tol: &Tolerance) -> bool {
        self.len() == other.len()
            && self.vectors.iter().all(|v| other.contains(v, tol))
            && other.vectors.iter().all(|v| self.contains(v, tol))
    }

    /// Every vector of `self` has an equal counterpart in `other`.
    pub fn is_subset_of(&self, other: &VectorSet, tol: &Tolerance) -> bool {
        self.vectors.iter().all(|v| other.contains(v, tol))
    }

    /// Minkowski sum: one vector per pair, tagged with `self`'s action.
    pub fn cross_sum(&self, other: &VectorSet) -> VectorSet {
        let mut result = VectorSet::with_capacity(self.len() * other.len());
        for a in &self.vectors {
            for b in &other.vectors {
                result.push(a.plus(b.view()));
            }
        }
        result
    }

    /// Add `offset` to every vector.
    pub fn shift(&mut self, offset: ArrayView1<f64>) {
        for v in self.vectors.iter_mut() {
            v.values += &offset;
        }
    }

    /// Retag every vector with `action`.
    pub fn with_action(mut self, action: usize) -> Self {
        for v in self.vectors.iter_mut() {
            v.action = action;
        }
        self
    }

    /// Largest single component, which is the maximum of the envelope
    /// over the simplex.
    pub fn max_component(&self) -> Option<f64> {
        self.vectors
            .iter()
            .flat_map(|v| v.values.iter().copied())
            .fold(None, |acc, x| Some(acc.map_or(x, |a: f64| a.max(x))))
    }
}

impl FromIterator<AlphaVector> for VectorSet {
    fn from_iter<I: IntoIterator<Item = AlphaVector>>(iter: I) -> Self {
        VectorSet {
            vectors: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for VectorSet {
    type Item = AlphaVector;
    type IntoIter = std::vec::IntoIter<AlphaVector>;

    fn into_iter(self) -> Self::IntoIter {
        self.vectors.into_iter()
    }
}

impl<'a> IntoIterator for &'a VectorSet {
    type Item = &'a AlphaVector;
    type IntoIter = std::slice::Iter<'a, AlphaVector>;

    fn into_iter(self) -> Self::IntoIter {
        self.vectors.iter()
    }
}
