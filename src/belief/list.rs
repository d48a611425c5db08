use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::Belief;

/// A belief together with a caller-defined bookkeeping mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkedBelief {
    pub belief: Belief,
    pub mark: i32,
}

/// Ordered collection of owned beliefs.
///
/// Inserting copies the belief, so the list never aliases caller data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeliefList {
    entries: VecDeque<MarkedBelief>,
}

impl BeliefList {
    pub fn new() -> Self {
        BeliefList {
            entries: VecDeque::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        BeliefList {
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn prepend(&mut self, belief: &Belief) {
        self.prepend_marked(belief, 0);
    }

    pub fn prepend_marked(&mut self, belief: &Belief, mark: i32) {
        self.entries.push_front(MarkedBelief {
            belief: belief.clone(),
            mark,
        });
    }

    pub fn append(&mut self, belief: &Belief) {
        self.append_marked(belief, 0);
    }

    pub fn append_marked(&mut self, belief: &Belief, mark: i32) {
        self.entries.push_back(MarkedBelief {
            belief: belief.clone(),
            mark,
        });
    }

    /// Append unless an equal belief (within `epsilon`) is already stored.
    /// Returns whether the belief was added.
    pub fn append_unique(&mut self, belief: &Belief, epsilon: f64) -> bool {
        if self.find(belief, epsilon).is_some() {
            return false;
        }
        self.append(belief);
        true
    }

    /// Index of the first stored belief equal to `belief` within `epsilon`.
    pub fn find(&self, belief: &Belief, epsilon: f64) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.belief.approx_eq(belief, epsilon))
    }

    pub fn get(&self, index: usize) -> Option<&Belief> {
        self.entries.get(index).map(|entry| &entry.belief)
    }

    pub fn mark(&self, index: usize) -> Option<i32> {
        self.entries.get(index).map(|entry| entry.mark)
    }

    pub fn set_mark(&mut self, index: usize, mark: i32) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.mark = mark;
        }
    }

    /// Set the same mark on every entry.
    pub fn mark_all(&mut self, mark: i32) {
        for entry in self.entries.iter_mut() {
            entry.mark = mark;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Belief> {
        self.entries.iter().map(|entry| &entry.belief)
    }

    pub fn entries(&self) -> impl Iterator<Item = &MarkedBelief> {
        self.entries.iter()
    }

    /// Same beliefs in the same order, within `epsilon`. Marks are ignored.
    pub fn approx_eq(&self, other: &BeliefList, epsilon: f64) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| a.approx_eq(b, epsilon))
    }
}

impl FromIterator<Belief> for BeliefList {
    fn from_iter<I: IntoIterator<Item = Belief>>(iter: I) -> Self {
        BeliefList {
            entries: iter
                .into_iter()
                .map(|belief| MarkedBelief { belief, mark: 0 })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepend_append_order() {
        let mut list = BeliefList::new();
        list.append(&Belief::corner(2, 0));
        list.prepend(&Belief::corner(2, 1));
        list.append_marked(&Belief::uniform(2), 7);

        assert_eq!(list.len(), 3);
        assert_eq!(list.get(0), Some(&Belief::corner(2, 1)));
        assert_eq!(list.get(2), Some(&Belief::uniform(2)));
        assert_eq!(list.mark(2), Some(7));
    }

    #[test]
    fn test_find_and_unique() {
        let mut list = BeliefList::new();
        assert!(list.append_unique(&Belief::uniform(2), 1e-9));
        assert!(!list.append_unique(&Belief::from_vec(vec![0.5 + 1e-12, 0.5]), 1e-9));
        assert_eq!(list.find(&Belief::uniform(2), 1e-9), Some(0));
        assert_eq!(list.find(&Belief::corner(2, 0), 1e-9), None);

        list.mark_all(1);
        assert_eq!(list.mark(0), Some(1));
        list.clear();
        assert!(list.is_empty());
    }
}
