use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Exp1;

use super::{Belief, BeliefList};
use crate::error::Result;
use crate::model::PomdpModel;

/// Seeded generator of belief points.
pub struct BeliefSampler {
    rng: StdRng,
}

impl BeliefSampler {
    pub fn new(seed: u64) -> Self {
        BeliefSampler {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform sample from the probability simplex.
    ///
    /// Normalized i.i.d. exponentials are Dirichlet(1, ..., 1).
    pub fn random(&mut self, states: usize) -> Belief {
        let mut probs: Array1<f64> = (0..states).map(|_| self.rng.sample::<f64, _>(Exp1)).collect();
        let sum = probs.sum();
        if sum > 0.0 {
            probs /= sum;
        } else {
            probs.fill(1.0 / states as f64);
        }
        Belief::from_array(probs)
    }

    pub fn random_list(&mut self, states: usize, count: usize) -> BeliefList {
        (0..count).map(|_| self.random(states)).collect()
    }

    /// Corners of the simplex followed by its centroid.
    pub fn corners_and_center(states: usize) -> BeliefList {
        let mut list: BeliefList = (0..states).map(|s| Belief::corner(states, s)).collect();
        list.append(&Belief::uniform(states));
        list
    }

    /// Beliefs reached by simulating the model from its initial belief
    /// under uniformly random actions.
    ///
    /// Each trajectory restarts after `depth` steps; duplicates (within
    /// `epsilon`) are skipped and sampling gives up after `count * 20`
    /// steps so degenerate models cannot loop forever.
    pub fn reachable(
        &mut self,
        model: &PomdpModel,
        count: usize,
        depth: usize,
        epsilon: f64,
    ) -> Result<BeliefList> {
        let dims = model.dims();
        let initial = Belief::from_array(model.initial_belief());
        let mut list = BeliefList::with_capacity(count);
        list.append(&initial);

        let mut belief = initial.clone();
        let mut state = self.sample_state(&belief);
        let mut steps_in_trajectory = 0;
        let max_steps = count.saturating_mul(20).max(1);

        for _ in 0..max_steps {
            if list.len() >= count {
                break;
            }
            if steps_in_trajectory >= depth.max(1) {
                belief = initial.clone();
                state = self.sample_state(&belief);
                steps_in_trajectory = 0;
            }

            let action = self.rng.gen_range(0..dims.actions);
            let next_state = model.transition(action).sample(state, &mut self.rng);
            let observation = model.observation(action).sample(next_state, &mut self.rng);

            match belief.update(model, action, observation)? {
                Some((posterior, _)) => {
                    list.append_unique(&posterior, epsilon);
                    belief = posterior;
                    state = next_state;
                    steps_in_trajectory += 1;
                }
                None => {
                    belief = initial.clone();
                    state = self.sample_state(&belief);
                    steps_in_trajectory = 0;
                }
            }
        }

        Ok(list)
    }

    fn sample_state(&mut self, belief: &Belief) -> usize {
        let u: f64 = self.rng.gen();
        let mut cumsum = 0.0;
        for (s, &p) in belief.as_array().iter().enumerate() {
            cumsum += p;
            if u < cumsum {
                return s;
            }
        }
        belief.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problems;

    #[test]
    fn test_random_beliefs_are_valid() {
        let mut sampler = BeliefSampler::new(11);
        for _ in 0..50 {
            let b = sampler.random(5);
            assert!(b.is_valid(1e-9));
        }
    }

    #[test]
    fn test_seed_is_deterministic() {
        let a = BeliefSampler::new(3).random_list(4, 10);
        let b = BeliefSampler::new(3).random_list(4, 10);
        assert_eq!(a, b);
    }

    #[test]
    fn test_reachable_tiger_beliefs() {
        let model = problems::tiger();
        let mut sampler = BeliefSampler::new(5);
        let list = sampler.reachable(&model, 10, 5, 1e-9).unwrap();
        assert!(list.len() > 1);
        assert!(list.len() <= 10);
        for b in list.iter() {
            assert!(b.is_valid(1e-9));
        }
        assert_eq!(list.get(0), Some(&Belief::uniform(2)));
    }

    #[test]
    fn test_corners_and_center() {
        let list = BeliefSampler::corners_and_center(3);
        assert_eq!(list.len(), 4);
        assert_eq!(list.get(1), Some(&Belief::corner(3, 1)));
    }
}
