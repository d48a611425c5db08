//! Small built-in problems used by tests, benches and documentation.

use ndarray::{array, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Exp1;

use crate::model::{Cpd, KroneckerDelta, PomdpModel, ProblemDimensions, TableCpd};

/// The classic tiger problem.
///
/// States: tiger-left, tiger-right. Actions: listen, open-left,
/// open-right. Observations: hear-left, hear-right. Listening is correct
/// with probability 0.85 and costs 1; opening resets the problem.
pub fn tiger() -> PomdpModel {
    let listen_obs = TableCpd::new(array![[0.85, 0.15], [0.15, 0.85]]);
    let transitions = vec![
        Cpd::from(KroneckerDelta::identity(2)),
        Cpd::from(TableCpd::uniform(2, 2)),
        Cpd::from(TableCpd::uniform(2, 2)),
    ];
    let observations = vec![
        Cpd::from(listen_obs),
        Cpd::from(TableCpd::uniform(2, 2)),
        Cpd::from(TableCpd::uniform(2, 2)),
    ];
    // rows: state, columns: action
    let rewards = array![[-1.0, -100.0, 10.0], [-1.0, 10.0, -100.0]];

    PomdpModel::from_parts(transitions, observations, rewards, 0.95)
}

/// Two states, two actions, uninformative observations, and each action
/// paying 1 in exactly one state. Horizon-1 values are the reward vectors
/// themselves.
pub fn two_state_reward_only() -> PomdpModel {
    let transitions = vec![
        Cpd::from(KroneckerDelta::identity(2)),
        Cpd::from(KroneckerDelta::identity(2)),
    ];
    let observations = vec![
        Cpd::from(TableCpd::uniform(2, 2)),
        Cpd::from(TableCpd::uniform(2, 2)),
    ];
    let rewards = array![[1.0, 0.0], [0.0, 1.0]];

    PomdpModel::from_parts(transitions, observations, rewards, 0.9)
}

/// Random dense model with rewards in `[-10, 10)`, reproducible by `seed`.
pub fn random_pomdp(dims: ProblemDimensions, discount: f64, seed: u64) -> PomdpModel {
    let mut rng = StdRng::seed_from_u64(seed);

    let transitions = (0..dims.actions)
        .map(|_| Cpd::from(TableCpd::new(random_stochastic(&mut rng, dims.states, dims.states))))
        .collect();
    let observations = (0..dims.actions)
        .map(|_| {
            Cpd::from(TableCpd::new(random_stochastic(
                &mut rng,
                dims.states,
                dims.observations,
            )))
        })
        .collect();
    let rewards = Array2::from_shape_fn((dims.states, dims.actions), |_| rng.gen_range(-10.0..10.0));

    PomdpModel::from_parts(transitions, observations, rewards, discount.clamp(0.0, 1.0))
}

fn random_stochastic<R: Rng>(rng: &mut R, rows: usize, cols: usize) -> Array2<f64> {
    let mut table = Array2::from_shape_fn((rows, cols), |_| {
        let x: f64 = rng.sample(Exp1);
        x + 1e-3
    });
    for mut row in table.outer_iter_mut() {
        let sum = row.sum();
        row /= sum;
    }
    table
}
