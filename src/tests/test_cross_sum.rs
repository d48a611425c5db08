use ndarray::array;

use crate::alpha::AlphaVector;
use crate::config::{CrossSumVariant, IncPruneVariant, PruneStrength};
use crate::cross_sum::{full_cross_sum, CrossSumEngine};
use crate::lp::DenseSimplex;
use crate::model::{PomdpModel, ProblemDimensions};
use crate::numeric::Tolerance;
use crate::problems;
use crate::projection::ProjectionTables;
use crate::prune::Pruner;
use crate::vector_set::VectorSet;

const ENGINES: [(CrossSumVariant, IncPruneVariant); 7] = [
    (CrossSumVariant::Enumerate, IncPruneVariant::Normal),
    (CrossSumVariant::IncPrune, IncPruneVariant::Normal),
    (CrossSumVariant::IncPrune, IncPruneVariant::RestrictedRegion),
    (CrossSumVariant::IncPrune, IncPruneVariant::Generalized),
    (CrossSumVariant::Witness, IncPruneVariant::Normal),
    (CrossSumVariant::TwoPass, IncPruneVariant::Normal),
    (CrossSumVariant::LinearSupport, IncPruneVariant::Normal),
];

/// Horizon-1 layer of `model`: its reward vectors, pruned.
fn reward_layer(model: &PomdpModel, pruner: &Pruner<'_>) -> VectorSet {
    let rewards: VectorSet = (0..model.dims().actions)
        .map(|a| AlphaVector::new(a, model.reward_vector(a).to_owned()))
        .collect();
    pruner.prune(&rewards).unwrap()
}

fn projections(model: &PomdpModel, previous: &VectorSet, action: usize, pruner: &Pruner<'_>) -> Vec<VectorSet> {
    let tables = ProjectionTables::new(model);
    (0..model.dims().observations)
        .map(|o| pruner.prune(&tables.project(previous, action, o)).unwrap())
        .collect()
}

const STRENGTHS: [PruneStrength; 3] = [PruneStrength::DomOnly, PruneStrength::Normal, PruneStrength::Epsilon];

fn assert_variants_agree(model: &PomdpModel, strength: PruneStrength) {
    let lp = DenseSimplex::default();
    let pruner = Pruner::new(strength, Tolerance::default(), 1e-9, &lp);
    let compare = Tolerance::new(1e-7).unwrap();
    let previous = reward_layer(model, &pruner);

    for action in 0..model.dims().actions {
        let projected = projections(model, &previous, action, &pruner);
        let reference = CrossSumEngine::new(CrossSumVariant::Enumerate, IncPruneVariant::Normal, pruner)
            .combine(&projected)
            .unwrap();
        assert!(!reference.is_empty());

        for (variant, incprune) in ENGINES {
            let result = CrossSumEngine::new(variant, incprune, pruner)
                .combine(&projected)
                .unwrap();
            assert!(
                result.approx_eq_set(&reference, &compare),
                "{} ({}) under {} gave {} vectors, enumeration {} for action {}",
                variant,
                incprune,
                strength,
                result.len(),
                reference.len(),
                action
            );
        }
    }
}

#[test]
fn test_variants_agree_on_tiger() {
    for strength in STRENGTHS {
        assert_variants_agree(&problems::tiger(), strength);
    }
}

#[test]
fn test_variants_agree_on_random_models() {
    for seed in 0..3 {
        let model = problems::random_pomdp(ProblemDimensions::new(3, 2, 3), 0.9, seed);
        for strength in STRENGTHS {
            assert_variants_agree(&model, strength);
        }
    }
}

#[test]
fn test_dominance_only_keeps_vectors_off_the_envelope() {
    let lp = DenseSimplex::default();
    let pruner = Pruner::new(PruneStrength::DomOnly, Tolerance::default(), 1e-9, &lp);
    // [0.4, 0.4] is never best but no other vector dominates it
    let sets = vec![
        VectorSet::from_vectors(vec![
            AlphaVector::new(0, array![1.0, 0.0]),
            AlphaVector::new(0, array![0.0, 1.0]),
            AlphaVector::new(0, array![0.4, 0.4]),
        ]),
        VectorSet::from_vectors(vec![AlphaVector::new(0, array![0.5, 0.5])]),
    ];
    let interior = AlphaVector::new(0, array![0.9, 0.9]);

    for (variant, incprune) in ENGINES {
        let result = CrossSumEngine::new(variant, incprune, pruner)
            .combine(&sets)
            .unwrap();
        assert_eq!(result.len(), 3, "{} ({})", variant, incprune);
        assert!(result.contains(&interior, pruner.tolerance()), "{}", variant);
    }

    let normal = pruner.with_strength(PruneStrength::Normal);
    for (variant, incprune) in ENGINES {
        let result = CrossSumEngine::new(variant, incprune, normal)
            .combine(&sets)
            .unwrap();
        assert_eq!(result.len(), 2, "{} ({})", variant, incprune);
    }
}

#[test]
fn test_full_cross_sum_cardinality() {
    let sets = vec![
        VectorSet::from_vectors(vec![
            AlphaVector::new(0, array![1.0, 0.0]),
            AlphaVector::new(0, array![0.0, 1.0]),
        ]),
        VectorSet::from_vectors(vec![
            AlphaVector::new(0, array![1.0, 1.0]),
            AlphaVector::new(0, array![2.0, 0.0]),
            AlphaVector::new(0, array![0.0, 2.0]),
        ]),
        VectorSet::from_vectors(vec![AlphaVector::new(0, array![0.5, 0.5])]),
    ];
    let sum = full_cross_sum(&sets);
    assert_eq!(sum.len(), 6);
    assert!(sum.contains(&AlphaVector::new(0, array![1.5, 2.5]), &Tolerance::default()));
}

#[test]
fn test_empty_input_gives_empty_sum() {
    let lp = DenseSimplex::default();
    let pruner = Pruner::new(PruneStrength::Normal, Tolerance::default(), 1e-9, &lp);
    let sets = vec![
        VectorSet::from_vectors(vec![AlphaVector::new(0, array![1.0, 0.0])]),
        VectorSet::new(),
    ];
    for (variant, incprune) in ENGINES {
        let engine = CrossSumEngine::new(variant, incprune, pruner);
        assert!(engine.combine(&sets).unwrap().is_empty());
    }
}

#[test]
fn test_single_observation_is_pruned_input() {
    let lp = DenseSimplex::default();
    let pruner = Pruner::new(PruneStrength::Normal, Tolerance::default(), 1e-9, &lp);
    let sets = vec![VectorSet::from_vectors(vec![
        AlphaVector::new(0, array![2.0, 0.0]),
        AlphaVector::new(0, array![0.5, 0.5]),
        AlphaVector::new(0, array![0.0, 2.0]),
    ])];
    let expected = VectorSet::from_vectors(vec![
        AlphaVector::new(0, array![2.0, 0.0]),
        AlphaVector::new(0, array![0.0, 2.0]),
    ]);

    for (variant, incprune) in ENGINES {
        let result = CrossSumEngine::new(variant, incprune, pruner)
            .combine(&sets)
            .unwrap();
        assert!(result.approx_eq_set(&expected, pruner.tolerance()), "{}", variant);
    }
}

#[test]
fn test_restricted_region_under_domonly_matches_fold() {
    let lp = DenseSimplex::default();
    let pruner = Pruner::new(PruneStrength::DomOnly, Tolerance::default(), 1e-9, &lp);
    let model = problems::tiger();
    let previous = reward_layer(&model, &pruner.with_strength(PruneStrength::Normal));
    let projected = projections(&model, &previous, 0, &pruner);

    let fold = CrossSumEngine::new(CrossSumVariant::IncPrune, IncPruneVariant::Normal, pruner)
        .combine(&projected)
        .unwrap();
    let restricted = CrossSumEngine::new(CrossSumVariant::IncPrune, IncPruneVariant::RestrictedRegion, pruner)
        .combine(&projected)
        .unwrap();
    assert!(fold.approx_eq_set(&restricted, pruner.tolerance()));
}
