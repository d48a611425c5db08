use ndarray::{array, Array1};
use std::io::Cursor;

use crate::alpha::AlphaVector;
use crate::belief::io::parse_belief_list;
use crate::belief::{beliefs_equal, Belief, BeliefGrid};
use crate::config::{CrossSumVariant, PruneStrength, SolverConfig, StoppingCriterion};
use crate::diagnostics::{check_vector_set, NumericalIssue};
use crate::error::{ErrorContext, SolverError};
use crate::export::parse_alpha_file;
use crate::model::{Cpd, KroneckerDelta, PomdpModel, TableCpd};
use crate::numeric::Tolerance;
use crate::vector_set::VectorSet;

#[test]
fn test_tolerance_boundaries() {
    let tol = Tolerance::new(1e-6).unwrap();

    // equality is strict at epsilon
    assert!(tol.equal(1.0, 1.0 + 5e-7));
    assert!(!tol.equal(1.0, 1.0 + 2e-6));

    // less_than and greater_than include the boundary
    assert!(tol.less_than(1.0, 1.0 + 2e-6));
    assert!(!tol.less_than(1.0, 1.0 + 5e-7));
    assert!(tol.greater_than(1.0 + 2e-6, 1.0));
    assert!(!tol.greater_than(1.0, 1.0));

    assert!(Tolerance::new(0.0).is_err());
    assert!(Tolerance::new(f64::NAN).is_err());
    assert!(Tolerance::new(f64::INFINITY).is_err());
}

#[test]
fn test_belief_equality_edge_cases() {
    let a = Belief::from_vec(vec![0.5, 0.5]);
    let b = Belief::from_vec(vec![0.5 + 1e-10, 0.5 - 1e-10]);
    let c = Belief::from_vec(vec![0.6, 0.4]);
    let short = Belief::from_vec(vec![1.0]);

    assert!(beliefs_equal(Some(&a), Some(&b), 1e-9));
    assert!(beliefs_equal(Some(&b), Some(&a), 1e-9));
    assert!(!beliefs_equal(Some(&a), Some(&c), 1e-9));
    assert!(!beliefs_equal(Some(&a), Some(&short), 1e-9));
    assert!(beliefs_equal(None, None, 1e-9));
    assert!(!beliefs_equal(Some(&a), None, 1e-9));
}

#[test]
fn test_truncated_belief_file_rejected() {
    let text = "0.5 0.25 0.25\n0.1 0.9\n";
    let err = parse_belief_list(Cursor::new(text), 3).unwrap_err();
    match err {
        SolverError::Parse { line, reason } => {
            assert_eq!(line, 2);
            assert!(reason.contains("2 of 3"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_belief_file_bad_token() {
    let text = "0.5 0.5\n0.2 abc\n";
    let err = parse_belief_list(Cursor::new(text), 2).unwrap_err();
    assert!(matches!(err, SolverError::Parse { line: 2, .. }));
}

#[test]
fn test_empty_belief_file_is_empty_list() {
    let list = parse_belief_list(Cursor::new("\n\n"), 4).unwrap();
    assert!(list.is_empty());
}

#[test]
fn test_alpha_file_errors() {
    let missing_values = "0\n1.0 2.0\n\n1\n";
    assert!(matches!(
        parse_alpha_file(Cursor::new(missing_values), 2),
        Err(SolverError::Parse { line: 4, .. })
    ));

    let wrong_length = "0\n1.0 2.0 3.0\n";
    assert!(matches!(
        parse_alpha_file(Cursor::new(wrong_length), 2),
        Err(SolverError::Parse { line: 2, .. })
    ));

    let bad_action = "left\n1.0 2.0\n";
    assert!(matches!(
        parse_alpha_file(Cursor::new(bad_action), 2),
        Err(SolverError::Parse { line: 1, .. })
    ));
}

#[test]
fn test_unknown_option_names() {
    let err = "fastest".parse::<CrossSumVariant>().unwrap_err();
    match err {
        SolverError::InvalidConfig { name, reason } => {
            assert_eq!(name, "cross_sum");
            assert!(reason.contains("fastest"));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!("domonly".parse::<PruneStrength>().unwrap(), PruneStrength::DomOnly);
    assert_eq!(" bellman ".parse::<StoppingCriterion>().unwrap(), StoppingCriterion::Bellman);
}

#[test]
fn test_config_rejects_bad_values() {
    let cases: Vec<fn(&mut SolverConfig)> = vec![
        |c| c.prune_epsilon = 1e-20,
        |c| c.lp_epsilon = f64::NAN,
        |c| c.stop_delta = -1.0,
        |c| c.prune = PruneStrength::None,
        |c| c.max_epochs = 0,
        |c| c.horizon = Some(0),
        |c| c.grid_resolution = 0,
        |c| c.deadline_secs = Some(0.0),
    ];
    for (i, mutate) in cases.into_iter().enumerate() {
        let mut config = SolverConfig::default();
        mutate(&mut config);
        assert!(
            matches!(config.validate(), Err(SolverError::InvalidConfig { .. })),
            "case {} accepted",
            i
        );
    }
    assert!(SolverConfig::default().validate().is_ok());
}

#[test]
fn test_model_rejects_non_stochastic_rows() {
    let bad = TableCpd::new(array![[0.7, 0.2], [0.0, 1.0]]);
    let result = PomdpModel::new(
        vec![Cpd::from(bad)],
        vec![Cpd::from(TableCpd::uniform(2, 2))],
        array![[0.0], [1.0]],
        0.9,
    );
    assert!(matches!(result, Err(SolverError::InvalidModel(_))));
}

#[test]
fn test_model_rejects_bad_discount() {
    for discount in [-0.1, 1.5, f64::NAN] {
        let result = PomdpModel::new(
            vec![Cpd::from(KroneckerDelta::identity(2))],
            vec![Cpd::from(TableCpd::uniform(2, 2))],
            array![[0.0], [1.0]],
            discount,
        );
        assert!(result.is_err(), "discount {} accepted", discount);
    }
}

#[test]
fn test_model_rejects_mismatched_tables() {
    let result = PomdpModel::new(
        vec![Cpd::from(KroneckerDelta::identity(3))],
        vec![Cpd::from(TableCpd::uniform(2, 2))],
        array![[0.0], [1.0]],
        0.9,
    );
    assert!(matches!(result, Err(SolverError::DimensionMismatch { .. })));
}

#[test]
fn test_numerical_issues_detected() {
    let set = VectorSet::from_vectors(vec![
        AlphaVector::new(0, array![f64::NAN, 0.0]),
        AlphaVector::new(1, array![f64::INFINITY, 0.0]),
        AlphaVector::new(2, array![1e120, 0.0]),
        AlphaVector::new(3, array![1.0, 0.0]),
    ]);
    let issues = check_vector_set(&set);
    assert_eq!(
        issues,
        vec![
            NumericalIssue::NaN { count: 1 },
            NumericalIssue::Infinity { count: 1 },
            NumericalIssue::Overflow { count: 1 },
        ]
    );
}

#[test]
fn test_error_context_display() {
    let context = ErrorContext::stage(4).with_action(1).with_observation(0);
    assert_eq!(context.to_string(), "stage 4, action 1, observation 0");
    assert_eq!(ErrorContext::default().to_string(), "no context");
}

#[test]
fn test_single_state_problem() {
    let grid = BeliefGrid::regular(1, 3).unwrap();
    assert_eq!(grid.len(), 1);

    let set = VectorSet::from_vectors(vec![
        AlphaVector::new(0, Array1::from(vec![1.0])),
        AlphaVector::new(1, Array1::from(vec![3.0])),
    ]);
    let b = Belief::uniform(1);
    assert_eq!(set.value(&b), Some(3.0));
}
