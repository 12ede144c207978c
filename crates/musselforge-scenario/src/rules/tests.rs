use super::*;
use musselforge_smt::Solver;
use proptest::prelude::*;

fn features(copper: f64, temperature: f64, ph: f64, dissolved_oxygen: f64, treatment: f64) -> Features<f64> {
    Features {
        copper,
        temperature,
        ph,
        dissolved_oxygen,
        treatment,
    }
}

#[test]
fn test_reference_is_valid_depth_five() {
    let rules = DecisionRules::reference();
    assert_eq!(rules.depth(), 5);
    assert_eq!(DecisionRules::new(rules.root().clone()).unwrap(), rules);
}

#[test]
fn test_reference_leaves() {
    let rules = DecisionRules::reference();
    // Cool water, low pH, low oxygen, low copper.
    assert_eq!(rules.predict(&features(0.1, 0.1, 0.1, 0.1, 1.0)), 0.95);
    // Warm water, low copper, untreated.
    assert_eq!(rules.predict(&features(0.3, 0.9, 0.5, 0.5, 0.0)), 0.00);
    // Warm water, low copper, treated.
    assert_eq!(rules.predict(&features(0.3, 0.9, 0.5, 0.5, 1.0)), 0.28);
    // Warm water, high copper, high pH, high oxygen.
    assert_eq!(rules.predict(&features(0.9, 0.9, 0.9, 0.9, 1.0)), 0.60);
    // Thresholds are inclusive on the lower branch.
    assert_eq!(rules.predict(&features(0.51, 0.9, 0.5, 0.5, 1.0)), 0.20);
}

#[test]
fn test_concrete_evaluate_matches_predict() {
    let rules = DecisionRules::reference();
    let raw = features(0.6, 0.2, 0.7, 0.55, 1.0);
    let quantities = raw.clone().map(|_, v| Quantity::Concrete(v));
    assert_eq!(
        rules.evaluate(&quantities).as_concrete(),
        Some(rules.predict(&raw))
    );
}

#[test]
fn test_symbolic_evaluate_builds_term() {
    let mut solver = Solver::new();
    let copper = solver.real("copper");
    let inputs = Features {
        copper: Quantity::from(&copper),
        temperature: Quantity::Concrete(0.9),
        ph: Quantity::Concrete(0.9),
        dissolved_oxygen: Quantity::Concrete(0.9),
        treatment: Quantity::Concrete(1.0),
    };
    let estimate = DecisionRules::reference().evaluate(&inputs);
    assert!(estimate.as_concrete().is_none());
}

#[test]
fn test_rejects_leaf_outside_unit_interval() {
    let err = DecisionRules::new(split(Feature::Copper, 0.5, leaf(0.2), leaf(1.5))).unwrap_err();
    assert!(err.to_string().contains("outside"));
}

#[test]
fn test_rejects_unreachable_threshold() {
    let root = split(
        Feature::Ph,
        0.4,
        split(Feature::Ph, 0.6, leaf(0.1), leaf(0.2)),
        leaf(0.3),
    );
    assert!(DecisionRules::new(root).is_err());
}

#[test]
fn test_rejects_deep_tree() {
    let mut node = leaf(0.5);
    for i in 0..=MAX_DEPTH {
        node = split(Feature::Copper, i as f64, node, leaf(0.1));
    }
    assert!(DecisionRules::new(node).is_err());
}

#[test]
fn test_from_tree_swaps_treatment_c_split() {
    let tree = RegressionTree::from_nodes(
        vec![
            TreeNode::Split {
                feature: TREATMENT_C,
                threshold: 0.5,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf { value: 0.8 },
            TreeNode::Leaf { value: 0.1 },
        ],
        6,
    )
    .unwrap();
    let rules = DecisionRules::from_tree(&tree).unwrap();
    // Treatment_C = 0 means treated, which took the left leaf.
    assert_eq!(rules.predict(&features(0.0, 0.0, 0.0, 0.0, 1.0)), 0.8);
    assert_eq!(rules.predict(&features(0.0, 0.0, 0.0, 0.0, 0.0)), 0.1);
}

#[test]
fn test_from_tree_maps_continuous_columns() {
    let tree = RegressionTree::from_nodes(
        vec![
            TreeNode::Split {
                feature: 3,
                threshold: 0.25,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf { value: 0.4 },
            TreeNode::Leaf { value: 0.6 },
        ],
        6,
    )
    .unwrap();
    let rules = DecisionRules::from_tree(&tree).unwrap();
    match rules.root() {
        RuleNode::Split { feature, .. } => assert_eq!(*feature, Feature::DissolvedOxygen),
        other => panic!("expected split, got {:?}", other),
    }
}

#[test]
fn test_render_lists_tests_and_values() {
    let text = DecisionRules::reference().render();
    assert!(text.starts_with("|--- temperature <= 0.25\n"));
    assert!(text.contains("|   |--- ph <= 0.46"));
    assert!(text.contains("value: [0.95]"));
    assert_eq!(text.lines().filter(|l| l.contains("value:")).count(), 25);
}

proptest! {
    #[test]
    fn prop_reference_estimate_in_unit_interval(
        copper in 0.0f64..=1.0,
        temperature in 0.0f64..=1.0,
        ph in 0.0f64..=1.0,
        dissolved_oxygen in 0.0f64..=1.0,
        treated in any::<bool>(),
    ) {
        let rules = DecisionRules::reference();
        let treatment = if treated { 1.0 } else { 0.0 };
        let value = rules.predict(&features(copper, temperature, ph, dissolved_oxygen, treatment));
        prop_assert!((0.0..=1.0).contains(&value));
    }
}
