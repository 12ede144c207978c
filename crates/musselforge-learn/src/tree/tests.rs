use super::*;
use proptest::prelude::*;

fn step_data() -> Dataset {
    // y = 1 when x0 > 0.5, otherwise 0; x1 is noise.
    let features = vec![
        vec![0.1, 0.9],
        vec![0.2, 0.1],
        vec![0.3, 0.5],
        vec![0.7, 0.4],
        vec![0.8, 0.2],
        vec![0.9, 0.8],
    ];
    let targets = vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
    Dataset::new(features, targets).unwrap()
}

#[test]
fn test_single_split_recovers_step() {
    let tree = RegressionTree::fit(&step_data(), TreeParams::default()).unwrap();
    assert_eq!(tree.depth(), 1);
    assert_eq!(tree.n_nodes(), 3);
    match tree.root() {
        TreeNode::Split {
            feature, threshold, ..
        } => {
            assert_eq!(*feature, 0);
            assert!((threshold - 0.5).abs() < 1e-12);
        }
        other => panic!("expected split, got {:?}", other),
    }
    assert_eq!(tree.predict_row(&[0.0, 0.0]), 0.0);
    assert_eq!(tree.predict_row(&[1.0, 0.0]), 1.0);
}

#[test]
fn test_threshold_equal_goes_left() {
    let tree = RegressionTree::fit(&step_data(), TreeParams::default()).unwrap();
    assert_eq!(tree.predict_row(&[0.5, 0.0]), 0.0);
}

#[test]
fn test_max_depth_zero_is_mean_leaf() {
    let tree = RegressionTree::fit(&step_data(), TreeParams::default().with_max_depth(0)).unwrap();
    assert_eq!(tree.n_nodes(), 1);
    assert!((tree.predict_row(&[0.9, 0.9]) - 0.5).abs() < 1e-12);
}

#[test]
fn test_constant_target_does_not_split() {
    let data = Dataset::new(vec![vec![0.0], vec![1.0], vec![2.0]], vec![3.0; 3]).unwrap();
    let tree = RegressionTree::fit(&data, TreeParams::default()).unwrap();
    assert_eq!(tree.depth(), 0);
    assert_eq!(tree.predict_row(&[5.0]), 3.0);
}

#[test]
fn test_empty_dataset_is_error() {
    let err = RegressionTree::fit(&Dataset::default(), TreeParams::default()).unwrap_err();
    assert!(matches!(err, LearnError::EmptyDataset));
}

#[test]
fn test_from_nodes_validates_children() {
    let bad = vec![TreeNode::Split {
        feature: 0,
        threshold: 0.5,
        left: 1,
        right: 2,
    }];
    assert!(RegressionTree::from_nodes(bad, 1).is_err());

    let good = vec![
        TreeNode::Split {
            feature: 0,
            threshold: 0.5,
            left: 1,
            right: 2,
        },
        TreeNode::Leaf { value: -1.0 },
        TreeNode::Leaf { value: 1.0 },
    ];
    let tree = RegressionTree::from_nodes(good, 1).unwrap();
    assert_eq!(tree.predict_row(&[0.2]), -1.0);
    assert_eq!(tree.predict_row(&[0.8]), 1.0);
}

proptest! {
    #[test]
    fn prop_depth_respects_limit(
        xs in prop::collection::vec((0.0f64..1.0, 0.0f64..1.0), 2..40),
        depth in 0usize..4,
    ) {
        let features: Vec<Vec<f64>> = xs.iter().map(|(a, _)| vec![*a]).collect();
        let targets: Vec<f64> = xs.iter().map(|(_, b)| *b).collect();
        let data = Dataset::new(features, targets).unwrap();
        let tree = RegressionTree::fit(&data, TreeParams::default().with_max_depth(depth)).unwrap();
        prop_assert!(tree.depth() <= depth);
    }

    #[test]
    fn prop_prediction_within_target_range(
        xs in prop::collection::vec((0.0f64..1.0, 0.0f64..1.0), 1..40),
        probe in -1.0f64..2.0,
    ) {
        let features: Vec<Vec<f64>> = xs.iter().map(|(a, _)| vec![*a]).collect();
        let targets: Vec<f64> = xs.iter().map(|(_, b)| *b).collect();
        let lo = targets.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = targets.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let data = Dataset::new(features, targets).unwrap();
        let tree = RegressionTree::fit(&data, TreeParams::default()).unwrap();
        let y = tree.predict_row(&[probe]);
        prop_assert!(y >= lo - 1e-9 && y <= hi + 1e-9);
    }
}
