//! Whole-pipeline checks on the fixture experiment.

use musselforge::prelude::*;
use musselforge::scenario::{max_iterations, ProbeVerdict, TrackVerdict};
use musselforge_test::{experiment, merged_records};

fn probe() -> Conditions {
    Conditions::new(0.54, 8.0, 7.0, 5.0, TreatmentFlag::Treated)
}

#[test]
fn test_trained_predictor_is_deterministic() {
    let config = MusselConfig::default();
    let records = merged_records();
    let first = TrainedPredictor::train(&records, &config.training, config.random_seed).unwrap();
    let second = TrainedPredictor::train(&records, &config.training, config.random_seed).unwrap();

    let a = first.predict(&probe());
    assert_eq!(a, first.predict(&probe()));
    assert_eq!(a, second.predict(&probe()));
    assert!((0.0..=1.0).contains(&a));
}

#[test]
fn test_copper_search_with_trained_predictor() {
    let config = MusselConfig::default();
    let predictor =
        TrainedPredictor::train(&merged_records(), &config.training, config.random_seed).unwrap();
    let outcome = CopperSearch::new(&config.search, &config.solver, &predictor)
        .run()
        .unwrap();

    assert!(outcome.iterations() as u32 <= max_iterations(0.55 - 0.001, 0.01));
    assert!(outcome.upper - outcome.lower <= 0.01);
    if let Some(minimum) = outcome.minimum {
        assert!(outcome.predicted.unwrap() >= 0.60);
        for probe in outcome.probes.iter().filter(|p| p.verdict == ProbeVerdict::Meets) {
            assert!(probe.copper >= minimum.copper);
        }
    }
}

#[test]
fn test_surrogate_rules_drive_the_optimizer() {
    let config = MusselConfig::default();
    let set = TrainingSet::prepare(&merged_records(), &config.training).unwrap();
    let tree = set.surrogate(config.training.surrogate_max_depth).unwrap();
    let rules = DecisionRules::from_tree(&tree).unwrap();
    assert!(rules.depth() <= 5);

    let optimizer = RulesOptimizer::new(&config.optimize, &config.solver, &rules, set.normalizer());
    let outcome = optimizer.run().unwrap();
    if let Some(conditions) = outcome.conditions {
        assert!(conditions.copper >= 0.0);
        assert!((0.0..=1.0).contains(&outcome.estimate.unwrap()));
    }
}

#[test]
fn test_simulation_bounds_on_both_tracks() {
    let config = MusselConfig::default();
    let observations = experiment();
    let outcome = Simulator::new(&config, &observations).run().unwrap();

    for track in Track::ALL {
        let track_outcome = outcome.track(track);
        assert_eq!(track_outcome.verdict, TrackVerdict::Solved);
        for day in &track_outcome.trajectory {
            assert!((0.0..=config.ecology.carrying_capacity).contains(&day.population));
            assert!((0.0..=1.0).contains(&day.clarity));
        }
        for pair in track_outcome.trajectory.windows(2) {
            assert!(pair[1].clarity >= pair[0].clarity - 1e-9);
        }
    }
}

#[test]
fn test_missing_copper_falls_back_to_previous_day() {
    let observations = experiment();
    let resolved = observations
        .observed(Covariate::Copper, Track::Treatment, musselforge_test::COPPER_GAP_DAY)
        .unwrap();
    let previous = observations
        .mean_at(Covariate::Copper, Track::Treatment, musselforge_test::COPPER_GAP_DAY - 1)
        .unwrap();
    assert_eq!(resolved.value, previous);
    assert!(resolved.value > 0.0);
}
