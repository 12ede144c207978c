use super::*;
use musselforge_test::{Constant, CopperRamp};

fn run(predictor: &dyn MortalityPredictor) -> SearchOutcome {
    let config = SearchConfig::default();
    let settings = SolverSettings::default();
    CopperSearch::new(&config, &settings, predictor).run().unwrap()
}

#[test]
fn test_max_iterations() {
    assert_eq!(max_iterations(0.55 - 0.001, 0.01), 6);
    assert_eq!(max_iterations(0.005, 0.01), 0);
    assert_eq!(max_iterations(1.0, 0.25), 2);
}

#[test]
fn test_finds_minimal_dose_for_ramp() {
    // Predicted mortality reaches 0.60 at copper 0.30.
    let outcome = run(&CopperRamp { slope: 2.0 });
    let expected_iterations = max_iterations(0.549, 0.01) as usize;
    assert!(outcome.iterations() <= expected_iterations);

    let minimum = outcome.minimum.unwrap();
    assert!(minimum.copper >= 0.30);
    assert!(minimum.copper - 0.30 <= 0.01);
    assert!(outcome.predicted.unwrap() >= 0.60);
    assert!(outcome.upper - outcome.lower <= 0.01);
}

#[test]
fn test_no_smaller_probe_meets_target() {
    let outcome = run(&CopperRamp { slope: 2.0 });
    let minimum = outcome.minimum.unwrap().copper;
    for probe in &outcome.probes {
        if probe.verdict == ProbeVerdict::Meets {
            assert!(probe.copper >= minimum);
        }
    }
    assert!(outcome
        .probes
        .iter()
        .any(|p| p.verdict == ProbeVerdict::Misses));
}

#[test]
fn test_other_conditions_stay_within_bounds() {
    let outcome = run(&CopperRamp { slope: 2.0 });
    let config = SearchConfig::default();
    for probe in &outcome.probes {
        let conditions = probe.conditions.unwrap();
        assert!(config.temperature.contains(conditions.temperature));
        assert!(config.ph.contains(conditions.ph));
        assert!(config.dissolved_oxygen.contains(conditions.dissolved_oxygen));
        assert_eq!(conditions.treatment, TreatmentFlag::Treated);
        assert!((conditions.copper - probe.copper).abs() < 1e-9);
    }
}

#[test]
fn test_unreachable_target_has_no_minimum() {
    let outcome = run(&Constant(0.1));
    assert!(outcome.minimum.is_none());
    assert!(outcome.predicted.is_none());
    assert_eq!(outcome.iterations(), 6);
    assert!(outcome
        .probes
        .iter()
        .all(|p| p.verdict == ProbeVerdict::Misses));
}

#[test]
fn test_always_lethal_converges_to_lower_bound() {
    let outcome = run(&Constant(0.9));
    let minimum = outcome.minimum.unwrap();
    assert!(minimum.copper <= 0.001 + 0.01);
}

#[test]
fn test_open_copper_bounds_rejected() {
    let mut config = SearchConfig::default();
    config.copper.max = None;
    let settings = SolverSettings::default();
    assert!(CopperSearch::new(&config, &settings, &Constant(0.5))
        .run()
        .is_err());
}

#[test]
fn test_undecided_probe_stops_search() {
    let config = SearchConfig::default();
    let settings = SolverSettings {
        node_limit: 0,
        ..SolverSettings::default()
    };
    let predictor = CopperRamp { slope: 2.0 };
    let outcome = CopperSearch::new(&config, &settings, &predictor)
        .run()
        .unwrap();
    assert!(outcome.undecided);
    assert_eq!(outcome.iterations(), 1);
    assert_eq!(outcome.probes[0].verdict, ProbeVerdict::Undecided);
    assert!(outcome.minimum.is_none());
    assert_eq!(outcome.lower, config.copper.min.unwrap());
    assert_eq!(outcome.upper, config.copper.max.unwrap());
}

#[test]
fn test_decided_search_is_not_undecided() {
    assert!(!run(&CopperRamp { slope: 2.0 }).undecided);
}
