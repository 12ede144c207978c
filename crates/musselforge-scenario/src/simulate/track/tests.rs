use super::*;
use musselforge_core::ValueSource;
use musselforge_test::{experiment, COPPER_GAP_DAY};

use crate::error::ScenarioError;

fn solve(track: Track, config: &MusselConfig) -> TrackOutcome {
    let observations = experiment();
    TrackSimulation::build(track, config, &observations)
        .unwrap()
        .solve()
        .unwrap()
}

fn populations(outcome: &TrackOutcome) -> Vec<f64> {
    outcome.trajectory.iter().map(|d| d.population).collect()
}

#[test]
fn test_control_population_grows() {
    let outcome = solve(Track::Control, &MusselConfig::default());
    assert_eq!(outcome.verdict, TrackVerdict::Solved);
    assert_eq!(outcome.trajectory.len(), 10);
    let pops = populations(&outcome);
    assert_eq!(pops[0], 50.0);
    assert_eq!(pops[1], 54.0);
    assert_eq!(pops[9], 104.0);
}

#[test]
fn test_treatment_population_collapses() {
    let outcome = solve(Track::Treatment, &MusselConfig::default());
    assert_eq!(outcome.verdict, TrackVerdict::Solved);
    let pops = populations(&outcome);
    assert_eq!(&pops[..4], &[50.0, 8.0, 1.0, 0.0]);
    assert!(pops[4..].iter().all(|&p| p == 0.0));
}

#[test]
fn test_state_stays_in_range_on_both_tracks() {
    let config = MusselConfig::default();
    for track in Track::ALL {
        let outcome = solve(track, &config);
        for day in &outcome.trajectory {
            assert!(day.population >= 0.0);
            assert!(day.population <= config.ecology.carrying_capacity);
            assert!((0.0..=1.0).contains(&day.clarity));
            assert!((0.0..=1.0).contains(&day.oxygen_level));
        }
        for pair in outcome.trajectory.windows(2) {
            assert!(pair[1].clarity >= pair[0].clarity - 1e-9);
        }
    }
}

#[test]
fn test_copper_gap_uses_previous_day() {
    let outcome = solve(Track::Treatment, &MusselConfig::default());
    let gap = &outcome.trajectory[COPPER_GAP_DAY as usize];
    let copper = gap.covariates[&Covariate::Copper];
    assert!((copper - 0.24).abs() < 1e-6);
    assert!(outcome.fallbacks.iter().any(|(day, covariate, resolved)| {
        *day == COPPER_GAP_DAY
            && *covariate == Covariate::Copper
            && resolved.source == ValueSource::PriorDay { day: COPPER_GAP_DAY - 1 }
    }));
}

#[test]
fn test_missing_covariate_fails_construction() {
    let empty = Observations::new();
    let err = TrackSimulation::build(Track::Treatment, &MusselConfig::default(), &empty)
        .err()
        .unwrap();
    match err {
        ScenarioError::MissingInput {
            covariate,
            track,
            day,
        } => {
            assert_eq!(covariate, Covariate::Copper);
            assert_eq!(track, Track::Treatment);
            assert_eq!(day, 0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_zero_horizon_is_rejected() {
    let mut config = MusselConfig::default();
    config.simulation.horizon_days = 0;
    let observations = experiment();
    assert!(TrackSimulation::build(Track::Control, &config, &observations).is_err());
}

#[test]
fn test_observed_population_rule_then_model() {
    let mut config = MusselConfig::default();
    config.simulation.treatment.population_rule = PopulationRule::Observed { through_day: 3 };
    let outcome = solve(Track::Treatment, &config);
    let pops = populations(&outcome);
    assert_eq!(&pops[..5], &[50.0, 18.0, 16.0, 14.0, 2.0]);
}

#[test]
fn test_observed_initial_population() {
    let mut config = MusselConfig::default();
    config.simulation.initial_population = InitialPopulation::Observed { day: 2 };
    let outcome = solve(Track::Treatment, &config);
    assert_eq!(outcome.initial_population, 16.0);
    assert_eq!(outcome.trajectory[0].population, 16.0);
}

#[test]
fn test_extrapolated_days_use_window_mean() {
    let mut config = MusselConfig::default();
    config.simulation.horizon_days = 14;
    config.simulation.observed_through_day = 9;
    let outcome = solve(Track::Treatment, &config);
    assert_eq!(outcome.trajectory.len(), 14);
    let copper = outcome.trajectory[12].covariates[&Covariate::Copper];
    assert!((copper - 0.16).abs() < 1e-6);
    assert!(outcome.fallbacks.iter().any(|(day, _, resolved)| {
        *day == 12 && resolved.source == ValueSource::WindowMean { from: 5, to: 10 }
    }));
}

#[test]
fn test_domain_rules_reject_copper_survivors() {
    let mut config = MusselConfig::default();
    config.simulation.domain_rules = true;
    assert_eq!(
        solve(Track::Treatment, &config).verdict,
        TrackVerdict::Infeasible
    );
    assert_eq!(solve(Track::Control, &config).verdict, TrackVerdict::Solved);
}

#[test]
fn test_end_state_checks() {
    let treatment = solve(Track::Treatment, &MusselConfig::default());
    let reachable = |outcome: &TrackOutcome, end_state| {
        outcome
            .end_states
            .iter()
            .find(|c| c.end_state == end_state)
            .and_then(|c| c.reachable)
    };
    assert_eq!(reachable(&treatment, EndState::TargetPopulation), Some(true));
    assert_eq!(reachable(&treatment, EndState::Eradication), Some(false));
    assert_eq!(reachable(&treatment, EndState::LowClarity), Some(false));

    let control = solve(Track::Control, &MusselConfig::default());
    assert_eq!(reachable(&control, EndState::TargetPopulation), Some(false));
}

#[test]
fn test_what_if_leaves_track_unchanged() {
    let observations = experiment();
    let mut sim =
        TrackSimulation::build(Track::Treatment, &MusselConfig::default(), &observations).unwrap();
    let before = sim.scenario().solver().assertions().len();
    assert!(sim.what_if(EndState::Eradication).unwrap().is_unsat());
    assert_eq!(sim.scenario().solver().scope_depth(), 0);
    assert_eq!(sim.scenario().solver().assertions().len(), before);
    assert_eq!(sim.solve().unwrap().verdict, TrackVerdict::Solved);
}

#[test]
fn test_each_day_has_its_copper_variable() {
    let observations = experiment();
    let sim = TrackSimulation::build(Track::Treatment, &MusselConfig::default(), &observations)
        .unwrap();
    for day in 0..sim.horizon() as u32 {
        let copper = sim.copper(day).unwrap();
        assert_eq!(copper.name(), format!("copper_concentration_treatment_{day}"));
        assert_eq!(&sim.scenario().variable(copper.name()).unwrap(), copper);
    }
    assert!(sim.copper(sim.horizon() as u32).is_none());
}

#[test]
fn test_mortality_follows_prior_day_copper() {
    let outcome = solve(Track::Treatment, &MusselConfig::default());
    let copper_day0 = outcome.trajectory[0].covariates[&Covariate::Copper];
    assert!(copper_day0 >= 0.2);
    // 0.85 tier: floor(50 * 0.15 * 1.095) = 8
    assert_eq!(outcome.trajectory[1].population, 8.0);
}

#[test]
fn test_clarity_never_exceeds_one_as_it_saturates() {
    let outcome = solve(Track::Control, &MusselConfig::default());
    for day in &outcome.trajectory {
        assert!(day.clarity <= 1.0, "day {} clarity {}", day.day, day.clarity);
        assert!(day.oxygen_level <= 1.0);
    }
}
