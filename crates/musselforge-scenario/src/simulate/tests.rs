use super::*;
use musselforge_config::InitialPopulation;
use musselforge_test::experiment;
use proptest::prelude::*;

#[test]
fn test_tracks_run_independently() {
    let config = MusselConfig::default();
    let observations = experiment();
    let outcome = Simulator::new(&config, &observations).run().unwrap();

    assert_eq!(outcome.control.track, Track::Control);
    assert_eq!(outcome.treatment.track, Track::Treatment);
    let control_final = outcome.track(Track::Control).trajectory.last().unwrap();
    let treatment_final = outcome.track(Track::Treatment).trajectory.last().unwrap();
    assert!(control_final.population > treatment_final.population);
}

#[test]
fn test_track_namespaces_are_separate() {
    let config = MusselConfig::default();
    let observations = experiment();
    let simulator = Simulator::new(&config, &observations);
    let control = simulator.build(Track::Control).unwrap();
    let treatment = simulator.build(Track::Treatment).unwrap();
    assert!(control.scenario().variable("population_control_0").is_ok());
    assert!(control.scenario().variable("population_treatment_0").is_err());
    assert!(treatment.scenario().variable("clarity_treatment_9").is_ok());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_population_within_capacity(count in 0u32..=1000) {
        let mut config = MusselConfig::default();
        config.simulation.initial_population = InitialPopulation::Fixed { count };
        let observations = experiment();
        let outcome = Simulator::new(&config, &observations).run().unwrap();
        for track in Track::ALL {
            for day in &outcome.track(track).trajectory {
                prop_assert!(day.population >= 0.0);
                prop_assert!(day.population <= config.ecology.carrying_capacity);
                prop_assert!((0.0..=1.0).contains(&day.clarity));
            }
        }
    }
}
