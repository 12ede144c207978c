//! Tests for MusselForge configuration.

use super::*;
use musselforge_core::Track;

#[test]
fn test_defaults_match_research_constants() {
    let config = MusselConfig::default();
    assert_eq!(config.random_seed, 42);
    assert_eq!(config.ecology.carrying_capacity, 1000.0);
    assert_eq!(config.ecology.oxygen_threshold, 0.6);
    assert_eq!(config.ecology.clarity_threshold, 0.7);
    assert_eq!(config.simulation.horizon_days, 10);
    assert_eq!(
        config.simulation.extrapolation,
        Extrapolation::WindowMean { from: 5, to: 10 }
    );
    assert_eq!(
        config.simulation.initial_population,
        InitialPopulation::Fixed { count: 50 }
    );
    assert_eq!(config.search.copper, Bounds::between(0.001, 0.55));
    assert_eq!(config.search.target_mortality, 0.60);
    assert_eq!(config.training.forest_trees, 100);
    assert!(config.validate().is_ok());
}

#[test]
fn test_mortality_tiers() {
    let ecology = EcologyConfig::default();
    assert_eq!(ecology.mortality_factor(0.6), 0.99);
    assert_eq!(ecology.mortality_factor(0.5), 0.99);
    assert_eq!(ecology.mortality_factor(0.3), 0.85);
    assert_eq!(ecology.mortality_factor(0.2), 0.85);
    assert_eq!(ecology.mortality_factor(0.19), 0.0);
}

#[test]
fn test_toml_parsing() {
    let toml = r#"
        random_seed = 9

        [ecology]
        carrying_capacity = 2000
        mortality_tiers = [
            { min_copper = 0.4, factor = 0.9 },
        ]

        [simulation]
        horizon_days = 20
        extrapolation = { type = "hold_last" }
        initial_population = { type = "observed", day = 2 }
        treatment = { population_rule = { type = "observed", through_day = 10 } }

        [solver]
        time_limit_ms = 250
    "#;

    let config = MusselConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.random_seed, 9);
    assert_eq!(config.ecology.carrying_capacity, 2000.0);
    assert_eq!(config.ecology.mortality_factor(0.45), 0.9);
    assert_eq!(config.ecology.growth_rate, 0.1);
    assert_eq!(config.simulation.horizon_days, 20);
    assert_eq!(config.simulation.extrapolation, Extrapolation::HoldLast);
    assert_eq!(
        config.simulation.initial_population,
        InitialPopulation::Observed { day: 2 }
    );
    assert_eq!(
        config.simulation.track(Track::Treatment).population_rule,
        PopulationRule::Observed { through_day: 10 }
    );
    assert_eq!(
        config.simulation.track(Track::Control).population_rule,
        PopulationRule::Logistic
    );
    assert_eq!(config.solver.time_limit(), Some(Duration::from_millis(250)));
    assert_eq!(config.solver.node_limit, 200_000);
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        random_seed: 3
        search:
          tolerance: 0.005
          copper:
            min: 0.0
            max: 1.0
        training:
          forest_trees: 10
    "#;

    let config = MusselConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.random_seed, 3);
    assert_eq!(config.search.tolerance, 0.005);
    assert_eq!(config.search.copper, Bounds::between(0.0, 1.0));
    assert_eq!(config.search.temperature, Bounds::between(10.0, 20.0));
    assert_eq!(config.training.forest_trees, 10);
}

#[test]
fn test_builder() {
    let config = MusselConfig::new()
        .with_random_seed(123)
        .with_horizon(50)
        .with_time_limit(Duration::from_secs(2))
        .with_extrapolation(Extrapolation::HoldLast)
        .with_population_rule(Track::Treatment, PopulationRule::Observed { through_day: 10 });

    assert_eq!(config.random_seed, 123);
    assert_eq!(config.simulation.horizon_days, 50);
    assert_eq!(config.solver.time_limit_ms, Some(2000));
    assert_eq!(config.simulation.extrapolation, Extrapolation::HoldLast);
    assert_eq!(
        config.simulation.treatment.population_rule,
        PopulationRule::Observed { through_day: 10 }
    );
}

#[test]
fn test_invalid_values_rejected() {
    let err = MusselConfig::from_toml_str("[search]\ntolerance = 0.0").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    let err = MusselConfig::from_toml_str(
        "[ecology]\nmortality_tiers = [{ min_copper = 0.2, factor = 0.8 }, { min_copper = 0.5, factor = 0.9 }]",
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    let err = MusselConfig::from_toml_str("[search.copper]\nmin = 0.5\nmax = 0.1").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    let err = MusselConfig::from_toml_str("[simulation]\ninitial_clarity = 1.5").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_parse_error() {
    let err = MusselConfig::from_toml_str("random_seed = \"x\"").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
}

#[test]
fn test_load_missing_file() {
    let err = MusselConfig::load("/nonexistent/musselforge.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_load_yaml_by_extension() {
    let path = std::env::temp_dir().join(format!("musselforge-config-{}.yaml", std::process::id()));
    std::fs::write(&path, "simulation:\n  horizon_days: 7\n").unwrap();
    let config = MusselConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(config.simulation.horizon_days, 7);
}

#[test]
fn test_bounds_contains() {
    let b = Bounds::at_least(5.0);
    assert!(b.contains(5.0));
    assert!(b.contains(1e9));
    assert!(!b.contains(4.99));
}

#[test]
fn test_sunlight_section() {
    let config = MusselConfig::default();
    assert_eq!(config.sunlight.segments, 36);
    assert_eq!(config.sunlight.density, Bounds::between(0.0, 300.0));
    assert_eq!(config.sunlight.target_penetration, 8.0);

    let config = MusselConfig::from_toml_str(
        "[sunlight]\nsegments = 12\ntreatment_effect = 0.25\n",
    )
    .unwrap();
    assert_eq!(config.sunlight.segments, 12);
    assert_eq!(config.sunlight.treatment_effect, 0.25);
    assert_eq!(config.sunlight.initial_density, 100.0);

    let err = MusselConfig::from_toml_str("[sunlight.birth_rate]\nmin = 0.1").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}
