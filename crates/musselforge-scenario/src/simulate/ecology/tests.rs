use super::*;
use proptest::prelude::*;

fn q(v: f64) -> Quantity {
    Quantity::Concrete(v)
}

fn value(quantity: Quantity) -> f64 {
    quantity.as_concrete().unwrap()
}

#[test]
fn test_mortality_tiers() {
    let config = EcologyConfig::default();
    assert_eq!(value(mortality_factor(&config, &q(0.6))), 0.99);
    assert_eq!(value(mortality_factor(&config, &q(0.5))), 0.99);
    assert_eq!(value(mortality_factor(&config, &q(0.3))), 0.85);
    assert_eq!(value(mortality_factor(&config, &q(0.19))), 0.0);
}

#[test]
fn test_mortality_matches_config_lookup() {
    let config = EcologyConfig::default();
    for copper in [0.0, 0.1, 0.2, 0.35, 0.5, 0.9] {
        assert_eq!(
            value(mortality_factor(&config, &q(copper))),
            config.mortality_factor(copper)
        );
    }
}

#[test]
fn test_logistic_growth_with_oxygen() {
    let config = EcologyConfig::default();
    let next = next_population(&config, &q(50.0), &q(0.8), &q(0.0));
    assert_eq!(value(next), 54.0);
}

#[test]
fn test_copper_mortality_shrinks_growth() {
    let config = EcologyConfig::default();
    let next = next_population(&config, &q(50.0), &q(0.8), &q(0.85));
    assert_eq!(value(next), 8.0);
}

#[test]
fn test_population_at_capacity_stays() {
    let config = EcologyConfig::default();
    let next = next_population(&config, &q(1000.0), &q(0.9), &q(0.0));
    assert_eq!(value(next), 1000.0);
}

#[test]
fn test_low_oxygen_shrinks_population() {
    let config = EcologyConfig::default();
    let next = next_population(&config, &q(100.0), &q(0.5), &q(0.0));
    assert_eq!(value(next), 95.0);
}

#[test]
fn test_no_oxygen_wipes_out_population() {
    let config = EcologyConfig::default();
    let next = next_population(&config, &q(100.0), &q(0.0), &q(0.0));
    assert_eq!(value(next), 0.0);
}

#[test]
fn test_clarity_is_capped() {
    let config = EcologyConfig::default();
    assert_eq!(value(next_clarity(&config, &q(0.5), &q(40.0))), 0.7);
    assert_eq!(value(next_clarity(&config, &q(0.9), &q(1000.0))), 1.0);
}

#[test]
fn test_plant_growth_threshold() {
    let config = EcologyConfig::default();
    assert!((value(plant_growth(&config, &q(0.8))) - 0.64).abs() < 1e-12);
    assert!((value(plant_growth(&config, &q(0.5))) - 0.2).abs() < 1e-12);
}

#[test]
fn test_oxygen_is_clipped() {
    let config = EcologyConfig::default();
    let rising = next_oxygen(&config, &q(0.95), &q(1.0), &q(0.0));
    assert_eq!(value(rising), 1.0);
    let falling = next_oxygen(&config, &q(0.1), &q(0.0), &q(1000.0));
    assert_eq!(value(falling), 0.0);
    let middle = next_oxygen(&config, &q(0.5), &q(0.5), &q(500.0));
    assert!((value(middle) - 0.45).abs() < 1e-12);
}

#[test]
fn test_domain_rules_with_concrete_state() {
    let config = EcologyConfig::default();
    let rules = domain_rules(&config, 50.0, &q(10.0), &q(0.5), &q(0.2), &q(0.3));
    assert_eq!(rules.len(), 4);
    let (premise, conclusion) = &rules[3];
    assert_eq!(premise.as_concrete(), Some(true));
    assert_eq!(conclusion.as_concrete(), Some(false));
}

proptest! {
    #[test]
    fn prop_population_stays_within_capacity(
        population in 0u32..=1000,
        oxygen in 0.0f64..=1.0,
        copper in 0.0f64..=1.0,
    ) {
        let config = EcologyConfig::default();
        let mortality = mortality_factor(&config, &q(copper));
        let next = value(next_population(&config, &q(population as f64), &q(oxygen), &mortality));
        prop_assert!(next >= 0.0);
        prop_assert!(next <= config.carrying_capacity);
        prop_assert_eq!(next, next.floor());
    }

    #[test]
    fn prop_clarity_never_decreases(clarity in 0.0f64..=1.0, population in 0u32..=1000) {
        let config = EcologyConfig::default();
        let next = value(next_clarity(&config, &q(clarity), &q(population as f64)));
        prop_assert!(next >= clarity);
        prop_assert!(next <= 1.0);
    }
}
