use super::*;
use proptest::prelude::*;

#[test]
fn test_simple_sat() {
    let mut solver = Solver::new();
    let x = solver.real("x");
    let y = solver.real("y");
    solver.bound(&x, 0.0, 10.0).unwrap();
    solver.bound(&y, 0.0, 10.0).unwrap();
    solver.assert(Formula::eq(&x + &y, 7.0));
    solver.assert(Formula::ge(&x, 4.0));

    let result = solver.check().unwrap();
    let model = result.model().unwrap();
    let (xv, yv) = (model.get(&x).unwrap(), model.get(&y).unwrap());
    assert!((xv + yv - 7.0).abs() < 1e-5);
    assert!(xv >= 4.0 - 1e-9);
}

#[test]
fn test_unsat_bounds() {
    let mut solver = Solver::new();
    let x = solver.real("x");
    solver.bound(&x, 0.0, 1.0).unwrap();
    solver.assert(Formula::gt(&x, 2.0));
    assert_eq!(solver.check().unwrap(), SolverResult::Unsat);
}

#[test]
fn test_strict_boundary_is_unsat() {
    let mut solver = Solver::new();
    let x = solver.real("x");
    solver.bound(&x, 0.0, 1.0).unwrap();
    solver.assert(Formula::ge(&x, 0.5));
    solver.assert(Formula::lt(&x, 0.5));
    assert!(solver.check().unwrap().is_unsat());
}

#[test]
fn test_unbounded_variable_is_error() {
    let mut solver = Solver::new();
    let x = solver.real("x");
    let y = solver.real("y");
    solver.bound(&x, 0.0, 1.0).unwrap();
    solver.assert(Formula::le(&x, &y));
    assert_eq!(
        solver.check().unwrap_err(),
        SolverError::UnboundedVariable("y".into())
    );
}

#[test]
fn test_comparison_with_constant_counts_as_bound() {
    let mut solver = Solver::new();
    let x = solver.real("x");
    solver.assert(Formula::ge(&x, 5.0));
    let model = solver.check().unwrap().into_model().unwrap();
    assert!(model.get(&x).unwrap() >= 5.0);
}

#[test]
fn test_invalid_bound() {
    let mut solver = Solver::new();
    let x = solver.real("x");
    assert!(matches!(
        solver.bound(&x, 2.0, 1.0),
        Err(SolverError::InvalidBound { .. })
    ));
}

#[test]
fn test_integer_domain() {
    let mut solver = Solver::new();
    let n = solver.int("n");
    solver.bound(&n, 0.0, 10.0).unwrap();
    solver.assert(Formula::gt(&n * 2.0, 7.0));
    solver.assert(Formula::lt(&n, 5.0));
    let model = solver.check().unwrap().into_model().unwrap();
    assert_eq!(model.get(&n), Some(4.0));

    let mut solver = Solver::new();
    let n = solver.int("n");
    solver.bound(&n, 0.0, 10.0).unwrap();
    solver.assert(Formula::gt(&n, 3.2));
    solver.assert(Formula::lt(&n, 3.9));
    assert!(solver.check().unwrap().is_unsat());
}

#[test]
fn test_levels() {
    let mut solver = Solver::new();
    let dose = solver.real("dose");
    solver.levels(&dose, &[0.1, 0.25, 0.4]).unwrap();
    solver.assert(Formula::gt(&dose, 0.2));
    let result = solver.minimize(&dose).unwrap();
    assert!((result.model().unwrap().get(&dose).unwrap() - 0.25).abs() < 1e-6);
}

#[test]
fn test_push_pop_restores_store() {
    let mut solver = Solver::new();
    let x = solver.real("x");
    solver.bound(&x, 0.0, 10.0).unwrap();

    solver.push();
    solver.assert(Formula::gt(&x, 20.0));
    let tmp = solver.real("tmp");
    solver.bound(&tmp, 0.0, 1.0).unwrap();
    assert!(solver.check().unwrap().is_unsat());
    solver.pop().unwrap();

    assert!(solver.check().unwrap().is_sat());
    assert!(solver.variable("tmp").is_err());
    assert_eq!(solver.pop(), Err(SolverError::EmptyScopeStack));
}

#[test]
fn test_scope_guard_pops_on_drop() {
    let mut solver = Solver::new();
    let x = solver.real("x");
    solver.bound(&x, 0.0, 1.0).unwrap();
    {
        let mut scope = solver.scope();
        scope.assert(Formula::ge(&x, 0.9));
        assert_eq!(scope.scope_depth(), 1);
        assert!(scope.check().unwrap().is_sat());
    }
    assert_eq!(solver.scope_depth(), 0);
    assert_eq!(solver.assertions().len(), 0);
    let model = solver.check().unwrap().into_model().unwrap();
    assert!(model.get(&x).unwrap() <= 1.0);
}

#[test]
fn test_scoped_bound_is_restored() {
    let mut solver = Solver::new();
    let x = solver.real("x");
    solver.bound(&x, 0.0, 1.0).unwrap();
    {
        let mut scope = solver.scope();
        scope.assert(Formula::eq(&x, 0.25));
    }
    let model = solver.check().unwrap().into_model().unwrap();
    assert_eq!(model.get(&x), Some(0.5));
}

#[test]
fn test_minimize_and_maximize() {
    let mut solver = Solver::new();
    let x = solver.real("x");
    let y = solver.real("y");
    solver.bound(&x, 0.0, 10.0).unwrap();
    solver.bound(&y, 0.0, 10.0).unwrap();
    solver.assert(Formula::ge(&x + &y, 4.0));

    let min = solver.minimize(&x + &y * 2.0).unwrap();
    let model = min.model().unwrap();
    assert!((model.objective().unwrap() - 4.0).abs() < 1e-4);

    let max = solver.maximize(&x - &y).unwrap();
    assert!((max.model().unwrap().objective().unwrap() - 10.0).abs() < 1e-4);
    assert_eq!(solver.scope_depth(), 0);
}

#[test]
fn test_minimize_bound_derived_by_propagation() {
    let mut solver = Solver::new();
    let x = solver.real("x");
    solver.at_most(&x, 100.0).unwrap();
    solver.assert(Formula::ge(&x + 0.0, -37.5));
    let result = solver.minimize(&x).unwrap();
    assert!((result.model().unwrap().objective().unwrap() + 37.5).abs() < 1e-3);
}

#[test]
fn test_unbounded_objective() {
    let mut solver = Solver::new();
    let x = solver.real("x");
    solver.at_most(&x, 100.0).unwrap();
    assert_eq!(
        solver.minimize(&x).unwrap(),
        SolverResult::Unknown(UnknownReason::Unbounded)
    );
}

#[test]
fn test_minimize_strict_threshold_approaches_infimum() {
    let mut solver = Solver::new();
    let c = solver.real("copper");
    solver.at_least(&c, 0.0).unwrap();
    let rate = Term::ite(Formula::le(&c, 0.3), 0.2, 0.8);
    solver.assert(Formula::gt(rate, 0.5));
    let result = solver.minimize(&c).unwrap();
    let value = result.model().unwrap().get(&c).unwrap();
    assert!(value > 0.3 && value < 0.3 + 1e-4);
}

#[test]
fn test_minimize_unsat_passes_through() {
    let mut solver = Solver::new();
    let x = solver.real("x");
    solver.bound(&x, 0.0, 1.0).unwrap();
    solver.assert(Formula::gt(&x, 1.5));
    assert!(solver.minimize(&x).unwrap().is_unsat());
}

#[test]
fn test_node_limit_yields_unknown() {
    let settings = SolverSettings {
        node_limit: 1,
        ..SolverSettings::default()
    };
    let mut solver = Solver::with_settings(&settings);
    let x = solver.real("x");
    let y = solver.real("y");
    solver.bound(&x, -10.0, 10.0).unwrap();
    solver.bound(&y, -10.0, 10.0).unwrap();
    solver.assert(Formula::eq(&x * &y, 7.3));
    solver.assert(Formula::ge(&x, 9.0));
    assert!(matches!(
        solver.check().unwrap(),
        SolverResult::Unknown(UnknownReason::NodeLimit)
    ));
}

#[test]
fn test_nonlinear_chain_propagates_to_points() {
    let mut solver = Solver::new();
    let pop = solver.int("pop");
    let clarity = solver.real("clarity");
    solver.bound(&pop, 0.0, 1000.0).unwrap();
    solver.bound(&clarity, 0.0, 1.0).unwrap();
    solver.assert(Formula::eq(&pop, (Term::constant(250.0) * 1.1).floor()));
    solver.assert(Formula::eq(
        &clarity,
        (0.5 + (&pop / 1000.0).sqrt()).min(1.0),
    ));
    let model = solver.check().unwrap().into_model().unwrap();
    assert_eq!(model.get(&pop), Some(275.0));
    assert!((model.get(&clarity).unwrap() - 1.0).abs() < 1e-12);
}

#[test]
fn test_implication_and_disjunction() {
    let mut solver = Solver::new();
    let cu = solver.real("cu");
    let pop = solver.int("pop");
    solver.bound(&cu, 0.0, 1.0).unwrap();
    solver.bound(&pop, 0.0, 1000.0).unwrap();
    solver.assert(Formula::ge(&cu, 0.5).implies(Formula::le(&pop, 10.0)));
    solver.assert(Formula::ge(&pop, 500.0));
    solver.assert(Formula::or([Formula::ge(&cu, 0.9), Formula::le(&cu, 0.1)]));
    let model = solver.check().unwrap().into_model().unwrap();
    assert!(model.get(&cu).unwrap() <= 0.1 + 1e-9);
    assert!(model.get(&pop).unwrap() >= 500.0);
}

#[test]
fn test_model_accessors() {
    let mut solver = Solver::new();
    let x = solver.real("x");
    solver.assert(Formula::eq(&x, 0.123456));
    let model = solver.check().unwrap().into_model().unwrap();
    assert_eq!(model.value_of("x"), Some(0.123456));
    assert_eq!(model.decimal(&x, 3).unwrap().to_string(), "0.123");
    assert!(model.satisfies(&Formula::lt(&x, 0.2)));

    let mut other = Solver::new();
    let foreign = other.real("z");
    assert_eq!(model.get(&foreign), None);
}

fn assert_within_bounds(model: &Model, bounded: &[(Variable, f64, f64)]) {
    for (var, lo, hi) in bounded {
        let value = model.get(var).unwrap();
        assert!(
            *lo <= value && value <= *hi,
            "{var} = {value} outside [{lo}, {hi}]"
        );
    }
}

#[test]
fn test_saturating_monotone_chain_stays_in_bounds() {
    let mut solver = Solver::new();
    let mut bounded = Vec::new();
    let mut prev: Option<Variable> = None;
    for t in 0..10 {
        let clarity = solver.real(&format!("clarity_{t}"));
        solver.bound(&clarity, 0.0, 1.0).unwrap();
        match &prev {
            None => solver.assert(Formula::eq(&clarity, 0.5)),
            Some(p) => {
                let grown = (Term::from(p) + (0.07f64 * t as f64).sqrt()).min(1.0);
                solver.assert(Formula::eq(&clarity, grown));
                solver.assert(Formula::ge(&clarity, p));
            }
        }
        bounded.push((clarity.clone(), 0.0, 1.0));
        prev = Some(clarity);
    }
    let model = solver.check().unwrap().into_model().unwrap();
    assert_within_bounds(&model, &bounded);
    assert!((model.get(&bounded[9].0).unwrap() - 1.0).abs() < 1e-6);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_sat_models_respect_declared_bounds(
        start in 0.0f64..1.0,
        steps in proptest::collection::vec(0.0f64..0.6, 1..8),
        cap in 0.5f64..1.0,
    ) {
        let mut solver = Solver::new();
        let mut bounded = Vec::new();
        let first = solver.real("level_0");
        solver.bound(&first, 0.0, 1.0).unwrap();
        solver.assert(Formula::eq(&first, start));
        bounded.push((first.clone(), 0.0, 1.0));
        let mut prev = first;
        for (t, step) in steps.iter().enumerate() {
            let level = solver.real(&format!("level_{}", t + 1));
            solver.bound(&level, 0.0, 1.0).unwrap();
            let raw = Term::from(&prev) + *step;
            let clamped = Term::ite(Formula::ge(raw.clone(), cap), Term::from(1.0), raw.min(1.0));
            solver.assert(Formula::eq(&level, clamped));
            solver.assert(Formula::ge(&level, &prev));
            bounded.push((level.clone(), 0.0, 1.0));
            prev = level;
        }
        if let SolverResult::Sat(model) = solver.check().unwrap() {
            for (var, lo, hi) in &bounded {
                let value = model.get(var).unwrap();
                prop_assert!(*lo <= value && value <= *hi, "{} = {}", var, value);
            }
        }
    }

    #[test]
    fn prop_sat_models_satisfy_constraints(
        a in -5.0f64..5.0,
        b in 0.1f64..5.0,
        c in -5.0f64..5.0,
    ) {
        let mut solver = Solver::new();
        let x = solver.real("x");
        let y = solver.real("y");
        solver.bound(&x, -10.0, 10.0).unwrap();
        solver.bound(&y, -10.0, 10.0).unwrap();
        let constraints = [
            Formula::le(&x * b + &y, a),
            Formula::ge(&y, c),
        ];
        for f in &constraints {
            solver.assert(f.clone());
        }
        if let SolverResult::Sat(model) = solver.check().unwrap() {
            for f in &constraints {
                prop_assert!(eval_formula_tol(f, &model));
            }
        }
    }
}

fn eval_formula_tol(f: &Formula, model: &Model) -> bool {
    let values: Vec<f64> = model.iter().map(|(_, v)| v).collect();
    crate::eval::eval_formula(f, &values, 1e-6)
}
