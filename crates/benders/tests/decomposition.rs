use benders::{
    BendersError, Config, Framework, LpForm, ProblemSpec, SubproblemReturn, Termination, solve,
};
use benders_solver::{
    Backend, ConstraintSense, Model, ObjectiveSense, SimplexBackend, SolverModel, SolverParams,
    VarType, Variable,
};

const TOL: f64 = 1e-3;

/// Two plants (binary) serving two markets (continuous blocks).
///
///   open costs 5, 4; a budget allows only one plant
///   market A: demand 4, unit cost 1 from plant 0, 3 from plant 1, cap 6
///   market B: demand 3, unit cost 4 from plant 0, 1 from plant 1, cap 5
///
/// Plant 0 alone costs 5 + 4 + 12 = 21, plant 1 alone 4 + 12 + 3 = 19.
fn plants() -> Model {
    let mut model = Model::new("plants");
    model.add_var(Variable::binary("open0").with_obj(5.0));
    model.add_var(Variable::binary("open1").with_obj(4.0));
    model.add_var(Variable::continuous("a0").with_obj(1.0));
    model.add_var(Variable::continuous("a1").with_obj(3.0));
    model.add_var(Variable::continuous("b0").with_obj(4.0));
    model.add_var(Variable::continuous("b1").with_obj(1.0));

    model.add_constraint("budget", vec![(0, 2.0), (1, 3.0)], ConstraintSense::Le, 4.0);
    model.add_constraint("demand_a", vec![(2, 1.0), (3, 1.0)], ConstraintSense::Ge, 4.0);
    model.add_constraint("cap_a0", vec![(2, 1.0), (0, -6.0)], ConstraintSense::Le, 0.0);
    model.add_constraint("cap_a1", vec![(3, 1.0), (1, -6.0)], ConstraintSense::Le, 0.0);
    model.add_constraint("demand_b", vec![(4, 1.0), (5, 1.0)], ConstraintSense::Ge, 3.0);
    model.add_constraint("cap_b0", vec![(4, 1.0), (0, -5.0)], ConstraintSense::Le, 0.0);
    model.add_constraint("cap_b1", vec![(5, 1.0), (1, -5.0)], ConstraintSense::Le, 0.0);
    model
}

/// Adds a block with no cost that is only feasible once plant 1 is open:
/// `z in [1, 5]`, `z <= 2 open1`
fn plants_with_permit() -> Model {
    let mut model = plants();
    let z = model.add_var(Variable::continuous("permit").with_bounds(1.0, 5.0));
    model.add_constraint("permit", vec![(z, 1.0), (1, -2.0)], ConstraintSense::Le, 0.0);
    model
}

fn spec(model: Model) -> ProblemSpec {
    let num_vars = model.num_variables();
    let mut spec = ProblemSpec::new(model);
    spec.set_complicating_vars([0, 1]).unwrap();
    spec.add_non_complicating_vars([2, 3]).unwrap();
    spec.add_non_complicating_vars([4, 5]).unwrap();
    if num_vars > 6 {
        spec.add_non_complicating_vars(6..num_vars).unwrap();
    }
    spec
}

fn direct_objective(model: &Model) -> f64 {
    let mut solver = SimplexBackend.load(model, &SolverParams::default()).unwrap();
    solver.optimize().unwrap();
    solver.obj_val().unwrap()
}

fn all_configs() -> Vec<Config> {
    let mut configs = Vec::new();
    for framework in [Framework::Callback, Framework::Iterative] {
        for lp_form in [LpForm::Primal, LpForm::Dual] {
            for sub_return in [SubproblemReturn::Subgradient, SubproblemReturn::Duals] {
                configs.push(Config {
                    framework,
                    lp_form,
                    sub_return,
                    ..Config::default()
                });
            }
        }
    }
    configs
}

fn label(config: &Config) -> String {
    format!(
        "{:?}/{:?}/{:?}",
        config.framework, config.lp_form, config.sub_return
    )
}

fn assert_matches_direct_solve(model: Model) {
    let expected = direct_objective(&model);
    for config in all_configs() {
        let mut spec = spec(model.clone());
        let result = solve(&mut spec, &config, &SimplexBackend)
            .unwrap_or_else(|e| panic!("{}: {}", label(&config), e));

        assert!(
            (result.obj_val() - expected).abs() < TOL,
            "{}: expected {}, got {}",
            label(&config),
            expected,
            result.obj_val()
        );
        let x = result.x().unwrap();
        assert!(
            model.is_feasible(x, 1e-6),
            "{}: infeasible solution {:?}",
            label(&config),
            x
        );
        assert!(
            (model.objective_value(x) - expected).abs() < TOL,
            "{}: solution value {} differs from {}",
            label(&config),
            model.objective_value(x),
            expected
        );
    }
}

#[test]
fn test_direct_solve_picks_plant_one() {
    assert!((direct_objective(&plants()) - 19.0).abs() < 1e-6);
}

#[test]
fn test_every_path_matches_direct_solve() {
    assert_matches_direct_solve(plants());
}

#[test]
fn test_maximization_matches_direct_solve() {
    let mut model = plants();
    for var in &mut model.variables {
        var.obj = -var.obj;
    }
    model.sense = ObjectiveSense::Maximize;
    assert!((direct_objective(&model) + 19.0).abs() < 1e-6);
    assert_matches_direct_solve(model);
}

#[test]
fn test_zero_objective_block_matches_direct_solve() {
    let model = plants_with_permit();
    let expected = direct_objective(&model);
    assert!((expected - 19.0).abs() < 1e-6);
    assert_matches_direct_solve(model);
}

#[test]
fn test_reset_subproblem_gives_same_answer() {
    let mut config = Config {
        framework: Framework::Iterative,
        reset_subproblem: true,
        ..Config::default()
    };
    for lp_form in [LpForm::Primal, LpForm::Dual] {
        config.lp_form = lp_form;
        let mut spec = spec(plants());
        let result = solve(&mut spec, &config, &SimplexBackend).unwrap();
        assert!((result.obj_val() - 19.0).abs() < TOL, "{:?}: {}", lp_form, result.obj_val());
    }
}

#[test]
fn test_continuous_model_through_callback_driver() {
    let mut model = plants();
    for var in &mut model.variables[..2] {
        var.vtype = VarType::Continuous;
        var.ub = 1.0;
    }
    let expected = direct_objective(&model);

    for lp_form in [LpForm::Primal, LpForm::Dual] {
        for sub_return in [SubproblemReturn::Subgradient, SubproblemReturn::Duals] {
            let config = Config {
                framework: Framework::Callback,
                lp_form,
                sub_return,
                ..Config::default()
            };
            let mut spec = spec(model.clone());
            let result = solve(&mut spec, &config, &SimplexBackend).unwrap();

            assert!(
                (result.obj_val() - expected).abs() < TOL,
                "{}: expected {}, got {}",
                label(&config),
                expected,
                result.obj_val()
            );
            // the dummy binary never reaches the caller
            assert_eq!(result.master.solution.len(), 2);
            assert_eq!(result.x().unwrap().len(), model.num_variables());
        }
    }
}

#[test]
fn test_iterative_stops_at_iteration_limit() {
    let mut config = Config {
        framework: Framework::Iterative,
        ..Config::default()
    };
    config.iterative.max_iterations = 1;
    let mut spec = spec(plants());
    let result = solve(&mut spec, &config, &SimplexBackend).unwrap();

    assert_eq!(result.termination(), Termination::IterationLimit);
    // no candidate was feasible for both markets yet
    assert_eq!(result.obj_val(), f64::INFINITY);
}

#[test]
fn test_iterative_stops_at_time_limit() {
    let mut config = Config {
        framework: Framework::Iterative,
        ..Config::default()
    };
    config.iterative.timelimit = Some(1e-12);
    let mut spec = spec(plants());
    let result = solve(&mut spec, &config, &SimplexBackend).unwrap();
    assert_eq!(result.termination(), Termination::TimeLimit);
}

#[test]
fn test_iterative_stops_at_optimality_gap() {
    let config = Config {
        framework: Framework::Iterative,
        ..Config::default()
    };
    let mut spec = spec(plants());
    let result = solve(&mut spec, &config, &SimplexBackend).unwrap();

    assert_eq!(result.termination(), Termination::OptimalityGap);
    assert!(result.mip_gap() < 1e-8);
    assert!((result.obj_bound() - 19.0).abs() < TOL);
}

#[test]
fn test_callback_reports_master_status() {
    let mut spec = spec(plants());
    let result = solve(&mut spec, &Config::default(), &SimplexBackend).unwrap();
    assert_eq!(
        result.termination(),
        Termination::MasterStatus(benders_solver::Status::Optimal)
    );
    let x = result.x().unwrap();
    assert_eq!(&x[..2], &[0.0, 1.0]);
}

#[test]
fn test_overlapping_blocks_fail() {
    let mut model = plants();
    model.add_constraint("shared", vec![(2, 1.0), (5, 1.0)], ConstraintSense::Le, 100.0);
    let mut spec = spec(model);
    let err = solve(&mut spec, &Config::default(), &SimplexBackend).unwrap_err();
    assert!(
        matches!(err, BendersError::OverlappingSubproblems { first: 0, second: 1 }),
        "{}",
        err
    );
}

#[test]
fn test_integer_block_variable_fails() {
    let mut model = plants();
    model.variables[3].vtype = VarType::Integer;
    let mut spec = spec(model);
    let err = solve(&mut spec, &Config::default(), &SimplexBackend).unwrap_err();
    assert!(matches!(err, BendersError::NonContinuousSubproblem { index: 3, .. }), "{}", err);
}

#[test]
fn test_spec_is_single_use() {
    let mut spec = spec(plants());
    solve(&mut spec, &Config::default(), &SimplexBackend).unwrap();
    let err = solve(&mut spec, &Config::default(), &SimplexBackend).unwrap_err();
    assert!(matches!(err, BendersError::Finalized));
}

#[test]
fn test_invalid_config_leaves_spec_untouched() {
    let mut config = Config::default();
    config.theta_lb = f64::NEG_INFINITY;
    let mut spec = spec(plants());
    let err = solve(&mut spec, &config, &SimplexBackend).unwrap_err();
    assert!(matches!(err, BendersError::Config(_)));
    assert!(!spec.is_finalized());
}

#[test]
fn test_unassigned_variables_become_last_block() {
    let mut spec = ProblemSpec::new(plants());
    spec.set_complicating_vars([0, 1]).unwrap();
    spec.add_non_complicating_vars([2, 3]).unwrap();
    let result = solve(&mut spec, &Config::default(), &SimplexBackend).unwrap();

    assert_eq!(result.subproblems.len(), 2);
    assert_eq!(spec.non_complicating_vars()[1], vec![4, 5]);
    assert!((result.obj_val() - 19.0).abs() < TOL);
}
