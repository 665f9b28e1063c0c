use super::single;
use approx::assert_abs_diff_eq;
use nyx_targeter::md::prelude::*;

#[test]
fn finished_is_idempotent() {
    let _ = pretty_env_logger::try_init();

    let mut tgt = single(
        DiffScheme::Forward,
        25,
        Variable::new("x", 10.0, 0.0, 20.0, 5.0, 1e-3),
        Goal::new("g", 60.0, 1e-6),
    );
    let sol = tgt.solve_with(|x| vec![5.0 * x[0]]).unwrap();
    assert!(sol.is_converged());

    for _ in 0..3 {
        assert_eq!(tgt.advance_state(), Ok(TargeterState::Finished));
        assert_eq!(tgt.status(), TargeterStatus::Converged);
        assert_eq!(tgt.iterations_taken(), sol.iterations);
        assert_eq!(tgt.variable_values(), sol.values());
    }
    assert_eq!(tgt.solution(), sol);
}

#[test]
fn reset_and_retarget_in_loop() {
    let _ = pretty_env_logger::try_init();

    let mut tgt = single(
        DiffScheme::Central,
        25,
        Variable::new("x", 1.0, -100.0, 100.0, 50.0, 1e-3),
        Goal::new("g", 0.0, 1e-8),
    );

    for k in 1..=4 {
        let offset = k as f64;
        tgt.take_action("Reset".parse().unwrap());
        tgt.take_action(TargeterAction::IncrementInstanceCount);
        assert_eq!(tgt.state(), TargeterState::Initializing);
        assert_eq!(tgt.status(), TargeterStatus::Initialized);

        // The response changes on every pass, a stale convergence would keep the previous solution.
        let sol = tgt.solve_with(|x| vec![2.0 * x[0] - offset]).unwrap();
        assert!(sol.is_converged(), "pass {k}: {sol}");
        assert_abs_diff_eq!(sol.values()[0], offset / 2.0, epsilon = 1e-8);
        if k > 1 {
            // Each pass starts from the previous solution, which is now off target
            assert_eq!(sol.iterations, 2);
        }
    }
    assert_eq!(tgt.instance_count(), 4);
    tgt.take_action(TargeterAction::ResetInstanceCount);
    assert_eq!(tgt.instance_count(), 0);
}

#[test]
fn reset_seeds_outside_tolerance() {
    let _ = pretty_env_logger::try_init();

    for tol in [0.0, 1e-3] {
        let mut tgt = single(
            DiffScheme::Forward,
            25,
            Variable::new("x", 1.0, -100.0, 100.0, 50.0, 1e-3),
            Goal::new("g", 5.0, tol),
        );
        tgt.reset();
        let seeded = tgt.nominal()[0];
        assert!((seeded - 5.0).abs() > tol);
        if tol > 0.0 {
            assert_abs_diff_eq!(seeded, 5.0 + 10.0 * tol, epsilon = 1e-12);
        } else {
            assert_abs_diff_eq!(seeded, 6.0, epsilon = 1e-12);
        }
    }
}

#[test]
fn registration_order() {
    let _ = pretty_env_logger::try_init();

    let mut tgt = Targeter::new(DiffScheme::Forward, 25);
    tgt.add_variable(Variable::new("x", 1.0, -100.0, 100.0, 50.0, 1e-3));
    tgt.register_goal(1, Goal::new("late", 5.0, 1e-3));
    assert_eq!(
        tgt.initialize(),
        Err(TargetingError::GoalRegistrationOrder {
            expected: 0,
            got: 1
        })
    );
    assert_eq!(tgt.advance_state(), Err(TargetingError::NotInitialized));

    let mut tgt = Targeter::new(DiffScheme::Forward, 25);
    tgt.add_variable(Variable::new("x", 1.0, -100.0, 100.0, 50.0, 1e-3));
    tgt.register_goal(0, Goal::new("first", 5.0, 1e-3));
    tgt.register_goal(1, Goal::new("second", 5.0, 1e-3));
    assert!(tgt.initialize().is_ok());
}

#[test]
fn invalid_variable() {
    let mut tgt = Targeter::new(DiffScheme::Forward, 25);
    tgt.add_variable(Variable::new("x", 1.0, 10.0, -10.0, 50.0, 1e-3));
    tgt.add_goal(Goal::new("g", 5.0, 1e-3));
    assert!(matches!(
        tgt.initialize(),
        Err(TargetingError::VariableError { .. })
    ));
    assert!(tgt.initialize().unwrap_err().is_configuration());
}

#[test]
fn yaml_driven() {
    let _ = pretty_env_logger::try_init();

    let yaml = r#"
max_iterations: 15
scheme: BackwardDifference
report_style: Verbose
variables:
  - name: angle
    value: 0.5
    min_value: 0.0
    max_value: 1.5
    max_step: 0.2
    perturbation: 1.0e-6
goals:
  - name: sine
    desired_value: 0.8
    tolerance: 1.0e-10
"#;
    let cfg = TargeterConfig::loads(yaml).unwrap();
    let mut tgt = Targeter::from_config(cfg).unwrap();
    assert_eq!(tgt.scheme(), DiffScheme::Backward);
    assert_eq!(tgt.report_style, ReportStyle::Verbose);

    let sol = tgt.solve_with(|x| vec![x[0].sin()]).unwrap();
    assert!(sol.is_converged(), "{sol}");
    assert_abs_diff_eq!(sol.values()[0], 0.8_f64.asin(), epsilon = 1e-9);
    assert!(sol.iterations <= 15);
    assert!(format!("{sol}").contains("angle"));
}
