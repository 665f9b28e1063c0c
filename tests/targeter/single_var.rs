use super::single;
use approx::assert_abs_diff_eq;
use nyx_targeter::md::prelude::*;
use rstest::*;

#[rstest]
fn already_converged(
    #[values(DiffScheme::Forward, DiffScheme::Backward, DiffScheme::Central)] scheme: DiffScheme,
) {
    let _ = pretty_env_logger::try_init();

    let mut tgt = single(
        scheme,
        25,
        Variable::new("x", 10.0, 0.0, 20.0, 5.0, 1e-3),
        Goal::new("g", 50.0, 1e-6),
    );
    let mut evals = 0;
    let sol = tgt
        .solve_with(|x| {
            evals += 1;
            vec![5.0 * x[0]]
        })
        .unwrap();

    assert_eq!(sol.status, TargeterStatus::Converged);
    assert_eq!(sol.iterations, 1);
    assert_eq!(evals, 1);
    assert_eq!(sol.values(), vec![10.0]);
}

#[rstest]
fn converges_on_max_bound(
    #[values(DiffScheme::Forward, DiffScheme::Backward, DiffScheme::Central)] scheme: DiffScheme,
) {
    let _ = pretty_env_logger::try_init();

    // The maximum step limits each correction to 5: 10 -> 15 -> 20
    let mut tgt = single(
        scheme,
        25,
        Variable::new("x", 10.0, 0.0, 20.0, 5.0, 1e-3),
        Goal::new("g", 100.0, 1e-6),
    );
    let sol = tgt.solve_with(|x| vec![5.0 * x[0]]).unwrap();

    assert!(sol.is_converged());
    assert_eq!(sol.iterations, 3);
    assert_abs_diff_eq!(sol.values()[0], 20.0, epsilon = 1e-9);
    assert_abs_diff_eq!(sol.achieved[0], 100.0, epsilon = 1e-6);
    let (delta, mult) = tgt.last_step();
    // The second correction was within the maximum step
    assert_abs_diff_eq!(delta[0], 5.0, epsilon = 1e-6);
    assert_abs_diff_eq!(mult, 1.0, epsilon = 1e-6);
}

#[rstest]
fn bounds_are_respected(
    #[values(DiffScheme::Forward, DiffScheme::Backward)] scheme: DiffScheme,
) {
    let _ = pretty_env_logger::try_init();

    // Unreachable within bounds: the variable must stay on its maximum
    let mut tgt = single(
        scheme,
        6,
        Variable::new("x", 10.0, 0.0, 20.0, 5.0, 1e-3),
        Goal::new("g", 150.0, 1e-6),
    );
    let sol = tgt
        .solve_with(|x| {
            // Every evaluation, perturbed or not, is within bounds for one sided differences
            assert!((0.0..=20.0).contains(&x[0]), "{}", x[0]);
            vec![5.0 * x[0]]
        })
        .unwrap();

    assert_eq!(sol.status, TargeterStatus::ExceededIterations);
    assert_eq!(sol.values(), vec![20.0]);
}

#[test]
fn central_nominal_within_bounds() {
    let _ = pretty_env_logger::try_init();

    let mut tgt = single(
        DiffScheme::Central,
        6,
        Variable::new("x", 10.0, 0.0, 20.0, 5.0, 1e-3),
        Goal::new("g", 150.0, 1e-6),
    );
    loop {
        match tgt.advance_state().unwrap() {
            TargeterState::Nominal => {
                let x = tgt.variable_values()[0];
                assert!((0.0..=20.0).contains(&x), "{x}");
                tgt.report_goal_value(0, 5.0 * x);
            }
            TargeterState::Perturbing => {
                // Central differences may cross the bound for symmetry
                let x = tgt.variable_values()[0];
                tgt.report_goal_value(0, 5.0 * x);
            }
            TargeterState::Finished => break,
            _ => {}
        }
    }
    assert_eq!(tgt.status(), TargeterStatus::ExceededIterations);
    assert_eq!(tgt.variable_values(), vec![20.0]);
}

#[test]
fn iteration_budget() {
    let _ = pretty_env_logger::try_init();

    // exp(x) can never be -1
    let mut tgt = single(
        DiffScheme::Forward,
        5,
        Variable::new("x", 0.0, -10.0, 10.0, 5.0, 1e-3),
        Goal::new("g", -1.0, 1e-6),
    );
    let mut evals = 0;
    let sol = tgt
        .solve_with(|x| {
            evals += 1;
            vec![x[0].exp()]
        })
        .unwrap();

    assert_eq!(sol.status, TargeterStatus::ExceededIterations);
    assert_eq!(sol.iterations, 5);
    assert_eq!(tgt.iterations_taken(), 5);
    // Five nominal runs and four perturbations
    assert_eq!(evals, 9);
    assert!(!sol.is_converged());
    assert!(sol.variables[0].value >= -10.0);
}

#[test]
fn initial_guess_mode() {
    let _ = pretty_env_logger::try_init();

    let mut tgt = Targeter::new(DiffScheme::Central, 25);
    tgt.set_mode(SolverMode::InitialGuess);
    tgt.add_variable(Variable::new("x", 1.0, 0.0, 20.0, 5.0, 1e-3));
    tgt.add_goal(Goal::new("g", 100.0, 1e-6));
    tgt.initialize().unwrap();

    let mut evals = 0;
    let sol = tgt
        .solve_with(|x| {
            evals += 1;
            vec![5.0 * x[0]]
        })
        .unwrap();

    assert_eq!(evals, 1);
    assert_eq!(sol.status, TargeterStatus::Run);
    assert_eq!(sol.values(), vec![1.0]);
    assert_eq!(sol.achieved, vec![5.0]);
    assert_eq!(sol.achieved_errors, vec![95.0]);
}

#[test]
fn floating_target() {
    let _ = pretty_env_logger::try_init();

    // The desired value depends on the current nominal, as for a moving end point.
    let mut tgt = single(
        DiffScheme::Forward,
        25,
        Variable::new("x", 0.0, -10.0, 10.0, 5.0, 1e-3),
        Goal::new("g", 0.0, 1e-9),
    );
    loop {
        match tgt.advance_state().unwrap() {
            TargeterState::Nominal => {
                tgt.update_goal_target(0, 12.0);
                let x = tgt.variable_values()[0];
                tgt.report_goal_value(0, 3.0 * x);
            }
            TargeterState::Perturbing => {
                // Ignored outside of the nominal run
                tgt.update_goal_target(0, -1.0);
                let x = tgt.variable_values()[0];
                tgt.report_goal_value(0, 3.0 * x);
            }
            TargeterState::Finished => break,
            _ => {}
        }
    }

    assert_eq!(tgt.status(), TargeterStatus::Converged);
    assert_eq!(tgt.goal(0).unwrap().desired_value, 12.0);
    assert_abs_diff_eq!(tgt.variable_values()[0], 4.0, epsilon = 1e-9);
}

#[test]
fn singular_sensitivity_aborts() {
    let _ = pretty_env_logger::try_init();

    let mut tgt = single(
        DiffScheme::Central,
        25,
        Variable::new("x", 1.0, -10.0, 10.0, 5.0, 1e-3),
        Goal::new("g", 3.0, 1e-6),
    );
    // The goal does not depend on the variable
    assert_eq!(
        tgt.solve_with(|_| vec![1.0]),
        Err(TargetingError::SingularJacobian {
            scheme: DiffScheme::Central
        })
    );
    assert!(tgt.is_aborted());
    assert_eq!(tgt.advance_state(), Err(TargetingError::SessionAborted));
    assert_eq!(tgt.variable_values(), vec![1.0]);
}
