use super::{first_sensitivity, single};
use approx::assert_abs_diff_eq;
use enum_iterator::all;
use nyx_targeter::md::prelude::*;
use rstest::*;

#[test]
fn sensitivity_sign_all_schemes() {
    let _ = pretty_env_logger::try_init();

    for scheme in all::<DiffScheme>() {
        // Increasing response
        let mut tgt = single(
            scheme,
            10,
            Variable::new("x", 1.0, -10.0, 10.0, 1.0, 1e-3),
            Goal::new("g", 100.0, 1e-6),
        );
        let slope = first_sensitivity(&mut tgt, |x| x.powi(3) + x);
        assert!(slope > 0.0, "{scheme:?}: {slope}");
        assert_abs_diff_eq!(slope, 4.0, epsilon = 1e-2);

        // Decreasing response
        let mut tgt = single(
            scheme,
            10,
            Variable::new("x", 1.0, -10.0, 10.0, 1.0, 1e-3),
            Goal::new("g", 100.0, 1e-6),
        );
        let slope = first_sensitivity(&mut tgt, |x| -2.0 * x + (-x).exp());
        assert!(slope < 0.0, "{scheme:?}: {slope}");
    }
}

#[rstest]
#[case(DiffScheme::Forward)]
#[case(DiffScheme::Backward)]
fn sensitivity_sign_on_bounds(#[case] scheme: DiffScheme) {
    let _ = pretty_env_logger::try_init();

    // On the maximum, the forward perturbation must flip and keep the correct sign
    let mut tgt = single(
        scheme,
        10,
        Variable::new("x", 2.0, 0.0, 2.0, 1.0, 1e-2),
        Goal::new("g", 0.0, 1e-6),
    );
    let slope = first_sensitivity(&mut tgt, |x| 3.0 * x);
    assert_abs_diff_eq!(slope, 3.0, epsilon = 1e-9);

    // Same on the minimum
    let mut tgt = single(
        scheme,
        10,
        Variable::new("x", 0.0, 0.0, 2.0, 1.0, 1e-2),
        Goal::new("g", 10.0, 1e-6),
    );
    let slope = first_sensitivity(&mut tgt, |x| -3.0 * x);
    assert_abs_diff_eq!(slope, -3.0, epsilon = 1e-9);
}

#[rstest]
#[case(DiffScheme::Forward)]
#[case(DiffScheme::Backward)]
#[case(DiffScheme::Central)]
fn linear_slope(#[case] scheme: DiffScheme) {
    let _ = pretty_env_logger::try_init();

    let mut tgt = single(
        scheme,
        10,
        Variable::new("x", 3.0, -10.0, 10.0, 5.0, 0.01),
        Goal::new("g", 100.0, 1e-6),
    );
    let slope = first_sensitivity(&mut tgt, |x| 2.0 * x + 1.0);
    assert_abs_diff_eq!(slope, 2.0, epsilon = 1e-9);
}

#[test]
fn central_is_more_accurate() {
    let _ = pretty_env_logger::try_init();

    // g = x^2 at x = 1: the true slope is 2, the one sided error is exactly the perturbation.
    for pert in [0.1, 0.01] {
        let mut errors = Vec::new();
        for scheme in all::<DiffScheme>() {
            let mut tgt = single(
                scheme,
                10,
                Variable::new("x", 1.0, -10.0, 10.0, 5.0, pert),
                Goal::new("g", 100.0, 1e-6),
            );
            let slope = first_sensitivity(&mut tgt, |x| x * x);
            errors.push((scheme, (slope - 2.0).abs()));
        }

        for (scheme, err) in errors {
            match scheme {
                DiffScheme::Central => assert!(err < 1e-9, "{err}"),
                DiffScheme::Forward | DiffScheme::Backward => {
                    assert_abs_diff_eq!(err, pert, epsilon = 1e-9)
                }
            }
        }
    }
}

#[rstest]
#[case(DiffScheme::Forward, 1)]
#[case(DiffScheme::Backward, 1)]
#[case(DiffScheme::Central, 2)]
fn evaluations_per_iteration(#[case] scheme: DiffScheme, #[case] per_var: usize) {
    let _ = pretty_env_logger::try_init();

    // g = 5 x is linear: one correction lands on the solution.
    let mut tgt = single(
        scheme,
        10,
        Variable::new("x", 2.0, -20.0, 20.0, 50.0, 1e-3),
        Goal::new("g", 50.0, 1e-6),
    );
    let mut evals = 0;
    let sol = tgt
        .solve_with(|x| {
            evals += 1;
            vec![5.0 * x[0]]
        })
        .unwrap();

    assert!(sol.is_converged());
    assert_eq!(sol.iterations, 2);
    assert_eq!(scheme.evals_per_variable(), per_var);
    // Two nominal runs and one set of perturbations
    assert_eq!(evals, 2 + per_var);
    assert_abs_diff_eq!(sol.values()[0], 10.0, epsilon = 1e-9);
}
