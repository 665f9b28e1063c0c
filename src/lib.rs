/*
    Nyx, blazing fast astrodynamics
    Copyright (C) 2018-onwards Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

/*! # nyx-targeter

A differential corrector for black-box targeting: the goals are only observable by running an expensive
evaluation (e.g. a full trajectory propagation), so the Jacobian is estimated by finite differencing
between repeated evaluations and the variables are corrected with a bounded Newton-Raphson step.

The corrector never runs the evaluation itself. An external driver calls [`md::prelude::Targeter::advance_state`],
runs whatever evaluation the returned state asks for, reports the goal values back, and calls again.

```
use nyx_targeter::md::prelude::*;

let mut tgt = Targeter::new(DiffScheme::Forward, 25);
tgt.add_variable(Variable::new("x", 10.0, 0.0, 20.0, 5.0, 1e-3));
tgt.add_goal(Goal::new("g", 100.0, 1e-6));
tgt.initialize().unwrap();

let sol = tgt.solve_with(|x| vec![5.0 * x[0]]).unwrap();
assert_eq!(sol.status, TargeterStatus::Converged);
```
*/

/// Computes the Moore-Penrose pseudo-inverse of a dynamically sized matrix through its normal equations.
/// Returns `Err(TargetingError::SingularJacobian)` if the normal matrix cannot be inverted.
macro_rules! pseudo_inverse {
    ($mat:expr, $scheme:expr) => {{
        use crate::errors::SingularJacobianSnafu;
        let (rows, cols) = $mat.shape();
        if rows < cols {
            match ($mat * $mat.transpose()).try_inverse() {
                Some(m1_inv) => Ok($mat.transpose() * m1_inv),
                None => SingularJacobianSnafu { scheme: $scheme }.fail(),
            }
        } else {
            match ($mat.transpose() * $mat).try_inverse() {
                Some(m2_inv) => Ok(m2_inv * $mat.transpose()),
                None => SingularJacobianSnafu { scheme: $scheme }.fail(),
            }
        }
    }};
}

/// Linear algebra operations needed by the corrector (inversion and step scaling).
pub mod utils;

mod errors;
/// Targeting will (almost) never panic and functions which may fail will return an error.
pub use self::errors::TargetingError;

/// Configuration loading.
pub mod io;

/// All of the mission design targeting tools.
pub mod md;

#[macro_use]
extern crate log;
extern crate nalgebra as na;

/// Re-export nalgebra
pub mod linalg {
    pub use na::base::*;
}
