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

use crate::errors::{SingularJacobianSnafu, TargetingError};
use crate::linalg::DMatrix;
use crate::md::opti::DiffScheme;
use snafu::ensure;

/// Inverts the provided Jacobian.
///
/// If the matrix is square, this is the exact inverse (LU decomposition). Otherwise, this is the
/// Moore-Penrose pseudo-inverse, which yields the least squares solution for over-determined problems
/// and the minimum norm solution for under-determined problems.
///
/// The `scheme` is only used to describe the failure.
pub fn invert_jacobian(
    jac: &DMatrix<f64>,
    scheme: DiffScheme,
) -> Result<DMatrix<f64>, TargetingError> {
    let inv = if jac.is_square() {
        match jac.clone().try_inverse() {
            Some(inv) => inv,
            None => return SingularJacobianSnafu { scheme }.fail(),
        }
    } else {
        pseudo_inverse!(jac, scheme)?
    };

    // A nearly singular matrix may "invert" into garbage.
    ensure!(
        inv.iter().all(|x| x.is_finite()),
        SingularJacobianSnafu { scheme }
    );

    Ok(inv)
}

/// Returns the single scalar in (0, 1] which scales the whole step such that no component exceeds its maximum step.
/// This preserves the direction of the multivariate step.
pub fn step_multiplier(deltas: &[f64], max_steps: &[f64]) -> f64 {
    deltas
        .iter()
        .zip(max_steps)
        .filter(|(delta, _)| delta.abs() > 0.0)
        .map(|(delta, max_step)| max_step.abs() / delta.abs())
        .fold(1.0_f64, f64::min)
}
