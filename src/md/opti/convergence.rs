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

use crate::linalg::DVector;
use crate::md::objective::GoalSet;

/// Outcome of a convergence check
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Every goal is within its tolerance
    Converged,
    /// Not converged, and another correction iteration is allowed
    Continue,
    /// Not converged, and the iteration budget is spent
    Exhausted,
}

/// Returns whether every goal is within tolerance of the nominal results
pub fn is_converged(goals: &GoalSet, nominal: &DVector<f64>) -> bool {
    goals
        .iter()
        .zip(nominal.iter())
        .all(|(goal, achieved)| goal.assess_raw(*achieved).0)
}

/// Error of each goal (desired minus achieved)
pub fn residuals(goals: &GoalSet, nominal: &DVector<f64>) -> Vec<f64> {
    goals
        .iter()
        .zip(nominal.iter())
        .map(|(goal, achieved)| goal.assess_raw(*achieved).1)
        .collect()
}

/// Decides whether the targeter has converged, may continue, or has exhausted its iterations.
/// `iterations_taken` is the number of checks performed before this one.
pub fn check(
    goals: &GoalSet,
    nominal: &DVector<f64>,
    iterations_taken: usize,
    max_iterations: usize,
) -> Verdict {
    if is_converged(goals, nominal) {
        Verdict::Converged
    } else if iterations_taken + 1 < max_iterations {
        Verdict::Continue
    } else {
        Verdict::Exhausted
    }
}
