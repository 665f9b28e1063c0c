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

use enum_iterator::Sequence;
use serde_derive::{Deserialize, Serialize};

pub mod config;
pub mod convergence;
/// Uses a [Newton Raphson](https://en.wikipedia.org/wiki/Newton%27s_method_in_optimization) method where the Jacobian is computed via finite differencing.
pub mod raphson_finite_diff;
pub mod solution;
pub mod targeter;

/// Finite differencing scheme used to estimate the Jacobian
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Sequence, Serialize, Deserialize)]
pub enum DiffScheme {
    /// One evaluation per variable, displaced by +perturbation
    #[default]
    #[serde(alias = "ForwardDifference")]
    Forward,
    /// One evaluation per variable, displaced by -perturbation
    #[serde(alias = "BackwardDifference")]
    Backward,
    /// Two evaluations per variable (+ then -), second order accurate
    #[serde(alias = "CentralDifference")]
    Central,
}

impl DiffScheme {
    /// Number of perturbed evaluations needed per variable
    pub fn evals_per_variable(&self) -> usize {
        match self {
            Self::Forward | Self::Backward => 1,
            Self::Central => 2,
        }
    }
}

/// Selects what happens after the nominal evaluation
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverMode {
    /// Iterate until convergence or until the iteration budget is exhausted
    #[default]
    Solve,
    /// Evaluate the initial guess once and stop, used to preview a configuration
    InitialGuess,
}

/// Verbosity of the progress reports
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Sequence, Serialize, Deserialize)]
pub enum ReportStyle {
    /// Iteration count and status only
    Concise,
    /// Also includes the variable values and the goal residuals
    #[default]
    Normal,
    /// Also includes the Jacobian and its inverse
    Verbose,
    /// Also includes the raw perturbation tables
    Debug,
}
