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

mod correction;
mod jacobian;

pub use jacobian::PerturbationCursor;

use super::solution::TargeterSolution;
use super::targeter::{Targeter, TargeterState};
use crate::errors::TargetingError;

impl Targeter {
    /// Differential correction using finite differencing: builds the Jacobian from this iteration's
    /// perturbations, and applies the Newton step.
    pub(crate) fn calculate_parameters(&mut self) -> Result<(), TargetingError> {
        self.build_jacobian();
        self.apply_correction()
    }

    /// Drives this targeter until it finishes, evaluating the goals with the provided function.
    ///
    /// The function receives the current variable values and must return one value per goal, in goal id order.
    /// This is the simplest driver of the cooperative interface, useful when the black box is an in-process function.
    pub fn solve_with<F>(&mut self, mut evaluate: F) -> Result<TargeterSolution, TargetingError>
    where
        F: FnMut(&[f64]) -> Vec<f64>,
    {
        loop {
            match self.advance_state()? {
                TargeterState::Nominal | TargeterState::Perturbing => {
                    let achieved = evaluate(&self.variable_values());
                    for (goal_id, value) in achieved.into_iter().enumerate() {
                        self.report_goal_value(goal_id, value);
                    }
                }
                TargeterState::Finished => {
                    let sol = self.solution();
                    info!("{sol}");
                    return Ok(sol);
                }
                TargeterState::Initializing
                | TargeterState::Calculating
                | TargeterState::CheckingRun
                | TargeterState::Iterating => {}
            }
        }
    }
}
