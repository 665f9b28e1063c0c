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

use super::targeter::TargeterStatus;
use crate::md::objective::Goal;
use crate::md::target_variable::Variable;
use serde_derive::Serialize;
use std::fmt;
use std::time::Duration;

/// Defines a targeter solution
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TargeterSolution {
    /// The variables, with their final values
    pub variables: Vec<Variable>,
    /// The goals set in the targeter
    pub goals: Vec<Goal>,
    /// The goal values of the last nominal evaluation
    pub achieved: Vec<f64>,
    /// The errors achieved (desired minus achieved)
    pub achieved_errors: Vec<f64>,
    /// The number of iterations taken
    pub iterations: usize,
    pub status: TargeterStatus,
    /// Computation duration
    pub computation_dur: Duration,
}

impl TargeterSolution {
    /// Final values of the variables, in id order
    pub fn values(&self) -> Vec<f64> {
        self.variables.iter().map(|var| var.value).collect()
    }

    pub fn is_converged(&self) -> bool {
        self.status == TargeterStatus::Converged
    }
}

impl fmt::Display for TargeterSolution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut objmsg = String::from("");
        for (i, goal) in self.goals.iter().enumerate() {
            match self.achieved.get(i) {
                Some(achieved) => objmsg.push_str(&format!(
                    "\n\t\t{} = {:.6} (wanted {:.6} ± {:.1e})",
                    goal.name, achieved, goal.desired_value, goal.tolerance
                )),
                None => objmsg.push_str(&format!("\n\t\t{} = (not evaluated)", goal.name)),
            }
        }

        let mut corrmsg = String::from("Variables:");
        for var in &self.variables {
            corrmsg.push_str(&format!("\n\t\t{} = {:.6}", var.name, var.value));
        }

        write!(
            f,
            "Targeter solution correcting {:?} ({:?} in {:.3} seconds, {} iterations):\n\t{}\n\tAchieved:{}",
            self.variables.iter().map(|v| v.name.clone()).collect::<Vec<String>>(),
            self.status,
            self.computation_dur.as_secs_f64(),
            self.iterations,
            corrmsg,
            objmsg
        )
    }
}
