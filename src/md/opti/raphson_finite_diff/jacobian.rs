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

use crate::md::opti::targeter::Targeter;
use crate::md::opti::DiffScheme;
use crate::md::target_variable::PerturbationDirection;

/// Tracks which variable is displaced during the perturbation passes of one iteration.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PerturbationCursor {
    /// Variable currently displaced, if any
    pub current: Option<usize>,
    /// Next variable to displace
    pub next: usize,
    /// Whether the backward half of a central difference pair is being evaluated
    pub backward_half: bool,
    /// Value of the displaced variable before its perturbation
    pub unperturbed: f64,
}

impl Targeter {
    /// Restores the previously displaced variable, if any, and displaces the next one.
    /// Returns false once all of the variables were perturbed for this iteration.
    pub(crate) fn run_perturbation(&mut self) -> bool {
        if let Some(id) = self.cursor.current {
            if let Some(var) = self.variables.get_mut(id) {
                var.value = self.cursor.unperturbed;
            }
        }

        if self.cursor.next >= self.variables.len() {
            self.cursor.current = None;
            return false;
        }

        let scheme = self.scheme;
        let id = self.cursor.next;

        // Central differencing displaces the same variable twice (+ then -) before moving on.
        let backward_half = match scheme {
            DiffScheme::Forward | DiffScheme::Backward => false,
            DiffScheme::Central => self.cursor.current == Some(id) && !self.cursor.backward_half,
        };
        if scheme != DiffScheme::Central || backward_half {
            self.cursor.next += 1;
        }

        let Some(var) = self.variables.get_mut(id) else {
            return false;
        };
        self.cursor.unperturbed = var.value;

        var.direction = match scheme {
            DiffScheme::Forward => PerturbationDirection::Positive,
            DiffScheme::Backward => PerturbationDirection::Negative,
            DiffScheme::Central if backward_half => PerturbationDirection::Negative,
            DiffScheme::Central => PerturbationDirection::Positive,
        };

        let mut candidate = var.value + var.direction.signum() * var.perturbation;

        if !var.check_bounds(candidate).1 {
            match scheme {
                DiffScheme::Central => {
                    warn!(
                        "Targeter -- perturbing {} to {candidate} violates [{}, {}], keeping it for symmetry",
                        var.name, var.min_value, var.max_value
                    );
                }
                DiffScheme::Forward | DiffScheme::Backward => {
                    // Oops, bound was hit, go the other way
                    candidate -= 2.0 * var.direction.signum() * var.perturbation;
                    var.direction = var.direction.flipped();
                    if var.check_bounds(candidate).1 {
                        debug!(
                            "Targeter -- perturbation of {} flipped to {:?} to stay within bounds",
                            var.name, var.direction
                        );
                    } else {
                        warn!(
                            "Targeter -- perturbation of {} violates its bounds in both directions, using {candidate}",
                            var.name
                        );
                    }
                }
            }
        }

        var.value = candidate;
        self.cursor.current = Some(id);
        self.cursor.backward_half = backward_half;
        true
    }

    /// Assembles the Jacobian (variables x goals) from the nominal and perturbed results.
    pub(crate) fn build_jacobian(&mut self) {
        let ngoals = self.goals.len();
        for (i, var) in self.variables.iter().enumerate() {
            for j in 0..ngoals {
                self.jacobian[(i, j)] = match self.scheme {
                    DiffScheme::Forward | DiffScheme::Backward => {
                        (self.achieved[(i, j)] - self.nominal[j])
                            / (var.direction.signum() * var.perturbation)
                    }
                    DiffScheme::Central => {
                        (self.achieved[(i, j)] - self.back_achieved[(i, j)])
                            / (2.0 * var.perturbation)
                    }
                };
            }
        }
        debug!("Jacobian {}", self.jacobian);
    }
}
