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

use crate::errors::{NonRepresentableSnafu, TargetingError};
use crate::linalg::DVector;
use crate::md::opti::targeter::Targeter;
use crate::utils::{invert_jacobian, step_multiplier};
use snafu::ensure;

impl Targeter {
    /// Inverts the Jacobian and applies the bounded Newton step to the variables.
    pub(crate) fn apply_correction(&mut self) -> Result<(), TargetingError> {
        // Perform the pseudo-inverse if needed, else just inverse
        let jac_inv = invert_jacobian(&self.jacobian, self.scheme)?;
        debug!("Inverse Jacobian {jac_inv}");

        let err_vector = DVector::from_iterator(
            self.goals.len(),
            self.goals
                .iter()
                .zip(self.nominal.iter())
                .map(|(goal, achieved)| goal.desired_value - achieved),
        );

        // The inverse is (goals x variables), hence the transpose.
        let delta = jac_inv.transpose() * &err_vector;

        debug!(
            "Error vector (norm = {}): {}\nRaw correction: {}",
            err_vector.norm(),
            err_vector,
            delta
        );

        let multiplier = step_multiplier(delta.as_slice(), &self.variables.max_steps());

        // Compute everything first so that a failure leaves the variables untouched.
        let mut corrected = Vec::with_capacity(self.variables.len());
        for (var, delta_i) in self.variables.iter().zip(delta.iter()) {
            let value = var.value + delta_i * multiplier;
            ensure!(
                value.is_finite(),
                NonRepresentableSnafu {
                    name: var.name.clone(),
                    value
                }
            );
            corrected.push(value);
        }

        // NOTE: clamping after scaling may break the proportionality between the variables.
        for (var, mut value) in self.variables.iter_mut().zip(corrected) {
            let (clamped, within) = var.check_bounds(value);
            if !within {
                warn!(
                    "Targeter -- correction of {} to {value} clamped to {clamped}",
                    var.name
                );
                value = clamped;
            }
            var.value = value;
        }

        self.last_delta = delta.iter().copied().collect();
        self.last_multiplier = multiplier;
        self.inverse_jacobian = jac_inv;

        Ok(())
    }
}
