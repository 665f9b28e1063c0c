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

use crate::errors::{TargetingError, VariableSnafu};
use serde_derive::{Deserialize, Serialize};
use std::default::Default;
use std::fmt;
use std::ops::Index;

/// Sign of the displacement applied to a variable when it is perturbed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerturbationDirection {
    #[default]
    Positive,
    Negative,
}

impl PerturbationDirection {
    pub fn signum(&self) -> f64 {
        match self {
            Self::Positive => 1.0,
            Self::Negative => -1.0,
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }
}

/// A free parameter which the targeter may adjust, bounded and step-limited.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Variable {
    pub name: String,
    /// The current value of this variable, which the driver must apply before each evaluation
    pub value: f64,
    /// The absolute minimum value this parameter can ever have
    pub min_value: f64,
    /// The absolute maximum value this parameter can ever have
    pub max_value: f64,
    /// The maximum step this variable may have between each iteration
    pub max_step: f64,
    /// The perturbation for the finite differencing algorithm
    pub perturbation: f64,
    /// Direction of the latest perturbation, which may be flipped to stay within bounds
    #[serde(skip)]
    pub direction: PerturbationDirection,
}

impl Variable {
    pub fn new(
        name: &str,
        value: f64,
        min_value: f64,
        max_value: f64,
        max_step: f64,
        perturbation: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            value,
            min_value,
            max_value,
            max_step,
            perturbation,
            direction: PerturbationDirection::Positive,
        }
    }

    /// Returns whether the configuration of this variable is valid
    pub fn valid(&self) -> Result<(), TargetingError> {
        if self.min_value > self.max_value {
            let msg = format!(
                "{}: min value is greater than max value: {} > {}",
                self.name, self.min_value, self.max_value
            );
            error!("{msg}");
            return VariableSnafu { msg }.fail();
        }
        if self.max_step.is_nan() || self.max_step <= 0.0 {
            let msg = format!("{}: max step must be positive: {}", self.name, self.max_step);
            error!("{msg}");
            return VariableSnafu { msg }.fail();
        }
        if !self.perturbation.is_finite() || self.perturbation == 0.0 {
            let msg = format!(
                "{}: perturbation must be finite and non-zero: {}",
                self.name, self.perturbation
            );
            error!("{msg}");
            return VariableSnafu { msg }.fail();
        }
        if !self.value.is_finite() || !self.check_bounds(self.value).1 {
            let msg = format!(
                "{}: initial value {} outside of [{}, {}]",
                self.name, self.value, self.min_value, self.max_value
            );
            error!("{msg}");
            return VariableSnafu { msg }.fail();
        }
        Ok(())
    }

    /// Returns the input value unless it is out of bounds, then it returns the bound, and whether the input value was OK
    pub fn check_bounds(&self, val: f64) -> (f64, bool) {
        if val > self.max_value {
            (self.max_value, false)
        } else if val < self.min_value {
            (self.min_value, false)
        } else {
            (val, true)
        }
    }
}

impl Default for Variable {
    fn default() -> Self {
        Self {
            name: String::new(),
            value: 0.0,
            min_value: -5.0,
            max_value: 5.0,
            max_step: 0.2,
            perturbation: 0.0001,
            direction: PerturbationDirection::Positive,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} = {} ∈ [{}, {}] (max step {}, pert {:e})",
            self.name, self.value, self.min_value, self.max_value, self.max_step, self.perturbation
        )
    }
}

/// Owns the variables of a targeting session, indexed by the id assigned at registration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariableSet {
    variables: Vec<Variable>,
}

impl VariableSet {
    /// Registers a new variable and returns its id
    pub fn push(&mut self, var: Variable) -> usize {
        self.variables.push(var);
        self.variables.len() - 1
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Variable> {
        self.variables.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Variable> {
        self.variables.iter_mut()
    }

    pub fn get(&self, id: usize) -> Option<&Variable> {
        self.variables.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: usize) -> Option<&mut Variable> {
        self.variables.get_mut(id)
    }

    /// Current values of all variables, in id order
    pub fn values(&self) -> Vec<f64> {
        self.variables.iter().map(|var| var.value).collect()
    }

    pub fn max_steps(&self) -> Vec<f64> {
        self.variables.iter().map(|var| var.max_step).collect()
    }

    pub fn valid(&self) -> Result<(), TargetingError> {
        self.variables.iter().try_for_each(|var| var.valid())
    }
}

impl Index<usize> for VariableSet {
    type Output = Variable;

    fn index(&self, id: usize) -> &Self::Output {
        &self.variables[id]
    }
}

impl From<Vec<Variable>> for VariableSet {
    fn from(variables: Vec<Variable>) -> Self {
        Self { variables }
    }
}
