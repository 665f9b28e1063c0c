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

use crate::errors::{GoalRegistrationOrderSnafu, TargetingError};
use serde_derive::{Deserialize, Serialize};
use snafu::ensure;
use std::fmt;
use std::ops::Index;

/// A scalar quantity observed from the black-box evaluation which must reach its desired value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub name: String,
    /// The desired value, must be in the same units as the evaluated quantity
    pub desired_value: f64,
    /// The precision on the desired value
    pub tolerance: f64,
}

impl Goal {
    pub fn new(name: &str, desired_value: f64, tolerance: f64) -> Self {
        Self {
            name: name.to_string(),
            desired_value,
            tolerance,
        }
    }

    /// Returns whether this goal has been achieved, and the associated error (desired minus achieved).
    pub fn assess_raw(&self, achieved: f64) -> (bool, f64) {
        let param_err = self.desired_value - achieved;

        (param_err.abs() <= self.tolerance, param_err)
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "\t{:x}", self)
    }
}

impl fmt::LowerHex for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        let max_obj_tol = if self.tolerance > 0.0 {
            (self.tolerance.log10().abs().ceil() as usize).min(12)
        } else {
            6
        };

        write!(
            f,
            "{} → {:.prec$} ",
            self.name,
            self.desired_value,
            prec = max_obj_tol
        )?;

        if self.tolerance.abs() < 1e-1 {
            write!(f, "(± {:.1e})", self.tolerance)
        } else {
            write!(f, " (± {:.2})", self.tolerance)
        }
    }
}

/// Owns the goals of a targeting session, indexed by the id assigned at registration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GoalSet {
    goals: Vec<Goal>,
    /// Ids claimed by the collaborator at registration time, checked at initialization
    claimed_ids: Vec<usize>,
}

impl GoalSet {
    /// Registers a new goal and returns its id
    pub fn push(&mut self, goal: Goal) -> usize {
        let id = self.goals.len();
        self.register(id, goal);
        id
    }

    /// Registers a goal under an id chosen by the caller.
    /// Ids must follow the registration order, which is only verified by [`GoalSet::valid`].
    pub fn register(&mut self, id: usize, goal: Goal) {
        self.goals.push(goal);
        self.claimed_ids.push(id);
    }

    /// Ensures that every goal was registered under the id matching its position
    pub fn valid(&self) -> Result<(), TargetingError> {
        for (expected, got) in self.claimed_ids.iter().copied().enumerate() {
            ensure!(
                expected == got,
                GoalRegistrationOrderSnafu { expected, got }
            );
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Goal> {
        self.goals.iter()
    }

    pub fn get(&self, id: usize) -> Option<&Goal> {
        self.goals.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: usize) -> Option<&mut Goal> {
        self.goals.get_mut(id)
    }
}

impl Index<usize> for GoalSet {
    type Output = Goal;

    fn index(&self, id: usize) -> &Self::Output {
        &self.goals[id]
    }
}

impl From<Vec<Goal>> for GoalSet {
    fn from(goals: Vec<Goal>) -> Self {
        let claimed_ids = (0..goals.len()).collect();
        Self { goals, claimed_ids }
    }
}
