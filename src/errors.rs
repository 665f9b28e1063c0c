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

use crate::io::ConfigError;
use crate::md::opti::DiffScheme;
use crate::md::opti::targeter::TargeterState;
use snafu::prelude::*;

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TargetingError {
    /// No variable was registered before initialization.
    #[snafu(display("the targeter has no variables to vary"))]
    NoVariables,
    /// No goal was registered before initialization.
    #[snafu(display("the targeter has no goals to achieve"))]
    NoGoals,
    /// Goals must be registered with ids matching their registration order.
    #[snafu(display("goal registered with id {got} but expected id {expected}"))]
    GoalRegistrationOrder { expected: usize, got: usize },
    /// Raised if the variables of the problem are incorrectly configured
    #[snafu(display("incorrectly configured variable: {msg}"))]
    VariableError { msg: String },
    #[snafu(display("the targeter must be initialized before advancing its state"))]
    NotInitialized,
    /// The Jacobian (or its normal matrix) is singular.
    #[snafu(display("the Jacobian computed with {scheme:?} differencing is singular"))]
    SingularJacobian { scheme: DiffScheme },
    /// Applying the correction produced a value which cannot be represented.
    #[snafu(display("correction drove {name} to a non-representable value ({value})"))]
    NonRepresentable { name: String, value: f64 },
    /// Probable bug: the state machine entered a state which is never scheduled.
    #[snafu(display("probable bug: targeter entered the {state:?} state"))]
    UnexpectedState { state: TargeterState },
    /// A previous fatal error killed this session.
    #[snafu(display("the targeting session was aborted by a previous error, re-initialize it"))]
    SessionAborted,
    #[snafu(display("unknown targeter action `{action}`"))]
    UnknownAction { action: String },
    #[snafu(display("targeter configuration error: {source}"))]
    Config { source: ConfigError },
}

impl TargetingError {
    /// Returns whether this error was raised while the problem was being configured.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::NoVariables
                | Self::NoGoals
                | Self::GoalRegistrationOrder { .. }
                | Self::VariableError { .. }
                | Self::Config { .. }
        )
    }
}
