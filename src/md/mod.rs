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

pub mod objective;
pub mod opti;
pub mod target_variable;

pub use objective::{Goal, GoalSet};
pub use opti::targeter;
pub use target_variable::{PerturbationDirection, Variable, VariableSet};

pub mod prelude {
    pub use super::objective::{Goal, GoalSet};
    pub use super::opti::config::TargeterConfig;
    pub use super::opti::solution::TargeterSolution;
    pub use super::opti::targeter::{
        Targeter, TargeterAction, TargeterState, TargeterStatus,
    };
    pub use super::opti::{DiffScheme, ReportStyle, SolverMode};
    pub use super::target_variable::{PerturbationDirection, Variable, VariableSet};
    pub use crate::io::ConfigRepr;
    pub use crate::TargetingError;
}
