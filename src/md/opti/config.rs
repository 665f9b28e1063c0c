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

use super::targeter::Targeter;
use super::{DiffScheme, ReportStyle, SolverMode};
use crate::errors::{ConfigSnafu, TargetingError};
use crate::io::{ConfigError, ConfigRepr, InvalidConfigSnafu};
use crate::md::objective::Goal;
use crate::md::target_variable::Variable;
use serde_derive::{Deserialize, Serialize};
use snafu::{ensure, ResultExt};
use std::path::Path;
use typed_builder::TypedBuilder;

fn default_max_iterations() -> usize {
    25
}

/// Full description of a targeting problem, which may be loaded from YAML.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
pub struct TargeterConfig {
    /// Maximum number of nominal evaluations checked for convergence
    #[builder(default = 25)]
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[builder(default)]
    #[serde(default)]
    pub scheme: DiffScheme,
    #[builder(default)]
    #[serde(default)]
    pub mode: SolverMode,
    #[builder(default)]
    #[serde(default)]
    pub report_style: ReportStyle,
    #[builder(default)]
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[builder(default)]
    #[serde(default)]
    pub goals: Vec<Goal>,
}

impl ConfigRepr for TargeterConfig {}

impl TargeterConfig {
    /// Checks the settings which the targeter itself does not validate at initialization.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure!(
            self.max_iterations > 0,
            InvalidConfigSnafu {
                msg: "max_iterations must be at least one"
            }
        );
        Ok(())
    }
}

impl Default for TargeterConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Targeter {
    /// Loads a targeter from a YAML configuration file and initializes it.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, TargetingError> {
        let cfg = TargeterConfig::load(path).context(ConfigSnafu)?;
        Self::from_config(cfg)
    }

    /// Returns the configuration of this targeter, with the current variable values as initial guesses.
    pub fn to_config(&self) -> TargeterConfig {
        TargeterConfig {
            max_iterations: self.max_iterations,
            scheme: self.scheme,
            mode: self.mode,
            report_style: self.report_style,
            variables: self.variables.iter().cloned().collect(),
            goals: self.goals.iter().cloned().collect(),
        }
    }
}
