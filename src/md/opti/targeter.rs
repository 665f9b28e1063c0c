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

use super::config::TargeterConfig;
use super::convergence::{self, Verdict};
use super::raphson_finite_diff::PerturbationCursor;
use super::solution::TargeterSolution;
use super::{DiffScheme, ReportStyle, SolverMode};
use crate::errors::{
    ConfigSnafu, NoGoalsSnafu, NoVariablesSnafu, NotInitializedSnafu, SessionAbortedSnafu, TargetingError,
    UnexpectedStateSnafu, UnknownActionSnafu,
};
use crate::linalg::{DMatrix, DVector};
use crate::md::objective::{Goal, GoalSet};
use crate::md::target_variable::{PerturbationDirection, Variable, VariableSet};
use serde_derive::Serialize;
use snafu::{ensure, ResultExt};
use std::fmt;
use std::fmt::Write;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// States of the targeter. The driver runs the evaluation requested by the state returned from [`Targeter::advance_state`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TargeterState {
    /// The session was (re)initialized, nothing to evaluate yet
    Initializing,
    /// The driver must evaluate the goals with the current (unperturbed) variables
    Nominal,
    /// The driver must evaluate the goals with the currently displaced variable
    Perturbing,
    /// All perturbations are available, the correction will be computed. Nothing to evaluate.
    Calculating,
    /// The nominal results will be checked for convergence. Nothing to evaluate.
    CheckingRun,
    /// Never scheduled
    Iterating,
    /// Terminal: check [`Targeter::status`]
    Finished,
}

/// Status of the session, the terminal one must be inspected by the driver
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum TargeterStatus {
    Initialized,
    /// Running, or finished from the initial guess mode without any correction
    Run,
    Converged,
    ExceededIterations,
}

/// Lifecycle actions available to the driver
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TargeterAction {
    /// Re-enter the initializing state with nominal residuals pushed outside of tolerance
    Reset,
    IncrementInstanceCount,
    ResetInstanceCount,
}

impl FromStr for TargeterAction {
    type Err = TargetingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Reset" => Ok(Self::Reset),
            "IncrementInstanceCount" => Ok(Self::IncrementInstanceCount),
            "ResetInstanceCount" => Ok(Self::ResetInstanceCount),
            _ => UnknownActionSnafu { action: s }.fail(),
        }
    }
}

/// The targeter is a differential corrector, driven one phase at a time by an external evaluator.
#[derive(Clone, Debug)]
pub struct Targeter {
    /// Verbosity of the progress reports
    pub report_style: ReportStyle,
    pub(crate) variables: VariableSet,
    pub(crate) goals: GoalSet,
    pub(crate) scheme: DiffScheme,
    pub(crate) mode: SolverMode,
    pub(crate) max_iterations: usize,
    pub(crate) state: TargeterState,
    pub(crate) status: TargeterStatus,
    pub(crate) iterations_taken: usize,
    initialized: bool,
    aborted: bool,
    instance_count: usize,
    /// Goal values of the latest nominal evaluation
    pub(crate) nominal: DVector<f64>,
    /// Goal values when each variable is perturbed (variables x goals)
    pub(crate) achieved: DMatrix<f64>,
    /// Goal values for the backward half of central differencing (variables x goals)
    pub(crate) back_achieved: DMatrix<f64>,
    /// Sensitivity of each goal (columns) to each variable (rows)
    pub(crate) jacobian: DMatrix<f64>,
    /// (Pseudo) inverse of the Jacobian (goals x variables)
    pub(crate) inverse_jacobian: DMatrix<f64>,
    pub(crate) cursor: PerturbationCursor,
    /// Raw Newton step of the latest correction
    pub(crate) last_delta: Vec<f64>,
    /// Scaling applied to the latest raw step
    pub(crate) last_multiplier: f64,
    start_instant: Option<Instant>,
    computation_dur: Duration,
}

impl fmt::Display for Targeter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut objmsg = String::from("");
        for goal in self.goals.iter() {
            objmsg.push_str(&format!(
                "{} = {:.3} (± {:.1e}) ",
                goal.name, goal.desired_value, goal.tolerance
            ));
        }

        write!(
            f,
            "Targeter ({:?} differencing, {} iterations max):\n\tGoals: {}\n\tVary: {:?}",
            self.scheme,
            self.max_iterations,
            objmsg,
            self.variables.iter().map(|v| &v.name).collect::<Vec<_>>()
        )
    }
}

impl Targeter {
    /// Create a new targeter in solve mode, without any variable or goal.
    pub fn new(scheme: DiffScheme, max_iterations: usize) -> Self {
        Self {
            report_style: ReportStyle::default(),
            variables: VariableSet::default(),
            goals: GoalSet::default(),
            scheme,
            mode: SolverMode::Solve,
            max_iterations,
            state: TargeterState::Initializing,
            status: TargeterStatus::Initialized,
            iterations_taken: 0,
            initialized: false,
            aborted: false,
            instance_count: 0,
            nominal: DVector::zeros(0),
            achieved: DMatrix::zeros(0, 0),
            back_achieved: DMatrix::zeros(0, 0),
            jacobian: DMatrix::zeros(0, 0),
            inverse_jacobian: DMatrix::zeros(0, 0),
            cursor: PerturbationCursor::default(),
            last_delta: Vec::new(),
            last_multiplier: 1.0,
            start_instant: None,
            computation_dur: Duration::ZERO,
        }
    }

    /// Builds and initializes a targeter from its configuration.
    pub fn from_config(cfg: TargeterConfig) -> Result<Self, TargetingError> {
        cfg.validate().context(ConfigSnafu)?;
        let mut me = Self::new(cfg.scheme, cfg.max_iterations);
        me.mode = cfg.mode;
        me.report_style = cfg.report_style;
        me.variables = cfg.variables.into();
        me.goals = cfg.goals.into();
        me.initialize()?;
        Ok(me)
    }

    /// Registers a new variable and returns its id. The session must be initialized again.
    pub fn add_variable(&mut self, var: Variable) -> usize {
        self.initialized = false;
        self.variables.push(var)
    }

    /// Registers a new goal and returns its id. The session must be initialized again.
    pub fn add_goal(&mut self, goal: Goal) -> usize {
        self.initialized = false;
        self.goals.push(goal)
    }

    /// Registers a goal under the id the driver will report it with.
    /// An id which does not match the registration order is rejected at initialization.
    pub fn register_goal(&mut self, id: usize, goal: Goal) {
        self.initialized = false;
        self.goals.register(id, goal);
    }

    pub fn set_scheme(&mut self, scheme: DiffScheme) {
        self.initialized = false;
        self.scheme = scheme;
    }

    pub fn set_mode(&mut self, mode: SolverMode) {
        self.initialized = false;
        self.mode = mode;
    }

    pub fn set_max_iterations(&mut self, max_iterations: usize) {
        self.initialized = false;
        self.max_iterations = max_iterations;
    }

    /// Validates the problem and allocates all of the matrices, whose size is now fixed.
    pub fn initialize(&mut self) -> Result<(), TargetingError> {
        if self.variables.is_empty() {
            error!("Targeter -- no variables defined");
            return NoVariablesSnafu.fail();
        }
        if self.goals.is_empty() {
            error!("Targeter -- no goals defined");
            return NoGoalsSnafu.fail();
        }
        self.goals.valid()?;
        self.variables.valid()?;

        let nvars = self.variables.len();
        let ngoals = self.goals.len();

        self.nominal = DVector::zeros(ngoals);
        self.achieved = DMatrix::zeros(nvars, ngoals);
        self.back_achieved = DMatrix::zeros(nvars, ngoals);
        self.jacobian = DMatrix::zeros(nvars, ngoals);
        self.inverse_jacobian = DMatrix::zeros(ngoals, nvars);
        self.cursor = PerturbationCursor::default();
        self.last_delta = vec![0.0; nvars];
        self.last_multiplier = 1.0;

        self.state = TargeterState::Initializing;
        self.status = TargeterStatus::Initialized;
        self.iterations_taken = 0;
        self.aborted = false;
        self.initialized = true;

        debug!("{self}");
        Ok(())
    }

    /// Performs the work of the current state, moves to the next state, and returns it.
    ///
    /// The caller must run the evaluation matching the returned state before calling again:
    /// on [`TargeterState::Nominal`] and [`TargeterState::Perturbing`], evaluate the goals with
    /// [`Targeter::variable_values`] and report them with [`Targeter::report_goal_value`].
    ///
    /// Any error is fatal: the session is aborted until it is initialized again.
    pub fn advance_state(&mut self) -> Result<TargeterState, TargetingError> {
        ensure!(!self.aborted, SessionAbortedSnafu);
        ensure!(self.initialized, NotInitializedSnafu);

        match self.step() {
            Ok(state) => {
                let report = self.progress_report();
                if !report.is_empty() {
                    match state {
                        TargeterState::Perturbing | TargeterState::Calculating => {
                            debug!("{report}")
                        }
                        _ => info!("{report}"),
                    }
                }
                Ok(state)
            }
            Err(e) => {
                self.aborted = true;
                error!("Targeter -- aborted in {:?}: {e}", self.state);
                Err(e)
            }
        }
    }

    fn step(&mut self) -> Result<TargeterState, TargetingError> {
        match self.state {
            TargeterState::Initializing => {
                self.iterations_taken = 0;
                self.status = TargeterStatus::Run;
                self.start_instant = Some(Instant::now());
                self.state = TargeterState::Nominal;
            }
            TargeterState::Nominal => match self.mode {
                SolverMode::InitialGuess => self.finish(),
                SolverMode::Solve => self.state = TargeterState::CheckingRun,
            },
            TargeterState::Perturbing => {
                if !self.run_perturbation() {
                    self.state = TargeterState::Calculating;
                }
            }
            TargeterState::Calculating => {
                self.calculate_parameters()?;
                self.state = TargeterState::Nominal;
            }
            TargeterState::CheckingRun => self.check_completion(),
            TargeterState::Finished => {}
            TargeterState::Iterating => {
                return UnexpectedStateSnafu { state: self.state }.fail();
            }
        }
        Ok(self.state)
    }

    fn check_completion(&mut self) {
        let verdict = convergence::check(
            &self.goals,
            &self.nominal,
            self.iterations_taken,
            self.max_iterations,
        );
        self.iterations_taken += 1;

        match verdict {
            Verdict::Converged => {
                self.status = TargeterStatus::Converged;
                self.finish();
            }
            Verdict::Continue => {
                self.cursor = PerturbationCursor::default();
                self.state = TargeterState::Perturbing;
                self.run_perturbation();
            }
            Verdict::Exhausted => {
                self.status = TargeterStatus::ExceededIterations;
                self.finish();
            }
        }
    }

    fn finish(&mut self) {
        self.state = TargeterState::Finished;
        if let Some(start) = self.start_instant.take() {
            self.computation_dur = Instant::now() - start;
        }
    }

    /// Routes a goal value reported by the driver to the nominal results or to the perturbation tables.
    /// Ignored outside of the nominal and perturbing states.
    pub fn report_goal_value(&mut self, goal_id: usize, value: f64) {
        if goal_id >= self.nominal.len() {
            debug!("Targeter -- ignoring value for unknown goal #{goal_id}");
            return;
        }
        match self.state {
            TargeterState::Nominal => self.nominal[goal_id] = value,
            TargeterState::Perturbing => {
                if let Some(var_id) = self.cursor.current {
                    if self.cursor.backward_half {
                        self.back_achieved[(var_id, goal_id)] = value;
                    } else {
                        self.achieved[(var_id, goal_id)] = value;
                    }
                }
            }
            _ => {
                debug!(
                    "Targeter -- ignoring value for goal #{goal_id} in {:?}",
                    self.state
                )
            }
        }
    }

    /// Updates the desired value of a goal, only possible during the nominal evaluation.
    pub fn update_goal_target(&mut self, goal_id: usize, desired_value: f64) {
        if self.state == TargeterState::Nominal {
            if let Some(goal) = self.goals.get_mut(goal_id) {
                goal.desired_value = desired_value;
            }
        }
    }

    /// Updates the tolerance of a goal, only possible during the nominal evaluation.
    pub fn update_goal_tolerance(&mut self, goal_id: usize, tolerance: f64) {
        if self.state == TargeterState::Nominal {
            if let Some(goal) = self.goals.get_mut(goal_id) {
                goal.tolerance = tolerance;
            }
        }
    }

    pub fn take_action(&mut self, action: TargeterAction) {
        match action {
            TargeterAction::Reset => self.reset(),
            TargeterAction::IncrementInstanceCount => self.instance_count += 1,
            TargeterAction::ResetInstanceCount => self.instance_count = 0,
        }
    }

    /// Forces the session back to initialization so that it retargets when reused in a loop.
    /// The nominal residuals are seeded outside of tolerance so that reuse can never report a stale convergence.
    pub fn reset(&mut self) {
        if let Some(var_id) = self.cursor.current {
            if let Some(var) = self.variables.get_mut(var_id) {
                var.value = self.cursor.unperturbed;
            }
        }
        self.cursor = PerturbationCursor::default();
        for (j, goal) in self.goals.iter().enumerate() {
            if let Some(nominal) = self.nominal.get_mut(j) {
                let offset = if goal.tolerance.abs() > 0.0 {
                    10.0 * goal.tolerance.abs()
                } else {
                    1.0
                };
                *nominal = goal.desired_value + offset;
            }
        }
        self.state = TargeterState::Initializing;
        self.status = TargeterStatus::Initialized;
        self.start_instant = None;
    }

    pub fn state(&self) -> TargeterState {
        self.state
    }

    pub fn status(&self) -> TargeterStatus {
        self.status
    }

    pub fn scheme(&self) -> DiffScheme {
        self.scheme
    }

    pub fn mode(&self) -> SolverMode {
        self.mode
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn iterations_taken(&self) -> usize {
        self.iterations_taken
    }

    pub fn instance_count(&self) -> usize {
        self.instance_count
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Current values of the variables, to be applied by the driver before each evaluation
    pub fn variable_values(&self) -> Vec<f64> {
        self.variables.values()
    }

    pub fn variable(&self, id: usize) -> Option<&Variable> {
        self.variables.get(id)
    }

    pub fn variables(&self) -> &VariableSet {
        &self.variables
    }

    pub fn goal(&self, id: usize) -> Option<&Goal> {
        self.goals.get(id)
    }

    pub fn goals(&self) -> &GoalSet {
        &self.goals
    }

    pub fn nominal(&self) -> &DVector<f64> {
        &self.nominal
    }

    pub fn achieved(&self) -> &DMatrix<f64> {
        &self.achieved
    }

    pub fn back_achieved(&self) -> &DMatrix<f64> {
        &self.back_achieved
    }

    pub fn jacobian(&self) -> &DMatrix<f64> {
        &self.jacobian
    }

    pub fn inverse_jacobian(&self) -> &DMatrix<f64> {
        &self.inverse_jacobian
    }

    /// Raw Newton step and the multiplier applied to it in the latest correction
    pub fn last_step(&self) -> (&[f64], f64) {
        (&self.last_delta, self.last_multiplier)
    }

    /// The variable currently displaced and the direction of its displacement
    pub fn perturbing_variable(&self) -> Option<(usize, PerturbationDirection)> {
        self.cursor
            .current
            .map(|id| (id, self.variables[id].direction))
    }

    pub fn computation_dur(&self) -> Duration {
        self.computation_dur
    }

    /// Snapshot of the session, meaningful once finished
    pub fn solution(&self) -> TargeterSolution {
        let achieved = self.nominal.iter().copied().collect::<Vec<f64>>();
        let achieved_errors = convergence::residuals(&self.goals, &self.nominal);
        TargeterSolution {
            variables: self.variables.iter().cloned().collect(),
            goals: self.goals.iter().cloned().collect(),
            achieved,
            achieved_errors,
            iterations: self.iterations_taken,
            status: self.status,
            computation_dur: self.computation_dur,
        }
    }

    /// Human readable progress for the current state, with a level of detail set by the report style.
    pub fn progress_report(&self) -> String {
        let mut msg = String::new();
        match self.state {
            TargeterState::Initializing => {
                let _ = write!(
                    msg,
                    "Targeter -- initialized with {} variable(s) and {} goal(s), {:?} differencing, at most {} iterations",
                    self.variables.len(),
                    self.goals.len(),
                    self.scheme,
                    self.max_iterations
                );
            }
            TargeterState::Nominal => {
                let _ = write!(
                    msg,
                    "Targeter -- Iteration #{} -- nominal run",
                    self.iterations_taken
                );
                if self.report_style >= ReportStyle::Normal {
                    self.write_variables(&mut msg);
                }
                if self.report_style >= ReportStyle::Verbose && self.iterations_taken > 0 {
                    let (delta, mult) = self.last_step();
                    let _ = write!(msg, "\n\tRaw correction: {delta:?} (scaled by {mult})");
                }
            }
            TargeterState::Perturbing => {
                if let Some((id, dir)) = self.perturbing_variable() {
                    let var = &self.variables[id];
                    let _ = write!(
                        msg,
                        "Targeter -- Iteration #{} -- perturbing {} to {} ({dir:?})",
                        self.iterations_taken, var.name, var.value
                    );
                }
            }
            TargeterState::Calculating => {
                let _ = write!(
                    msg,
                    "Targeter -- Iteration #{} -- computing correction",
                    self.iterations_taken
                );
                if self.report_style >= ReportStyle::Debug {
                    let _ = write!(msg, "\n\tAchieved {}", self.achieved);
                    if self.scheme == DiffScheme::Central {
                        let _ = write!(msg, "\tBack achieved {}", self.back_achieved);
                    }
                }
            }
            TargeterState::CheckingRun => {
                let _ = write!(
                    msg,
                    "Targeter -- Iteration #{} -- checking convergence",
                    self.iterations_taken
                );
                if self.report_style >= ReportStyle::Normal {
                    self.write_goals(&mut msg);
                }
            }
            TargeterState::Iterating => {}
            TargeterState::Finished => {
                let _ = match self.status {
                    TargeterStatus::Converged if self.iterations_taken == 1 => {
                        write!(msg, "Targeter -- CONVERGED in 1 iteration")
                    }
                    TargeterStatus::Converged => write!(
                        msg,
                        "Targeter -- CONVERGED in {} iterations",
                        self.iterations_taken
                    ),
                    TargeterStatus::ExceededIterations => write!(
                        msg,
                        "Targeter -- FAILED to converge in {} iterations",
                        self.iterations_taken
                    ),
                    TargeterStatus::Run | TargeterStatus::Initialized => {
                        write!(msg, "Targeter -- initial guess run completed")
                    }
                };
                if self.report_style >= ReportStyle::Normal {
                    self.write_variables(&mut msg);
                    self.write_goals(&mut msg);
                }
            }
        }

        if self.report_style >= ReportStyle::Verbose
            && matches!(
                self.state,
                TargeterState::Nominal | TargeterState::Finished
            )
            && self.iterations_taken > 0
            && self.status != TargeterStatus::Converged
        {
            let _ = write!(
                msg,
                "\n\tJacobian {}\tInverse Jacobian {}",
                self.jacobian, self.inverse_jacobian
            );
        }

        msg
    }

    fn write_variables(&self, msg: &mut String) {
        for var in self.variables.iter() {
            let _ = write!(msg, "\n\t{} = {}", var.name, var.value);
        }
    }

    fn write_goals(&self, msg: &mut String) {
        let prec = self
            .goals
            .iter()
            .map(|goal| {
                if goal.tolerance > 0.0 {
                    goal.tolerance.log10().abs().ceil() as usize
                } else {
                    6
                }
            })
            .max()
            .unwrap_or(3)
            .min(12);

        // Goals added after initialization have no nominal value yet
        for (goal, achieved) in self.goals.iter().zip(self.nominal.iter().copied()) {
            let (_, err) = goal.assess_raw(achieved);
            let _ = write!(
                msg,
                "\n\t{}: achieved = {:.prec$}\t desired = {:.prec$}\t error = {:.prec$}",
                goal.name, achieved, goal.desired_value, err
            );
        }
    }
}
