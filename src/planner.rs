//! End-to-end roster planning.
//!
//! `RosterPlanner` runs one solve: configuration → problem → model →
//! solver → extracted schedule. Each solve owns its model and shares
//! nothing with other solves, so independent configurations can be
//! solved in parallel with [`RosterPlanner::solve_batch`].
//!
//! # Outcomes
//!
//! | Solver status | Result |
//! |---------------|--------|
//! | Optimal | `Schedule` with status `Optimal` |
//! | TimedOut with incumbent | `Schedule` with status `SubOptimal` |
//! | TimedOut without incumbent | `RosterError::SolverTimeout` |
//! | Infeasible | `RosterError::Infeasible` with demand conflicts |
//! | Unbounded | `ConfigError::UnboundedModel` |

use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::RosterConfig;
use crate::error::{ConfigError, RosterError};
use crate::extract::extract;
use crate::heuristic::GreedyRoster;
use crate::milp::{MicroLpSolver, MilpSolver, RosterModel, RosterModelBuilder, SolveBudget, SolveStatus};
use crate::models::Schedule;
use crate::problem::RosterProblem;
use crate::validation::{diagnose_infeasibility, TOLERANCE};

/// Roster planner over a MILP backend.
///
/// # Example
///
/// ```
/// use care_roster::config::RosterConfig;
/// use care_roster::demand::DemandModel;
/// use care_roster::models::{PerCategory, PerShift, StaffCategory};
/// use care_roster::planner::RosterPlanner;
/// use chrono::NaiveDate;
///
/// let demand = DemandModel::flat(PerCategory::new(
///     PerShift::new(5, 5, 3),
///     PerShift::default(),
///     PerShift::default(),
/// ));
/// let config = RosterConfig::new(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap())
///     .with_horizon_days(1)
///     .with_initial_staff(PerCategory::default())
///     .with_demand(demand);
///
/// let schedule = RosterPlanner::new().solve(&config).unwrap();
/// assert!(schedule.is_optimal());
/// assert_eq!(schedule.total_hired(StaffCategory::Caregiver), 13);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RosterPlanner<S = MicroLpSolver> {
    solver: S,
}

impl RosterPlanner<MicroLpSolver> {
    /// Creates a planner on the default backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: MilpSolver> RosterPlanner<S> {
    /// Creates a planner on a custom backend.
    pub fn with_solver(solver: S) -> Self {
        Self { solver }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Validates a configuration and solves it within its time limit.
    ///
    /// # Errors
    /// `RosterError::Configuration` for invalid input; otherwise see
    /// [`RosterPlanner::solve_problem`].
    pub fn solve(&self, config: &RosterConfig) -> Result<Schedule, RosterError> {
        let problem = config.problem()?;
        let budget = config
            .time_limit()
            .map(SolveBudget::with_time_limit)
            .unwrap_or_default();
        self.solve_problem(&problem, &budget)
    }

    /// Solves a validated problem.
    ///
    /// # Errors
    /// `RosterError::Infeasible`, `RosterError::SolverTimeout`,
    /// `RosterError::Solver`, `RosterError::InternalConsistency`, or
    /// `ConfigError::UnboundedModel` wrapped in `RosterError::Configuration`.
    pub fn solve_problem(
        &self,
        problem: &RosterProblem,
        budget: &SolveBudget,
    ) -> Result<Schedule, RosterError> {
        let started = Instant::now();
        info!(
            event = "solve_start",
            solver = self.solver.name(),
            start_date = %problem.horizon().start(),
            days = problem.days(),
            time_limit_ms = budget.time_limit.map(|d| d.as_millis() as u64),
        );

        let mut built = RosterModelBuilder::new(problem).build();
        if budget.time_limit.is_some() {
            register_incumbent(problem, &mut built);
        }

        let output = self.solver.solve(&built.model, budget)?;
        match output.status {
            SolveStatus::Infeasible => {
                let conflicts = diagnose_infeasibility(problem);
                warn!(event = "solve_infeasible", conflicts = conflicts.len());
                return Err(RosterError::Infeasible { conflicts });
            }
            SolveStatus::Unbounded => {
                warn!(event = "solve_unbounded");
                return Err(ConfigError::UnboundedModel.into());
            }
            SolveStatus::TimedOut if output.values.is_none() => {
                return Err(RosterError::SolverTimeout {
                    budget: budget.time_limit.unwrap_or_default(),
                });
            }
            SolveStatus::TimedOut => {
                warn!(event = "solve_suboptimal", objective = output.objective_value);
            }
            SolveStatus::Optimal => {}
        }

        let schedule = extract(problem, &built, &output)?;
        info!(
            event = "solve_end",
            status = ?schedule.status,
            total_cost = schedule.costs.total,
            elapsed_ms = started.elapsed().as_millis() as u64,
        );
        Ok(schedule)
    }

    /// Solves independent configurations in parallel.
    ///
    /// Results are returned in input order.
    pub fn solve_batch(&self, configs: &[RosterConfig]) -> Vec<Result<Schedule, RosterError>> {
        configs.par_iter().map(|config| self.solve(config)).collect()
    }
}

/// Registers the greedy roster as warm start and fallback for a
/// time-limited solve.
fn register_incumbent(problem: &RosterProblem, built: &mut RosterModel) {
    let Some(greedy) = GreedyRoster::build(problem) else {
        debug!(event = "incumbent_unavailable");
        return;
    };
    let values = greedy.to_values(built);
    let failures = built.model.check_feasible(&values, TOLERANCE);
    if failures.is_empty() {
        debug!(event = "incumbent_registered", objective = built.model.objective_value(&values));
        built.model.set_incumbent(values);
    } else {
        debug!(event = "incumbent_rejected", failures = failures.len());
    }
}
