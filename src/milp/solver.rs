//! MILP solver adapter.
//!
//! `MilpSolver` is the seam between the roster formulation and a concrete
//! solver. The default backend, `MicroLpSolver`, translates a `MilpModel`
//! into a `good_lp` problem solved by the pure-Rust microlp branch and
//! bound.
//!
//! # Time Budget
//! The limit is handed to microlp, which stops its own search on the
//! calling thread and returns the best assignment it has found, tagged
//! `TimedOut`. A registered incumbent seeds the search as a warm start.
//! When the search stops before any assignment is known, the incumbent
//! itself is returned. A zero limit skips the search entirely.

use std::time::{Duration, Instant};

use good_lp::{
    constraint, microlp, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolutionStatus, SolverModel, Variable, WithInitialSolution, WithTimeLimit,
};
use tracing::{info, warn};

use super::{Comparison, LinearExpr, MilpModel, VarKind};
use crate::error::RosterError;

/// Outcome class of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Proven optimal assignment.
    Optimal,
    /// No assignment satisfies every constraint.
    Infeasible,
    /// Objective unbounded below.
    Unbounded,
    /// Budget exhausted; values (if any) are an unproven incumbent.
    TimedOut,
}

/// Limits on a single solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveBudget {
    /// Wall-clock limit (`None` = run to completion).
    pub time_limit: Option<Duration>,
}

impl SolveBudget {
    /// No limit.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Wall-clock limit.
    pub fn with_time_limit(limit: Duration) -> Self {
        Self {
            time_limit: Some(limit),
        }
    }
}

/// Raw solver result.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOutput {
    pub status: SolveStatus,
    /// Value per variable, indexed by `VarId`.
    pub values: Option<Vec<f64>>,
    /// Cost objective reported by the backend, tie-break term removed.
    /// For a fallback incumbent it is the model objective at `values`.
    pub objective_value: Option<f64>,
}

impl SolverOutput {
    fn without_values(status: SolveStatus) -> Self {
        Self {
            status,
            values: None,
            objective_value: None,
        }
    }

    fn from_incumbent(model: &MilpModel, values: Vec<f64>) -> Self {
        let objective_value = model.objective_value(&values);
        Self {
            status: SolveStatus::TimedOut,
            values: Some(values),
            objective_value: Some(objective_value),
        }
    }
}

/// A MILP backend. Implementations must not mutate the model.
pub trait MilpSolver: Send + Sync {
    /// Solves `model` within `budget`.
    ///
    /// # Errors
    /// `RosterError::Solver` when the backend fails for a reason other
    /// than infeasibility, unboundedness or the time budget.
    fn solve(&self, model: &MilpModel, budget: &SolveBudget) -> Result<SolverOutput, RosterError>;

    /// Solver name for logging.
    fn name(&self) -> &str;
}

/// `good_lp` + microlp backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpSolver;

impl MicroLpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl MilpSolver for MicroLpSolver {
    fn solve(&self, model: &MilpModel, budget: &SolveBudget) -> Result<SolverOutput, RosterError> {
        let started = Instant::now();
        info!(
            event = "milp_solve_start",
            solver = self.name(),
            model = model.name(),
            variables = model.var_count(),
            constraints = model.constraint_count(),
            time_limit_ms = budget.time_limit.map(|d| d.as_millis() as u64),
        );

        let output = match budget.time_limit {
            Some(limit) if limit.is_zero() => fallback(model, limit),
            limit => solve_microlp(model, limit)?,
        };

        info!(
            event = "milp_solve_end",
            solver = self.name(),
            status = ?output.status,
            objective = output.objective_value,
            elapsed_ms = started.elapsed().as_millis() as u64,
        );
        Ok(output)
    }

    fn name(&self) -> &str {
        "microlp"
    }
}

/// Output once the time budget is spent without a solver assignment.
fn fallback(model: &MilpModel, limit: Duration) -> SolverOutput {
    warn!(
        event = "milp_time_limit",
        limit_ms = limit.as_millis() as u64,
        has_incumbent = model.incumbent().is_some(),
    );
    match model.incumbent() {
        Some(values) => SolverOutput::from_incumbent(model, values.to_vec()),
        None => SolverOutput::without_values(SolveStatus::TimedOut),
    }
}

fn to_expression(expr: &LinearExpr, vars: &[Variable]) -> Expression {
    let mut e = Expression::from(expr.constant());
    for &(var, coef) in expr.terms() {
        e += vars[var.index()] * coef;
    }
    e
}

/// Translates and solves on the current thread.
fn solve_microlp(model: &MilpModel, limit: Option<Duration>) -> Result<SolverOutput, RosterError> {
    let mut problem_vars = ProblemVariables::new();
    let vars: Vec<Variable> = model
        .vars()
        .iter()
        .map(|spec| {
            let mut def = variable().name(spec.name.clone()).min(spec.lower);
            if let Some(upper) = spec.upper {
                def = def.max(upper);
            }
            if spec.kind == VarKind::Integer {
                def = def.integer();
            }
            problem_vars.add(def)
        })
        .collect();

    let mut objective = to_expression(model.objective(), &vars);
    if let Some(tie_break) = model.tie_break() {
        objective += to_expression(tie_break, &vars);
    }

    let mut problem = problem_vars.minimise(objective).using(microlp);
    if let Some(limit) = limit {
        problem = problem.with_time_limit(limit.as_secs_f64());
    }
    if let Some(incumbent) = model.incumbent() {
        problem = problem.with_initial_solution(vars.iter().copied().zip(incumbent.iter().copied()));
    }
    for row in model.constraints() {
        let lhs = to_expression(&row.expr, &vars);
        let rhs = row.rhs;
        problem = problem.with(match row.cmp {
            Comparison::Le => constraint!(lhs <= rhs),
            Comparison::Ge => constraint!(lhs >= rhs),
            Comparison::Eq => constraint!(lhs == rhs),
        });
    }

    match problem.solve() {
        Ok(solution) => {
            let status = match solution.status() {
                SolutionStatus::Optimal => SolveStatus::Optimal,
                SolutionStatus::TimeLimit | SolutionStatus::GapLimit => SolveStatus::TimedOut,
            };
            let values: Vec<f64> = vars.iter().map(|&v| solution.value(v)).collect();
            let tie_break = model
                .tie_break()
                .map_or(0.0, |t| t.eval(&values) - t.constant());
            // microlp drops the objective constant.
            let objective_value =
                solution.into_inner().objective() + model.objective().constant() - tie_break;
            if status == SolveStatus::TimedOut {
                warn!(event = "milp_time_limit", objective = objective_value, has_incumbent = true);
            }
            Ok(SolverOutput {
                status,
                values: Some(values),
                objective_value: Some(objective_value),
            })
        }
        Err(ResolutionError::Infeasible) => Ok(SolverOutput::without_values(SolveStatus::Infeasible)),
        Err(ResolutionError::Unbounded) => Ok(SolverOutput::without_values(SolveStatus::Unbounded)),
        // microlp reports an interrupted search that found nothing as `Other`.
        Err(ResolutionError::Other(reason)) => match limit {
            Some(limit) => Ok(fallback(model, limit)),
            None => Err(RosterError::Solver(reason.to_string())),
        },
        Err(other) => Err(RosterError::Solver(other.to_string())),
    }
}
