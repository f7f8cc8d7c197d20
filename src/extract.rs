//! Solution extractor.
//!
//! Turns a raw solver assignment into a `Schedule`. Integer variables are
//! rounded after an integrality check, costs are recomputed from the cost
//! model and reconciled with the solver objective, and the schedule is
//! verified against every roster rule before it is published.

use tracing::debug;

use crate::error::RosterError;
use crate::milp::{RosterModel, SolveStatus, SolverOutput, VarId};
use crate::models::{
    CostBreakdown, PerCategory, PoolMovement, Schedule, ScheduleStatus, Shift, ShiftStaffing,
    StaffCategory,
};
use crate::problem::RosterProblem;
use crate::validation::{verify_schedule, TOLERANCE};

/// Builds the schedule of a solver assignment.
///
/// # Errors
/// `RosterError::InternalConsistency` if the output carries no usable
/// assignment, an integer variable is fractional, the recomputed cost
/// disagrees with the solver objective, or the schedule breaks a rule.
pub fn extract(
    problem: &RosterProblem,
    built: &RosterModel,
    output: &SolverOutput,
) -> Result<Schedule, RosterError> {
    let status = match output.status {
        SolveStatus::Optimal => ScheduleStatus::Optimal,
        SolveStatus::TimedOut => ScheduleStatus::SubOptimal,
        other => {
            return Err(RosterError::InternalConsistency(format!(
                "cannot extract a schedule from a {other:?} solve"
            )))
        }
    };
    let values = output.values.as_deref().ok_or_else(|| {
        RosterError::InternalConsistency("solver output carries no assignment".into())
    })?;
    if values.len() != built.model.var_count() {
        return Err(RosterError::InternalConsistency(format!(
            "assignment has {} values for {} variables",
            values.len(),
            built.model.var_count()
        )));
    }

    let reader = Reader { built, values };
    let vars = &built.vars;
    let days = problem.days();
    let costs = problem.costs();

    let mut staffing = Vec::with_capacity(days * Shift::COUNT * StaffCategory::COUNT);
    let mut movements = Vec::with_capacity(days * StaffCategory::COUNT);
    let mut shifts = PerCategory::<f64>::default();
    let mut overtime = PerCategory::<f64>::default();
    let mut hired = PerCategory::<f64>::default();
    let mut fired = PerCategory::<f64>::default();

    for d in 0..days {
        for shift in Shift::ALL {
            for category in StaffCategory::ALL {
                let assigned = reader.integer(vars.assigned(d, shift, category))?;
                let overtime_hours = reader.non_negative(vars.overtime(d, shift, category))?;
                *shifts.get_mut(category) += assigned as f64;
                *overtime.get_mut(category) += overtime_hours;
                staffing.push(ShiftStaffing {
                    day: d,
                    shift,
                    category,
                    demand: problem.demand().get(d, shift, category),
                    assigned,
                    overtime_hours,
                });
            }
        }
        for category in StaffCategory::ALL {
            let movement = PoolMovement {
                day: d,
                category,
                pool: reader.integer(vars.pool(d, category))?,
                hired: reader.integer(vars.hired(d, category))?,
                fired: reader.integer(vars.fired(d, category))?,
            };
            *hired.get_mut(category) += movement.hired as f64;
            *fired.get_mut(category) += movement.fired as f64;
            movements.push(movement);
        }
    }

    let category_costs = PerCategory::from_fn(|c| {
        costs.cost_of(c, *shifts.get(c), *overtime.get(c), *hired.get(c), *fired.get(c))
    });
    let total = category_costs
        .iter()
        .fold(CostBreakdown::default(), |acc, (_, c)| acc + *c);

    let reported = output
        .objective_value
        .unwrap_or_else(|| built.model.objective_value(values));
    let allowed = (TOLERANCE * reported.abs()).max(TOLERANCE);
    if (total.total - reported).abs() > allowed {
        return Err(RosterError::InternalConsistency(format!(
            "recomputed cost {:.6} differs from solver objective {:.6}",
            total.total, reported
        )));
    }

    let mut schedule = Schedule {
        days: problem.horizon().days().to_vec(),
        status,
        feasible: false,
        staffing,
        movements,
        costs: total,
        category_costs,
        objective_value: reported,
    };

    let violations = verify_schedule(problem, &schedule);
    if !violations.is_empty() {
        let listed: Vec<&str> = violations.iter().take(3).map(|v| v.message.as_str()).collect();
        return Err(RosterError::InternalConsistency(format!(
            "solver assignment breaks {} roster rule(s): {}",
            violations.len(),
            listed.join("; ")
        )));
    }
    schedule.feasible = true;

    debug!(
        event = "schedule_extracted",
        status = ?schedule.status,
        total_cost = schedule.costs.total,
        overtime_hours = schedule.total_overtime_hours(),
    );
    Ok(schedule)
}

struct Reader<'a> {
    built: &'a RosterModel,
    values: &'a [f64],
}

impl Reader<'_> {
    fn raw(&self, id: VarId) -> Result<f64, RosterError> {
        let v = self.values[id.index()];
        if !v.is_finite() || v < -TOLERANCE {
            return Err(RosterError::InternalConsistency(format!(
                "{} = {v} is not a valid value",
                self.built.model.var(id).name
            )));
        }
        Ok(v.max(0.0))
    }

    fn integer(&self, id: VarId) -> Result<u32, RosterError> {
        let v = self.raw(id)?;
        let rounded = v.round();
        if (v - rounded).abs() > TOLERANCE || rounded > u32::MAX as f64 {
            return Err(RosterError::InternalConsistency(format!(
                "{} = {v} is not integral",
                self.built.model.var(id).name
            )));
        }
        Ok(rounded as u32)
    }

    fn non_negative(&self, id: VarId) -> Result<f64, RosterError> {
        self.raw(id)
    }
}
