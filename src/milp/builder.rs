//! Roster constraint builder.
//!
//! Translates a `RosterProblem` into a `MilpModel`.
//!
//! # Variables
//! Per (day, shift, category): `assigned` (integer head count) and
//! `overtime` (continuous hours). Per (day, category): `pool` (staff on
//! the books), `hired`, `fired` (integers).
//!
//! # Constraints
//! | Family | Row |
//! |--------|-----|
//! | Coverage | `assigned[d,s,c] >= demand[d,s,c]` |
//! | WeeklyCap | `7 Σ_W assigned <= k Σ_W pool` per full 7-day window |
//! | ContractHours | `h Σ_W assigned <= (H_c / 7) Σ_W pool + Σ_W overtime` |
//! | RestPeriod | `assigned[d-1,s] + assigned[d,s'] <= pool[d]` for short-gap pairs |
//! | ShiftDistribution | `Σ_c night <= Σ_c (morning + evening)` per day |
//! | OvertimeEligibility | `overtime = 0` for barred categories |
//! | OvertimeLimit | `overtime <= h × assigned` otherwise |
//! | DailyPool | `Σ_s assigned[d,s,c] <= pool[d,c]` |
//! | Continuity | `pool[d] = pool[d-1] + hired[d] - fired[d]`, `pool[-1]` = initial staff |
//! | HiringLimit | `hired[d,c] <= max_daily_hires[c]` |
//! | HeadcountLimit | `pool[d,c] <= max_headcount[c]` |
//!
//! # Objective
//! `Σ regular_rate × assigned + Σ overtime_rate × overtime
//!  + Σ hire_cost × hired + Σ fire_cost × fired`

use tracing::debug;

use super::{Comparison, ConstraintFamily, LinearExpr, MilpModel, VarId, VarSpec};
use crate::config::TieBreak;
use crate::models::{Shift, StaffCategory};
use crate::problem::{RosterProblem, WEEK_DAYS};

/// Weight of the head-count tie-break term. Small enough that it never
/// outweighs a real cost difference between rosters.
pub const TIE_BREAK_WEIGHT: f64 = 1e-4;

/// Variable handles of a roster model.
#[derive(Debug, Clone)]
pub struct RosterVariables {
    days: usize,
    assigned: Vec<VarId>,
    overtime: Vec<VarId>,
    pool: Vec<VarId>,
    hired: Vec<VarId>,
    fired: Vec<VarId>,
}

#[inline]
fn cell(day: usize, shift: Shift, category: StaffCategory) -> usize {
    (day * Shift::COUNT + shift.index()) * StaffCategory::COUNT + category.index()
}

#[inline]
fn day_cell(day: usize, category: StaffCategory) -> usize {
    day * StaffCategory::COUNT + category.index()
}

impl RosterVariables {
    /// Number of days covered.
    pub fn days(&self) -> usize {
        self.days
    }

    #[inline]
    pub fn assigned(&self, day: usize, shift: Shift, category: StaffCategory) -> VarId {
        self.assigned[cell(day, shift, category)]
    }

    #[inline]
    pub fn overtime(&self, day: usize, shift: Shift, category: StaffCategory) -> VarId {
        self.overtime[cell(day, shift, category)]
    }

    #[inline]
    pub fn pool(&self, day: usize, category: StaffCategory) -> VarId {
        self.pool[day_cell(day, category)]
    }

    #[inline]
    pub fn hired(&self, day: usize, category: StaffCategory) -> VarId {
        self.hired[day_cell(day, category)]
    }

    #[inline]
    pub fn fired(&self, day: usize, category: StaffCategory) -> VarId {
        self.fired[day_cell(day, category)]
    }
}

/// A built roster model with its variable handles.
#[derive(Debug, Clone)]
pub struct RosterModel {
    pub model: MilpModel,
    pub vars: RosterVariables,
}

/// Builds the roster MILP from a problem.
///
/// # Example
/// ```
/// use care_roster::config::RosterConfig;
/// use care_roster::milp::RosterModelBuilder;
/// use chrono::NaiveDate;
///
/// let config = RosterConfig::new(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap())
///     .with_horizon_days(7);
/// let problem = config.problem().unwrap();
/// let built = RosterModelBuilder::new(&problem).build();
///
/// // 7 days × 3 shifts × 3 categories coverage rows
/// assert_eq!(built.model.count_by_family(care_roster::milp::ConstraintFamily::Coverage), 63);
/// ```
pub struct RosterModelBuilder<'a> {
    problem: &'a RosterProblem,
}

impl<'a> RosterModelBuilder<'a> {
    /// Creates a builder.
    pub fn new(problem: &'a RosterProblem) -> Self {
        Self { problem }
    }

    /// Builds the model: variables, every constraint family, objective.
    pub fn build(&self) -> RosterModel {
        let mut model = MilpModel::new("care_roster");
        let vars = self.add_variables(&mut model);

        self.add_coverage(&mut model, &vars);
        self.add_weekly_limits(&mut model, &vars);
        self.add_rest_periods(&mut model, &vars);
        self.add_shift_distribution(&mut model, &vars);
        self.add_overtime_rules(&mut model, &vars);
        self.add_pool_rules(&mut model, &vars);
        self.add_staffing_limits(&mut model, &vars);

        model.set_objective(self.cost_objective(&vars));
        if self.problem.tie_break() == TieBreak::MinimizeHeadcount {
            let mut headcount = LinearExpr::new();
            for &p in &vars.pool {
                headcount.add_term(p, TIE_BREAK_WEIGHT);
            }
            model.set_tie_break(headcount);
        }

        debug!(
            event = "model_built",
            variables = model.var_count(),
            constraints = model.constraint_count(),
            days = vars.days,
        );
        for family in ConstraintFamily::ALL {
            debug!(family = %family, rows = model.count_by_family(family));
        }

        RosterModel { model, vars }
    }

    fn add_variables(&self, model: &mut MilpModel) -> RosterVariables {
        let days = self.problem.days();
        let cells = days * Shift::COUNT * StaffCategory::COUNT;
        let day_cells = days * StaffCategory::COUNT;
        let mut vars = RosterVariables {
            days,
            assigned: Vec::with_capacity(cells),
            overtime: Vec::with_capacity(cells),
            pool: Vec::with_capacity(day_cells),
            hired: Vec::with_capacity(day_cells),
            fired: Vec::with_capacity(day_cells),
        };

        for d in 0..days {
            for shift in Shift::ALL {
                for category in StaffCategory::ALL {
                    vars.assigned.push(
                        model.add_var(VarSpec::integer(format!("assigned[{d},{shift},{category}]"))),
                    );
                    vars.overtime.push(model.add_var(VarSpec::continuous(format!(
                        "overtime[{d},{shift},{category}]"
                    ))));
                }
            }
            for category in StaffCategory::ALL {
                vars.pool
                    .push(model.add_var(VarSpec::integer(format!("pool[{d},{category}]"))));
                vars.hired
                    .push(model.add_var(VarSpec::integer(format!("hired[{d},{category}]"))));
                vars.fired
                    .push(model.add_var(VarSpec::integer(format!("fired[{d},{category}]"))));
            }
        }
        vars
    }

    fn add_coverage(&self, model: &mut MilpModel, vars: &RosterVariables) {
        let demand = self.problem.demand();
        for d in 0..vars.days {
            for shift in Shift::ALL {
                for category in StaffCategory::ALL {
                    model.add_constraint(
                        format!("coverage[{d},{shift},{category}]"),
                        ConstraintFamily::Coverage,
                        LinearExpr::new().with_term(vars.assigned(d, shift, category), 1.0),
                        Comparison::Ge,
                        demand.get(d, shift, category) as f64,
                    );
                }
            }
        }
    }

    /// Weekly shift cap and contract hours over every full 7-day window.
    fn add_weekly_limits(&self, model: &mut MilpModel, vars: &RosterVariables) {
        let rules = self.problem.rules();
        let hours = self.problem.costs().shift_hours;
        let cap = rules.max_shifts_per_week as f64;
        let week = WEEK_DAYS as f64;

        for start in self.problem.horizon().window_starts(WEEK_DAYS) {
            let window = start..start + WEEK_DAYS;
            for category in StaffCategory::ALL {
                let contract = *rules.weekly_contract_hours.get(category);
                let mut shifts = LinearExpr::new();
                let mut worked_hours = LinearExpr::new();
                for d in window.clone() {
                    for shift in Shift::ALL {
                        shifts.add_term(vars.assigned(d, shift, category), week);
                        worked_hours.add_term(vars.assigned(d, shift, category), hours);
                        worked_hours.add_term(vars.overtime(d, shift, category), -1.0);
                    }
                    shifts.add_term(vars.pool(d, category), -cap);
                    worked_hours.add_term(vars.pool(d, category), -contract / week);
                }
                model.add_constraint(
                    format!("weekly_cap[{start},{category}]"),
                    ConstraintFamily::WeeklyCap,
                    shifts,
                    Comparison::Le,
                    0.0,
                );
                model.add_constraint(
                    format!("contract_hours[{start},{category}]"),
                    ConstraintFamily::ContractHours,
                    worked_hours,
                    Comparison::Le,
                    0.0,
                );
            }
        }
    }

    fn add_rest_periods(&self, model: &mut MilpModel, vars: &RosterVariables) {
        let pairs = self.problem.rest_exclusions();
        for d in 1..vars.days {
            for &(from, to) in &pairs {
                for category in StaffCategory::ALL {
                    let expr = LinearExpr::new()
                        .with_term(vars.assigned(d - 1, from, category), 1.0)
                        .with_term(vars.assigned(d, to, category), 1.0)
                        .with_term(vars.pool(d, category), -1.0);
                    model.add_constraint(
                        format!("rest[{d},{from}->{to},{category}]"),
                        ConstraintFamily::RestPeriod,
                        expr,
                        Comparison::Le,
                        0.0,
                    );
                }
            }
        }
    }

    fn add_shift_distribution(&self, model: &mut MilpModel, vars: &RosterVariables) {
        for d in 0..vars.days {
            let mut expr = LinearExpr::new();
            for shift in Shift::ALL {
                let coef = if shift.is_daytime() { -1.0 } else { 1.0 };
                for category in StaffCategory::ALL {
                    expr.add_term(vars.assigned(d, shift, category), coef);
                }
            }
            model.add_constraint(
                format!("distribution[{d}]"),
                ConstraintFamily::ShiftDistribution,
                expr,
                Comparison::Le,
                0.0,
            );
        }
    }

    fn add_overtime_rules(&self, model: &mut MilpModel, vars: &RosterVariables) {
        let costs = self.problem.costs();
        for d in 0..vars.days {
            for shift in Shift::ALL {
                for category in StaffCategory::ALL {
                    let overtime = vars.overtime(d, shift, category);
                    if costs.overtime_allowed(category) {
                        model.add_constraint(
                            format!("overtime_limit[{d},{shift},{category}]"),
                            ConstraintFamily::OvertimeLimit,
                            LinearExpr::new().with_term(overtime, 1.0).with_term(
                                vars.assigned(d, shift, category),
                                -costs.shift_hours,
                            ),
                            Comparison::Le,
                            0.0,
                        );
                    } else {
                        model.add_constraint(
                            format!("no_overtime[{d},{shift},{category}]"),
                            ConstraintFamily::OvertimeEligibility,
                            LinearExpr::new().with_term(overtime, 1.0),
                            Comparison::Eq,
                            0.0,
                        );
                    }
                }
            }
        }
    }

    /// Daily pool bound and head-count continuity.
    fn add_pool_rules(&self, model: &mut MilpModel, vars: &RosterVariables) {
        for d in 0..vars.days {
            for category in StaffCategory::ALL {
                let pool = vars.pool(d, category);

                let mut staffed = LinearExpr::new();
                for shift in Shift::ALL {
                    staffed.add_term(vars.assigned(d, shift, category), 1.0);
                }
                staffed.add_term(pool, -1.0);
                model.add_constraint(
                    format!("daily_pool[{d},{category}]"),
                    ConstraintFamily::DailyPool,
                    staffed,
                    Comparison::Le,
                    0.0,
                );

                let mut flow = LinearExpr::new()
                    .with_term(pool, 1.0)
                    .with_term(vars.hired(d, category), -1.0)
                    .with_term(vars.fired(d, category), 1.0);
                let rhs = if d == 0 {
                    self.problem.initial_staff(category) as f64
                } else {
                    flow.add_term(vars.pool(d - 1, category), -1.0);
                    0.0
                };
                model.add_constraint(
                    format!("continuity[{d},{category}]"),
                    ConstraintFamily::Continuity,
                    flow,
                    Comparison::Eq,
                    rhs,
                );
            }
        }
    }

    fn add_staffing_limits(&self, model: &mut MilpModel, vars: &RosterVariables) {
        let rules = self.problem.rules();
        for category in StaffCategory::ALL {
            let max_hires = *rules.max_daily_hires.get(category);
            let max_headcount = *rules.max_headcount.get(category);
            for d in 0..vars.days {
                if let Some(limit) = max_hires {
                    model.add_constraint(
                        format!("hiring_limit[{d},{category}]"),
                        ConstraintFamily::HiringLimit,
                        LinearExpr::new().with_term(vars.hired(d, category), 1.0),
                        Comparison::Le,
                        limit as f64,
                    );
                }
                if let Some(limit) = max_headcount {
                    model.add_constraint(
                        format!("headcount_limit[{d},{category}]"),
                        ConstraintFamily::HeadcountLimit,
                        LinearExpr::new().with_term(vars.pool(d, category), 1.0),
                        Comparison::Le,
                        limit as f64,
                    );
                }
            }
        }
    }

    fn cost_objective(&self, vars: &RosterVariables) -> LinearExpr {
        let costs = self.problem.costs();
        let mut objective = LinearExpr::new();
        for d in 0..vars.days {
            for category in StaffCategory::ALL {
                for shift in Shift::ALL {
                    objective.add_term(
                        vars.assigned(d, shift, category),
                        costs.regular_rate(category),
                    );
                    objective.add_term(
                        vars.overtime(d, shift, category),
                        costs.overtime_rate(category),
                    );
                }
                objective.add_term(vars.hired(d, category), costs.hire_cost(category));
                objective.add_term(vars.fired(d, category), costs.fire_cost(category));
            }
        }
        objective
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RosterConfig, RosterRules};
    use crate::cost::CostModel;
    use crate::demand::DemandTable;
    use crate::models::{Horizon, PerCategory};
    use chrono::NaiveDate;

    fn problem(days: usize, rules: RosterRules) -> RosterProblem {
        let horizon = Horizon::new(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(), days).unwrap();
        let demand = DemandTable::from_fn(days, |_, shift, _| match shift {
            Shift::Morning => 4,
            Shift::Evening => 3,
            Shift::Night => 2,
        });
        RosterProblem::new(
            horizon,
            demand,
            CostModel::default(),
            PerCategory::new(10, 8, 6),
            rules,
        )
        .unwrap()
    }

    #[test]
    fn test_variable_counts() {
        let p = problem(2, RosterRules::default());
        let built = RosterModelBuilder::new(&p).build();
        // 2 days × 9 cells × (assigned + overtime) + 2 days × 3 × (pool, hired, fired)
        assert_eq!(built.model.var_count(), 36 + 18);
        assert_eq!(built.vars.days(), 2);
        let a = built.vars.assigned(1, Shift::Night, StaffCategory::Support);
        assert_eq!(built.model.var(a).name, "assigned[1,Night,Support Staff]");
    }

    #[test]
    fn test_family_counts() {
        let p = problem(8, RosterRules::default());
        let built = RosterModelBuilder::new(&p).build();
        let m = &built.model;
        assert_eq!(m.count_by_family(ConstraintFamily::Coverage), 8 * 9);
        // two full windows (start 0 and 1) × 3 categories
        assert_eq!(m.count_by_family(ConstraintFamily::WeeklyCap), 6);
        assert_eq!(m.count_by_family(ConstraintFamily::ContractHours), 6);
        // 7 transitions × 3 pairs × 3 categories
        assert_eq!(m.count_by_family(ConstraintFamily::RestPeriod), 63);
        assert_eq!(m.count_by_family(ConstraintFamily::ShiftDistribution), 8);
        // nurses barred by default
        assert_eq!(m.count_by_family(ConstraintFamily::OvertimeEligibility), 8 * 3);
        assert_eq!(m.count_by_family(ConstraintFamily::OvertimeLimit), 8 * 3 * 2);
        assert_eq!(m.count_by_family(ConstraintFamily::DailyPool), 24);
        assert_eq!(m.count_by_family(ConstraintFamily::Continuity), 24);
        assert_eq!(m.count_by_family(ConstraintFamily::HiringLimit), 0);
        assert_eq!(m.count_by_family(ConstraintFamily::HeadcountLimit), 0);
    }

    #[test]
    fn test_short_horizon_has_no_weekly_rows() {
        let p = problem(3, RosterRules::default());
        let built = RosterModelBuilder::new(&p).build();
        assert_eq!(built.model.count_by_family(ConstraintFamily::WeeklyCap), 0);
        assert_eq!(built.model.count_by_family(ConstraintFamily::ContractHours), 0);
    }

    #[test]
    fn test_staffing_limit_rows() {
        let mut rules = RosterRules::default();
        rules.max_daily_hires.caregiver = Some(2);
        rules.max_headcount.nurse = Some(9);
        let p = problem(3, rules);
        let built = RosterModelBuilder::new(&p).build();
        let hiring: Vec<_> = built
            .model
            .constraints()
            .iter()
            .filter(|c| c.family == ConstraintFamily::HiringLimit)
            .collect();
        assert_eq!(hiring.len(), 3);
        assert!(hiring.iter().all(|c| c.rhs == 2.0));
        assert_eq!(built.model.count_by_family(ConstraintFamily::HeadcountLimit), 3);
    }

    #[test]
    fn test_initial_continuity_uses_initial_staff() {
        let p = problem(2, RosterRules::default());
        let built = RosterModelBuilder::new(&p).build();
        let row = built
            .model
            .constraints()
            .iter()
            .find(|c| c.name == "continuity[0,Nurses]")
            .unwrap();
        assert_eq!(row.cmp, Comparison::Eq);
        assert_eq!(row.rhs, 8.0);
        assert_eq!(row.expr.terms().len(), 3);

        let next = built
            .model
            .constraints()
            .iter()
            .find(|c| c.name == "continuity[1,Nurses]")
            .unwrap();
        assert_eq!(next.rhs, 0.0);
        assert_eq!(next.expr.terms().len(), 4);
    }

    #[test]
    fn test_objective_coefficients() {
        let p = problem(1, RosterRules::default());
        let built = RosterModelBuilder::new(&p).build();
        let mut values = vec![0.0; built.model.var_count()];
        values[built.vars.assigned(0, Shift::Morning, StaffCategory::Caregiver).index()] = 2.0;
        values[built.vars.overtime(0, Shift::Morning, StaffCategory::Caregiver).index()] = 3.0;
        values[built.vars.hired(0, StaffCategory::Nurse).index()] = 1.0;
        values[built.vars.fired(0, StaffCategory::Support).index()] = 1.0;
        // 2 × 2400 + 3 × 450 + 7500 + 2500
        assert_eq!(built.model.objective_value(&values), 4800.0 + 1350.0 + 7500.0 + 2500.0);
        assert!(built.model.tie_break().is_none());
    }

    #[test]
    fn test_tie_break_term() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let p = RosterConfig::new(start)
            .with_horizon_days(2)
            .with_tie_break(TieBreak::MinimizeHeadcount)
            .problem()
            .unwrap();
        let built = RosterModelBuilder::new(&p).build();
        let tie = built.model.tie_break().unwrap();
        assert_eq!(tie.terms().len(), 2 * StaffCategory::COUNT);
        assert!(tie.terms().iter().all(|(_, c)| *c == TIE_BREAK_WEIGHT));
    }

    #[test]
    fn test_demand_level_assignment_checks() {
        // Staffing exactly at demand with a large pool satisfies every row
        let p = problem(8, RosterRules::default());
        let built = RosterModelBuilder::new(&p).build();
        let mut values = vec![0.0; built.model.var_count()];
        for d in 0..8 {
            for category in StaffCategory::ALL {
                for shift in Shift::ALL {
                    values[built.vars.assigned(d, shift, category).index()] =
                        p.demand().get(d, shift, category) as f64;
                }
                values[built.vars.pool(d, category).index()] = 20.0;
            }
        }
        for category in StaffCategory::ALL {
            values[built.vars.hired(0, category).index()] =
                20.0 - p.initial_staff(category) as f64;
        }
        let failures = built.model.check_feasible(&values, 1e-6);
        assert!(failures.is_empty(), "{failures:?}");
    }
}
