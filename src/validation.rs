//! Roster verification and infeasibility diagnostics.
//!
//! [`verify_schedule`] re-checks a finished schedule against every roster
//! rule, independently of the MILP rows that produced it. It detects:
//! - Layout errors (missing or reordered rows, demand mismatch)
//! - Coverage shortfalls
//! - Overtime on barred categories or beyond the shifts worked
//! - Night-heavy days
//! - Broken pool continuity and days staffed above the pool
//! - Rest-period, weekly-cap and contract-hours breaches
//! - Hiring and head-count limit breaches
//!
//! [`diagnose_infeasibility`] explains an infeasible model by comparing
//! demand with the largest pool the hiring and head-count limits allow.
//! Its checks are necessary conditions only: an empty result means the
//! rules conflict jointly rather than on a single (day, category).

use crate::error::{ConflictRule, DemandConflict};
use crate::models::{Schedule, Shift, StaffCategory, Violation, ViolationType};
use crate::problem::{RosterProblem, WEEK_DAYS};

/// Numeric tolerance for continuous comparisons.
pub const TOLERANCE: f64 = 1e-6;

/// Verifies a schedule against every roster rule.
///
/// # Returns
/// Every violation found; empty means the schedule is feasible. A layout
/// violation stops verification early.
pub fn verify_schedule(problem: &RosterProblem, schedule: &Schedule) -> Vec<Violation> {
    let mut violations = check_layout(problem, schedule);
    if !violations.is_empty() {
        return violations;
    }

    check_shifts(problem, schedule, &mut violations);
    check_distribution(schedule, &mut violations);
    check_pool(problem, schedule, &mut violations);
    check_rest(problem, schedule, &mut violations);
    check_windows(problem, schedule, &mut violations);
    violations
}

fn check_layout(problem: &RosterProblem, schedule: &Schedule) -> Vec<Violation> {
    let days = problem.days();
    let mut errors = Vec::new();

    if schedule.days.len() != days
        || schedule.staffing.len() != days * Shift::COUNT * StaffCategory::COUNT
        || schedule.movements.len() != days * StaffCategory::COUNT
    {
        errors.push(Violation::new(
            ViolationType::Layout,
            None,
            None,
            format!(
                "expected {} days, got {} days / {} staffing rows / {} movement rows",
                days,
                schedule.days.len(),
                schedule.staffing.len(),
                schedule.movements.len()
            ),
        ));
        return errors;
    }

    let mut rows = schedule.staffing.iter();
    let mut moves = schedule.movements.iter();
    for d in 0..days {
        for shift in Shift::ALL {
            for category in StaffCategory::ALL {
                let Some(row) = rows.next() else { continue };
                if row.day != d || row.shift != shift || row.category != category {
                    errors.push(Violation::new(
                        ViolationType::Layout,
                        Some(d),
                        Some(category),
                        format!("staffing row out of order at day {d} {shift} {category}"),
                    ));
                } else if row.demand != problem.demand().get(d, shift, category) {
                    errors.push(Violation::new(
                        ViolationType::Layout,
                        Some(d),
                        Some(category),
                        format!(
                            "day {d} {shift}: demand {} differs from {}",
                            row.demand,
                            problem.demand().get(d, shift, category)
                        ),
                    ));
                }
            }
        }
        for category in StaffCategory::ALL {
            let Some(m) = moves.next() else { continue };
            if m.day != d || m.category != category {
                errors.push(Violation::new(
                    ViolationType::Layout,
                    Some(d),
                    Some(category),
                    format!("movement row out of order at day {d} {category}"),
                ));
            }
        }
    }
    errors
}

fn check_shifts(problem: &RosterProblem, schedule: &Schedule, out: &mut Vec<Violation>) {
    let costs = problem.costs();
    for row in &schedule.staffing {
        if row.assigned < row.demand {
            out.push(Violation::new(
                ViolationType::CoverageShortfall,
                Some(row.day),
                Some(row.category),
                format!(
                    "day {} {}: {} assigned, {} required",
                    row.day, row.shift, row.assigned, row.demand
                ),
            ));
        }
        if !costs.overtime_allowed(row.category) && row.overtime_hours > TOLERANCE {
            out.push(Violation::new(
                ViolationType::OvertimeNotAllowed,
                Some(row.day),
                Some(row.category),
                format!(
                    "day {} {}: {:.2} overtime hours for a barred category",
                    row.day, row.shift, row.overtime_hours
                ),
            ));
        }
        let ceiling = costs.shift_hours * row.assigned as f64;
        if row.overtime_hours < -TOLERANCE || row.overtime_hours > ceiling + TOLERANCE {
            out.push(Violation::new(
                ViolationType::OvertimeExceedsShift,
                Some(row.day),
                Some(row.category),
                format!(
                    "day {} {}: {:.2} overtime hours outside [0, {:.2}]",
                    row.day, row.shift, row.overtime_hours, ceiling
                ),
            ));
        }
    }
}

fn check_distribution(schedule: &Schedule, out: &mut Vec<Violation>) {
    for d in 0..schedule.days.len() {
        let night = schedule.shift_total(d, Shift::Night);
        let daytime = schedule.shift_total(d, Shift::Morning) + schedule.shift_total(d, Shift::Evening);
        if night > daytime {
            out.push(Violation::new(
                ViolationType::ShiftDistribution,
                Some(d),
                None,
                format!("day {d}: {night} on nights, {daytime} on mornings and evenings"),
            ));
        }
    }
}

fn check_pool(problem: &RosterProblem, schedule: &Schedule, out: &mut Vec<Violation>) {
    let rules = problem.rules();
    for category in StaffCategory::ALL {
        let mut previous = problem.initial_staff(category) as i64;
        for d in 0..schedule.days.len() {
            let Some(m) = schedule.pool_movement(d, category) else { continue };
            let expected = previous + m.hired as i64 - m.fired as i64;
            if m.pool as i64 != expected {
                out.push(Violation::new(
                    ViolationType::PoolContinuity,
                    Some(d),
                    Some(category),
                    format!(
                        "pool {} but previous {} + hired {} - fired {} = {}",
                        m.pool, previous, m.hired, m.fired, expected
                    ),
                ));
            }
            previous = m.pool as i64;

            let staffed: u32 = Shift::ALL
                .iter()
                .filter_map(|&s| schedule.staffing(d, s, category))
                .map(|r| r.assigned)
                .sum();
            if staffed > m.pool {
                out.push(Violation::new(
                    ViolationType::PoolExceeded,
                    Some(d),
                    Some(category),
                    format!("{staffed} shifts staffed from a pool of {}", m.pool),
                ));
            }
            if let Some(limit) = *rules.max_daily_hires.get(category) {
                if m.hired > limit {
                    out.push(Violation::new(
                        ViolationType::HiringLimit,
                        Some(d),
                        Some(category),
                        format!("{} hired, at most {limit} allowed", m.hired),
                    ));
                }
            }
            if let Some(limit) = *rules.max_headcount.get(category) {
                if m.pool > limit {
                    out.push(Violation::new(
                        ViolationType::HeadcountLimit,
                        Some(d),
                        Some(category),
                        format!("pool {} above head-count cap {limit}", m.pool),
                    ));
                }
            }
        }
    }
}

fn assigned(schedule: &Schedule, day: usize, shift: Shift, category: StaffCategory) -> u32 {
    schedule
        .staffing(day, shift, category)
        .map(|r| r.assigned)
        .unwrap_or(0)
}

fn pool(schedule: &Schedule, day: usize, category: StaffCategory) -> u32 {
    schedule
        .pool_movement(day, category)
        .map(|m| m.pool)
        .unwrap_or(0)
}

fn check_rest(problem: &RosterProblem, schedule: &Schedule, out: &mut Vec<Violation>) {
    let pairs = problem.rest_exclusions();
    for d in 1..schedule.days.len() {
        for &(from, to) in &pairs {
            for category in StaffCategory::ALL {
                let worked = assigned(schedule, d - 1, from, category) + assigned(schedule, d, to, category);
                let available = pool(schedule, d, category);
                if worked > available {
                    out.push(Violation::new(
                        ViolationType::RestPeriod,
                        Some(d),
                        Some(category),
                        format!(
                            "{from} on day {} then {to}: {worked} shifts from a pool of {available}",
                            d - 1
                        ),
                    ));
                }
            }
        }
    }
}

fn check_windows(problem: &RosterProblem, schedule: &Schedule, out: &mut Vec<Violation>) {
    let rules = problem.rules();
    let shift_hours = problem.costs().shift_hours;
    for start in problem.horizon().window_starts(WEEK_DAYS) {
        let end = start + WEEK_DAYS - 1;
        for category in StaffCategory::ALL {
            let mut shifts = 0u64;
            let mut pool_days = 0u64;
            let mut overtime = 0.0;
            for d in start..=end {
                for shift in Shift::ALL {
                    shifts += assigned(schedule, d, shift, category) as u64;
                    overtime += schedule
                        .staffing(d, shift, category)
                        .map(|r| r.overtime_hours)
                        .unwrap_or(0.0);
                }
                pool_days += pool(schedule, d, category) as u64;
            }

            let cap = rules.max_shifts_per_week as u64;
            if WEEK_DAYS as u64 * shifts > cap * pool_days {
                out.push(Violation::new(
                    ViolationType::WeeklyCap,
                    Some(end),
                    Some(category),
                    format!(
                        "days {start}-{end}: {shifts} shifts exceed {cap} per employee over {pool_days} pool-days"
                    ),
                ));
            }

            let contract = *rules.weekly_contract_hours.get(category);
            let worked = shift_hours * shifts as f64;
            let allowed = contract / WEEK_DAYS as f64 * pool_days as f64 + overtime;
            if worked > allowed + TOLERANCE * allowed.abs().max(1.0) {
                out.push(Violation::new(
                    ViolationType::ContractHours,
                    Some(end),
                    Some(category),
                    format!("days {start}-{end}: {worked:.1} hours worked, {allowed:.1} covered"),
                ));
            }
        }
    }
}

/// Lists demand that no reachable head count can cover.
///
/// Only categories with a hiring limit or head-count cap have a finite
/// reachable pool; the rest never conflict.
pub fn diagnose_infeasibility(problem: &RosterProblem) -> Vec<DemandConflict> {
    let mut conflicts = Vec::new();
    let demand = problem.demand();
    let rules = problem.rules();
    let costs = problem.costs();
    let pairs = problem.rest_exclusions();
    let days = problem.days();

    for category in StaffCategory::ALL {
        let reach: Vec<Option<f64>> = (0..days)
            .map(|d| problem.reachable_pool(d, category).map(f64::from))
            .collect();

        for (d, bound) in reach.iter().enumerate() {
            let Some(reachable) = *bound else { continue };
            let mut push = |rule: ConflictRule, required: f64| {
                if required > reachable + TOLERANCE {
                    conflicts.push(DemandConflict {
                        day: d,
                        category,
                        rule,
                        required,
                        reachable,
                    });
                }
            };
            push(ConflictRule::DailyPool, demand.day_total(d, category) as f64);
            if d > 0 {
                let worst = pairs
                    .iter()
                    .map(|&(from, to)| demand.get(d - 1, from, category) + demand.get(d, to, category))
                    .max()
                    .unwrap_or(0);
                push(ConflictRule::RestPeriod, worst as f64);
            }
        }

        for start in problem.horizon().window_starts(WEEK_DAYS) {
            let window = start..start + WEEK_DAYS;
            let Some(pool_days) = window
                .clone()
                .map(|d| reach[d])
                .sum::<Option<f64>>()
            else {
                continue;
            };
            let shifts: f64 = window.map(|d| demand.day_total(d, category) as f64).sum();
            let end = start + WEEK_DAYS - 1;
            let per_day = pool_days / WEEK_DAYS as f64;

            let capacity = rules.max_shifts_per_week as f64 * per_day;
            if shifts > capacity + TOLERANCE {
                conflicts.push(DemandConflict {
                    day: end,
                    category,
                    rule: ConflictRule::WeeklyCap,
                    required: shifts,
                    reachable: capacity,
                });
            }
            if !costs.overtime_allowed(category) {
                let hours = costs.shift_hours * shifts;
                let contract = *rules.weekly_contract_hours.get(category) * per_day;
                if hours > contract + TOLERANCE {
                    conflicts.push(DemandConflict {
                        day: end,
                        category,
                        rule: ConflictRule::ContractHours,
                        required: hours,
                        reachable: contract,
                    });
                }
            }
        }
    }

    conflicts.sort_by_key(|c| (c.day, c.category.index()));
    conflicts
}
