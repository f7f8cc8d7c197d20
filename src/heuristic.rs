//! Greedy constant-pool roster.
//!
//! # Algorithm
//!
//! 1. Staff every (day, shift, category) cell exactly at demand.
//! 2. Where a day's night staffing exceeds its day staffing, add the
//!    difference to the morning shift of the category with the lowest
//!    regular rate.
//! 3. Size one constant pool per category: the largest requirement over
//!    the daily-pool, rest-pair, weekly-cap and contract-hours rules
//!    (no overtime is used).
//! 4. Hire up to that pool on day 0, or release staff above the
//!    head-count cap.
//!
//! The result satisfies every roster rule whenever the day-0 hires fit
//! the hiring limit and the pool fits the head-count cap; otherwise no
//! roster is produced. It is the warm start and fallback incumbent of
//! time-limited solves, not a cost optimum.
//!
//! # Complexity
//! O(D × S × C + W × C) where W = number of full 7-day windows.

use tracing::debug;

use crate::milp::RosterModel;
use crate::models::{PerCategory, Shift, StaffCategory};
use crate::problem::{RosterProblem, WEEK_DAYS};

#[inline]
fn cell(day: usize, shift: Shift, category: StaffCategory) -> usize {
    (day * Shift::COUNT + shift.index()) * StaffCategory::COUNT + category.index()
}

/// A feasible roster with a constant pool per category.
#[derive(Debug, Clone, PartialEq)]
pub struct GreedyRoster {
    days: usize,
    assigned: Vec<u32>,
    pool: PerCategory<u32>,
    hired: PerCategory<u32>,
    fired: PerCategory<u32>,
}

impl GreedyRoster {
    /// Builds the roster, or `None` when a constant pool cannot respect
    /// the hiring limit or head-count cap.
    pub fn build(problem: &RosterProblem) -> Option<Self> {
        let days = problem.days();
        let demand = problem.demand();
        let mut assigned = vec![0u32; days * Shift::COUNT * StaffCategory::COUNT];
        for d in 0..days {
            for shift in Shift::ALL {
                for category in StaffCategory::ALL {
                    assigned[cell(d, shift, category)] = demand.get(d, shift, category);
                }
            }
        }

        let costs = problem.costs();
        let cheapest = StaffCategory::ALL
            .into_iter()
            .min_by(|a, b| costs.regular_rate(*a).total_cmp(&costs.regular_rate(*b)))
            .unwrap_or(StaffCategory::Caregiver);
        for d in 0..days {
            let mut night = 0u32;
            let mut daytime = 0u32;
            for shift in Shift::ALL {
                let total: u32 = StaffCategory::ALL
                    .iter()
                    .map(|&c| assigned[cell(d, shift, c)])
                    .sum();
                if shift.is_daytime() {
                    daytime += total;
                } else {
                    night += total;
                }
            }
            if night > daytime {
                assigned[cell(d, Shift::Morning, cheapest)] += night - daytime;
            }
        }

        let mut roster = Self {
            days,
            assigned,
            pool: PerCategory::default(),
            hired: PerCategory::default(),
            fired: PerCategory::default(),
        };

        let rules = problem.rules();
        for category in StaffCategory::ALL {
            let need = roster.required_pool(problem, category);
            let initial = problem.initial_staff(category);
            let mut target = need.max(initial);
            if let Some(cap) = *rules.max_headcount.get(category) {
                if need > cap {
                    debug!(event = "greedy_roster_rejected", category = %category, need, cap);
                    return None;
                }
                target = target.min(cap);
            }
            let hired = target.saturating_sub(initial);
            if let Some(limit) = *rules.max_daily_hires.get(category) {
                if hired > limit {
                    debug!(event = "greedy_roster_rejected", category = %category, hired, limit);
                    return None;
                }
            }
            *roster.pool.get_mut(category) = target;
            *roster.hired.get_mut(category) = hired;
            *roster.fired.get_mut(category) = initial.saturating_sub(target);
        }

        debug!(
            event = "greedy_roster",
            caregivers = roster.pool.caregiver,
            nurses = roster.pool.nurse,
            support = roster.pool.support,
        );
        Some(roster)
    }

    /// Smallest constant pool satisfying every per-category rule.
    fn required_pool(&self, problem: &RosterProblem, category: StaffCategory) -> u32 {
        let day_total = |d: usize| -> u32 {
            Shift::ALL
                .iter()
                .map(|&s| self.assigned(d, s, category))
                .sum()
        };

        let mut need = (0..self.days).map(day_total).max().unwrap_or(0);

        for (from, to) in problem.rest_exclusions() {
            for d in 1..self.days {
                need = need.max(self.assigned(d - 1, from, category) + self.assigned(d, to, category));
            }
        }

        let rules = problem.rules();
        let shift_hours = problem.costs().shift_hours;
        let contract = *rules.weekly_contract_hours.get(category);
        for start in problem.horizon().window_starts(WEEK_DAYS) {
            let shifts: u32 = (start..start + WEEK_DAYS).map(day_total).sum();
            need = need.max(shifts.div_ceil(rules.max_shifts_per_week));
            let by_hours = (shift_hours * shifts as f64 / contract - 1e-9).ceil().max(0.0);
            need = need.max(by_hours as u32);
        }
        need
    }

    pub fn days(&self) -> usize {
        self.days
    }

    #[inline]
    pub fn assigned(&self, day: usize, shift: Shift, category: StaffCategory) -> u32 {
        self.assigned[cell(day, shift, category)]
    }

    /// Constant pool of a category.
    pub fn pool(&self, category: StaffCategory) -> u32 {
        *self.pool.get(category)
    }

    /// Hires on day 0.
    pub fn hired(&self, category: StaffCategory) -> u32 {
        *self.hired.get(category)
    }

    /// Releases on day 0.
    pub fn fired(&self, category: StaffCategory) -> u32 {
        *self.fired.get(category)
    }

    /// Writes the roster as a variable assignment of `built`.
    pub fn to_values(&self, built: &RosterModel) -> Vec<f64> {
        let vars = &built.vars;
        let mut values = vec![0.0; built.model.var_count()];
        for d in 0..self.days.min(vars.days()) {
            for category in StaffCategory::ALL {
                for shift in Shift::ALL {
                    values[vars.assigned(d, shift, category).index()] =
                        self.assigned(d, shift, category) as f64;
                }
                values[vars.pool(d, category).index()] = self.pool(category) as f64;
            }
        }
        if self.days > 0 {
            for category in StaffCategory::ALL {
                values[vars.hired(0, category).index()] = self.hired(category) as f64;
                values[vars.fired(0, category).index()] = self.fired(category) as f64;
            }
        }
        values
    }
}
