//! Validated solve input.
//!
//! `RosterProblem` bundles everything one solve needs: horizon, demand
//! table, cost model, initial head counts and labor rules. It is built
//! once per solve and only read afterwards, so independent solves share
//! nothing.

use crate::config::{RosterRules, TieBreak};
use crate::cost::CostModel;
use crate::demand::DemandTable;
use crate::error::ConfigError;
use crate::models::{Horizon, PerCategory, Shift, StaffCategory};

/// Length of the rolling window for weekly rules.
pub const WEEK_DAYS: usize = 7;

/// Immutable input of one solve.
#[derive(Debug, Clone)]
pub struct RosterProblem {
    horizon: Horizon,
    demand: DemandTable,
    costs: CostModel,
    initial_staff: PerCategory<u32>,
    rules: RosterRules,
    tie_break: TieBreak,
}

impl RosterProblem {
    /// Creates a problem from explicit parts.
    ///
    /// # Errors
    /// `ConfigError::Invalid` if the demand table does not cover the
    /// horizon, or the cost model or rules are invalid.
    pub fn new(
        horizon: Horizon,
        demand: DemandTable,
        costs: CostModel,
        initial_staff: PerCategory<u32>,
        rules: RosterRules,
    ) -> Result<Self, ConfigError> {
        if demand.days() != horizon.len() {
            return Err(ConfigError::Invalid(format!(
                "demand table covers {} days but the horizon has {}",
                demand.days(),
                horizon.len()
            )));
        }
        costs.validate()?;
        rules.validate()?;
        Ok(Self {
            horizon,
            demand,
            costs,
            initial_staff,
            rules,
            tie_break: TieBreak::default(),
        })
    }

    /// Sets the tie-break policy.
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn horizon(&self) -> &Horizon {
        &self.horizon
    }

    pub fn demand(&self) -> &DemandTable {
        &self.demand
    }

    pub fn costs(&self) -> &CostModel {
        &self.costs
    }

    pub fn rules(&self) -> &RosterRules {
        &self.rules
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Number of days.
    #[inline]
    pub fn days(&self) -> usize {
        self.horizon.len()
    }

    /// Head count of a category before day 0.
    #[inline]
    pub fn initial_staff(&self, category: StaffCategory) -> u32 {
        *self.initial_staff.get(category)
    }

    /// Shift pairs (shift on day D, shift on day D+1) that leave less
    /// than the minimum rest between them.
    pub fn rest_exclusions(&self) -> Vec<(Shift, Shift)> {
        let hours = self.costs.shift_hours;
        let mut pairs = Vec::new();
        for from in Shift::ALL {
            for to in Shift::ALL {
                if from.rest_gap_hours(to, hours) < self.rules.min_rest_hours {
                    pairs.push((from, to));
                }
            }
        }
        pairs
    }

    /// Upper bound on a category's pool on `day`, from the initial head
    /// count, the daily hiring limit and the head-count cap.
    /// `None` when neither limit is configured.
    pub fn reachable_pool(&self, day: usize, category: StaffCategory) -> Option<u32> {
        let hires = self.rules.max_daily_hires.get(category);
        let cap = self.rules.max_headcount.get(category);
        let grown = hires.map(|h| {
            let days = (day as u64) + 1;
            let total = self.initial_staff(category) as u64 + days * h as u64;
            total.min(u32::MAX as u64) as u32
        });
        match (grown, *cap) {
            (Some(g), Some(c)) => Some(g.min(c)),
            (Some(g), None) => Some(g),
            (None, Some(c)) => Some(c),
            (None, None) => None,
        }
    }
}
