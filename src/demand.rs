//! Demand model.
//!
//! Produces the required head count for every (day, shift, category)
//! triple of a horizon.
//!
//! # Algorithm
//! For a day in month `m`:
//! 1. Take the monthly historical table for `m`, or the baseline table
//!    when no history exists for that month.
//! 2. Scale by the month's seasonal factor and round up.
//! 3. On weekends, scale by the weekend multiplier and round up again.
//! 4. Never go below the weekday minimum for the (shift, category).
//!
//! Rounding up uses a small tolerance so float noise does not add a
//! head: `20 × 1.10` is 22, not 23.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ConfigError;
use crate::models::{
    table_value, Day, Horizon, Month, PerCategory, PerShift, Shift, ShiftTable, StaffCategory,
};

const CEIL_TOLERANCE: f64 = 1e-9;

/// Default weekend uplift (+10%).
pub const DEFAULT_WEEKEND_MULTIPLIER: f64 = 1.10;

/// Rounds up, ignoring float noise just above an integer.
pub(crate) fn ceil_count(value: f64) -> u32 {
    let v = (value - CEIL_TOLERANCE).ceil();
    if v <= 0.0 {
        0
    } else {
        v as u32
    }
}

fn table(c: [u32; 3], n: [u32; 3], s: [u32; 3]) -> ShiftTable {
    PerCategory::new(
        PerShift::new(c[0], c[1], c[2]),
        PerShift::new(n[0], n[1], n[2]),
        PerShift::new(s[0], s[1], s[2]),
    )
}

/// Regulatory weekday minimums per (shift, category).
pub fn default_weekday_minimum() -> ShiftTable {
    table([10, 12, 8], [6, 5, 4], [5, 4, 3])
}

/// Historical monthly demand, September through February.
pub fn default_monthly_history() -> BTreeMap<Month, ShiftTable> {
    BTreeMap::from([
        (Month::September, table([12, 14, 9], [7, 6, 5], [6, 5, 4])),
        (Month::October, table([11, 13, 8], [6, 5, 4], [5, 4, 3])),
        (Month::November, table([10, 12, 8], [6, 5, 4], [5, 4, 3])),
        (Month::December, table([13, 15, 10], [8, 7, 6], [7, 6, 5])),
        (Month::January, table([14, 16, 11], [9, 8, 7], [8, 7, 6])),
        (Month::February, table([12, 14, 9], [7, 6, 5], [6, 5, 4])),
    ])
}

/// Demand model configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemandModel {
    /// Floor for every demand value.
    pub weekday_minimum: ShiftTable,
    /// Demand for months without historical data.
    pub baseline: ShiftTable,
    /// Historical demand per month.
    pub monthly: BTreeMap<Month, ShiftTable>,
    /// Seasonal scaling per month (missing = 1.0).
    pub seasonal_factors: BTreeMap<Month, f64>,
    /// Weekend scaling (≥ 1.0).
    pub weekend_multiplier: f64,
}

impl Default for DemandModel {
    fn default() -> Self {
        let monthly = default_monthly_history();
        let baseline = monthly
            .get(&Month::February)
            .copied()
            .unwrap_or_else(default_weekday_minimum);
        Self {
            weekday_minimum: default_weekday_minimum(),
            baseline,
            monthly,
            seasonal_factors: BTreeMap::new(),
            weekend_multiplier: DEFAULT_WEEKEND_MULTIPLIER,
        }
    }
}

impl DemandModel {
    /// A model with the same baseline every month and no minimum floor.
    pub fn flat(baseline: ShiftTable) -> Self {
        Self {
            weekday_minimum: ShiftTable::default(),
            baseline,
            monthly: BTreeMap::new(),
            seasonal_factors: BTreeMap::new(),
            weekend_multiplier: DEFAULT_WEEKEND_MULTIPLIER,
        }
    }

    /// Sets the weekend multiplier.
    pub fn with_weekend_multiplier(mut self, multiplier: f64) -> Self {
        self.weekend_multiplier = multiplier;
        self
    }

    /// Sets a month's seasonal factor.
    pub fn with_seasonal_factor(mut self, month: Month, factor: f64) -> Self {
        self.seasonal_factors.insert(month, factor);
        self
    }

    /// Sets a month's historical table.
    pub fn with_monthly(mut self, month: Month, table: ShiftTable) -> Self {
        self.monthly.insert(month, table);
        self
    }

    /// Sets the weekday minimum table.
    pub fn with_weekday_minimum(mut self, table: ShiftTable) -> Self {
        self.weekday_minimum = table;
        self
    }

    /// Historical table used for a month.
    pub fn history_for(&self, month: Month) -> &ShiftTable {
        self.monthly.get(&month).unwrap_or(&self.baseline)
    }

    /// Seasonal factor of a month.
    pub fn seasonal_factor(&self, month: Month) -> f64 {
        self.seasonal_factors.get(&month).copied().unwrap_or(1.0)
    }

    /// Required head count for (day, shift, category).
    pub fn demand(&self, day: &Day, shift: Shift, category: StaffCategory) -> u32 {
        let historical = table_value(self.history_for(day.month), shift, category);
        let mut required = ceil_count(historical as f64 * self.seasonal_factor(day.month));
        if day.is_weekend() {
            required = ceil_count(required as f64 * self.weekend_multiplier);
        }
        required.max(table_value(&self.weekday_minimum, shift, category))
    }

    /// Demand for every triple of a horizon.
    pub fn table(&self, horizon: &Horizon) -> DemandTable {
        DemandTable::from_fn(horizon.len(), |d, shift, category| {
            self.demand(&horizon.days()[d], shift, category)
        })
    }

    /// Checks multipliers.
    ///
    /// # Errors
    /// `ConfigError::Invalid` if the weekend multiplier is below 1.0 or a
    /// seasonal factor is not a positive finite number.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.weekend_multiplier.is_finite() || self.weekend_multiplier < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "weekend_multiplier must be >= 1.0, got {}",
                self.weekend_multiplier
            )));
        }
        for (month, factor) in &self.seasonal_factors {
            if !factor.is_finite() || *factor <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "seasonal factor for {month} must be positive, got {factor}"
                )));
            }
        }
        Ok(())
    }
}

/// Required head count per (day, shift, category).
///
/// Dense storage: every triple of the horizon has exactly one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandTable {
    days: usize,
    values: Vec<u32>,
}

impl DemandTable {
    /// Builds a table by evaluating `f` for every triple.
    pub fn from_fn(days: usize, mut f: impl FnMut(usize, Shift, StaffCategory) -> u32) -> Self {
        let mut values = Vec::with_capacity(days * Shift::COUNT * StaffCategory::COUNT);
        for d in 0..days {
            for shift in Shift::ALL {
                for category in StaffCategory::ALL {
                    values.push(f(d, shift, category));
                }
            }
        }
        Self { days, values }
    }

    /// Number of days covered.
    pub fn days(&self) -> usize {
        self.days
    }

    /// Demand for (day, shift, category).
    ///
    /// # Panics
    /// If `day` is outside the horizon.
    #[inline]
    pub fn get(&self, day: usize, shift: Shift, category: StaffCategory) -> u32 {
        assert!(day < self.days, "day {day} outside a {}-day demand table", self.days);
        self.values[(day * Shift::COUNT + shift.index()) * StaffCategory::COUNT + category.index()]
    }

    /// Demand of a category on a day, summed over shifts.
    pub fn day_total(&self, day: usize, category: StaffCategory) -> u32 {
        Shift::ALL.iter().map(|&s| self.get(day, s, category)).sum()
    }

    /// Demand of a shift on a day, summed over categories.
    pub fn shift_total(&self, day: usize, shift: Shift) -> u32 {
        StaffCategory::ALL.iter().map(|&c| self.get(day, shift, c)).sum()
    }

    /// Largest single-day demand of a category.
    pub fn peak_day_total(&self, category: StaffCategory) -> u32 {
        (0..self.days)
            .map(|d| self.day_total(d, category))
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day_on(y: i32, m: u32, d: u32) -> Day {
        Day::new(0, NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn uniform(n: u32) -> ShiftTable {
        PerCategory::from_fn(|_| PerShift::new(n, n, n))
    }

    #[test]
    fn test_weekend_uplift_exact() {
        // 2025-03-08 is a Saturday
        let model = DemandModel::flat(uniform(20));
        let saturday = day_on(2025, 3, 8);
        let monday = day_on(2025, 3, 10);
        assert_eq!(model.demand(&saturday, Shift::Morning, StaffCategory::Caregiver), 22);
        assert_eq!(model.demand(&monday, Shift::Morning, StaffCategory::Caregiver), 20);
    }

    #[test]
    fn test_weekend_rounds_up() {
        let model = DemandModel::flat(uniform(12));
        let sunday = day_on(2025, 3, 9);
        // 12 × 1.1 = 13.2 → 14
        assert_eq!(model.demand(&sunday, Shift::Night, StaffCategory::Nurse), 14);
    }

    #[test]
    fn test_ceil_count_tolerance() {
        assert_eq!(ceil_count(20.0 * 1.1), 22);
        assert_eq!(ceil_count(22.0000001), 23);
        assert_eq!(ceil_count(0.0), 0);
        assert_eq!(ceil_count(-3.0), 0);
    }

    #[test]
    fn test_monthly_history_and_fallback() {
        let model = DemandModel::default();
        let jan = day_on(2025, 1, 6); // Monday
        let jun = day_on(2025, 6, 2); // Monday
        assert_eq!(model.demand(&jan, Shift::Evening, StaffCategory::Caregiver), 16);
        // June has no history → February table
        assert_eq!(model.demand(&jun, Shift::Evening, StaffCategory::Caregiver), 14);
    }

    #[test]
    fn test_never_below_weekday_minimum() {
        let model = DemandModel::default()
            .with_seasonal_factor(Month::November, 0.5);
        let nov = day_on(2025, 11, 3); // Monday
        for shift in Shift::ALL {
            for category in StaffCategory::ALL {
                let floor = table_value(&default_weekday_minimum(), shift, category);
                assert!(model.demand(&nov, shift, category) >= floor);
            }
        }
    }

    #[test]
    fn test_seasonal_factor_scales() {
        let model = DemandModel::flat(uniform(10)).with_seasonal_factor(Month::December, 1.25);
        let dec = day_on(2025, 12, 1); // Monday
        assert_eq!(model.demand(&dec, Shift::Morning, StaffCategory::Support), 13);
    }

    #[test]
    fn test_table_covers_every_triple() {
        let horizon = Horizon::new(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(), 7).unwrap();
        let model = DemandModel::default();
        let table = model.table(&horizon);
        assert_eq!(table.days(), 7);
        for (d, day) in horizon.days().iter().enumerate() {
            for shift in Shift::ALL {
                for category in StaffCategory::ALL {
                    assert_eq!(table.get(d, shift, category), model.demand(day, shift, category));
                }
            }
        }
        // March falls back to the February table; Saturday (day 5) is inflated
        assert_eq!(table.day_total(0, StaffCategory::Caregiver), 35);
        assert_eq!(table.day_total(5, StaffCategory::Caregiver), 14 + 16 + 10);
        assert_eq!(table.peak_day_total(StaffCategory::Caregiver), 40);
    }

    #[test]
    fn test_shift_total() {
        let t = DemandTable::from_fn(1, |_, s, _| if s == Shift::Night { 2 } else { 1 });
        assert_eq!(t.shift_total(0, Shift::Night), 6);
        assert_eq!(t.shift_total(0, Shift::Morning), 3);
    }

    #[test]
    fn test_validate() {
        assert!(DemandModel::default().validate().is_ok());
        assert!(DemandModel::default().with_weekend_multiplier(0.9).validate().is_err());
        assert!(DemandModel::default()
            .with_seasonal_factor(Month::May, 0.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_toml_seasonal_factors() {
        let model: DemandModel = toml::from_str(
            r#"
            weekend_multiplier = 1.2
            [seasonal_factors]
            December = 1.05
            "#,
        )
        .unwrap();
        assert_eq!(model.weekend_multiplier, 1.2);
        assert_eq!(model.seasonal_factor(Month::December), 1.05);
        assert_eq!(model.seasonal_factor(Month::May), 1.0);
    }
}
