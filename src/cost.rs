//! Cost model.
//!
//! Static per-category cost parameters: hourly wage, overtime multiplier,
//! hiring and firing costs. Regular cost is charged per staffed shift
//! (`hourly_wage × shift_hours`); overtime is charged per hour at
//! `overtime_multiplier × hourly_wage`.
//!
//! Defaults follow the facility's current wage sheet: Caregiver 300/h,
//! Nurse 450/h (no overtime), Support 250/h, overtime at 1.5×.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::{CostBreakdown, PerCategory, StaffCategory};

/// Cost parameters of one staff category.
///
/// Every field is required when deserialized; a partial table is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryCost {
    /// Regular wage per hour.
    pub hourly_wage: f64,
    /// Overtime hourly wage as a multiple of `hourly_wage`.
    /// Must be 0.0 when `overtime_allowed` is false.
    pub overtime_multiplier: f64,
    /// Whether staff of this category may work overtime.
    pub overtime_allowed: bool,
    /// One-off cost of hiring one employee.
    pub hire_cost: f64,
    /// One-off cost of letting one employee go.
    pub fire_cost: f64,
}

impl CategoryCost {
    /// Creates a category cost with overtime allowed at `overtime_multiplier`.
    pub fn new(hourly_wage: f64, overtime_multiplier: f64, hire_cost: f64, fire_cost: f64) -> Self {
        Self {
            hourly_wage,
            overtime_multiplier,
            overtime_allowed: true,
            hire_cost,
            fire_cost,
        }
    }

    /// Creates a category cost barred from overtime.
    pub fn without_overtime(hourly_wage: f64, hire_cost: f64, fire_cost: f64) -> Self {
        Self {
            hourly_wage,
            overtime_multiplier: 0.0,
            overtime_allowed: false,
            hire_cost,
            fire_cost,
        }
    }
}

/// Per-category cost parameters plus the shift length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostModel {
    /// Paid hours per shift.
    pub shift_hours: f64,
    pub caregiver: CategoryCost,
    pub nurse: CategoryCost,
    pub support: CategoryCost,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            shift_hours: 8.0,
            caregiver: CategoryCost::new(300.0, 1.5, 5000.0, 3500.0),
            nurse: CategoryCost::without_overtime(450.0, 7500.0, 5000.0),
            support: CategoryCost::new(250.0, 1.5, 4000.0, 2500.0),
        }
    }
}

impl CostModel {
    /// Creates a cost model.
    pub fn new(shift_hours: f64, categories: PerCategory<CategoryCost>) -> Self {
        Self {
            shift_hours,
            caregiver: categories.caregiver,
            nurse: categories.nurse,
            support: categories.support,
        }
    }

    /// Replaces one category's parameters.
    pub fn with_category(mut self, category: StaffCategory, cost: CategoryCost) -> Self {
        match category {
            StaffCategory::Caregiver => self.caregiver = cost,
            StaffCategory::Nurse => self.nurse = cost,
            StaffCategory::Support => self.support = cost,
        }
        self
    }

    /// Parameters of a category.
    #[inline]
    pub fn category(&self, category: StaffCategory) -> &CategoryCost {
        match category {
            StaffCategory::Caregiver => &self.caregiver,
            StaffCategory::Nurse => &self.nurse,
            StaffCategory::Support => &self.support,
        }
    }

    /// Cost of one staffed shift.
    #[inline]
    pub fn regular_rate(&self, category: StaffCategory) -> f64 {
        self.category(category).hourly_wage * self.shift_hours
    }

    /// Cost of one overtime hour (0.0 for overtime-barred categories).
    #[inline]
    pub fn overtime_rate(&self, category: StaffCategory) -> f64 {
        let c = self.category(category);
        c.overtime_multiplier * c.hourly_wage
    }

    /// Whether a category may work overtime.
    #[inline]
    pub fn overtime_allowed(&self, category: StaffCategory) -> bool {
        self.category(category).overtime_allowed
    }

    #[inline]
    pub fn hire_cost(&self, category: StaffCategory) -> f64 {
        self.category(category).hire_cost
    }

    #[inline]
    pub fn fire_cost(&self, category: StaffCategory) -> f64 {
        self.category(category).fire_cost
    }

    /// Cost of a category's totals over the horizon.
    pub fn cost_of(
        &self,
        category: StaffCategory,
        shifts_staffed: f64,
        overtime_hours: f64,
        hired: f64,
        fired: f64,
    ) -> CostBreakdown {
        CostBreakdown::new(
            self.regular_rate(category) * shifts_staffed,
            self.overtime_rate(category) * overtime_hours,
            self.hire_cost(category) * hired,
            self.fire_cost(category) * fired,
        )
    }

    /// Checks every parameter.
    ///
    /// # Errors
    /// `ConfigError::Invalid` for a non-finite or negative value, a
    /// non-positive shift length, or a nonzero multiplier on an
    /// overtime-barred category.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.shift_hours.is_finite() || self.shift_hours <= 0.0 || self.shift_hours > 24.0 {
            return Err(ConfigError::Invalid(format!(
                "shift_hours must be in (0, 24], got {}",
                self.shift_hours
            )));
        }
        for category in StaffCategory::ALL {
            let cost = self.category(category);
            let fields = [
                ("hourly_wage", cost.hourly_wage),
                ("overtime_multiplier", cost.overtime_multiplier),
                ("hire_cost", cost.hire_cost),
                ("fire_cost", cost.fire_cost),
            ];
            for (name, value) in fields {
                if !value.is_finite() || value < 0.0 {
                    return Err(ConfigError::Invalid(format!(
                        "{category}: {name} must be a finite non-negative number, got {value}"
                    )));
                }
            }
            if !cost.overtime_allowed && cost.overtime_multiplier != 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{category}: overtime is not allowed but overtime_multiplier is {}",
                    cost.overtime_multiplier
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rates() {
        let m = CostModel::default();
        assert_eq!(m.regular_rate(StaffCategory::Caregiver), 2400.0);
        assert_eq!(m.overtime_rate(StaffCategory::Caregiver), 450.0);
        assert_eq!(m.overtime_rate(StaffCategory::Nurse), 0.0);
        assert!(!m.overtime_allowed(StaffCategory::Nurse));
        assert_eq!(m.hire_cost(StaffCategory::Support), 4000.0);
        assert_eq!(m.fire_cost(StaffCategory::Nurse), 5000.0);
        assert!(m.validate().is_ok());
    }

    #[test]
    fn test_cost_of() {
        let m = CostModel::default();
        let c = m.cost_of(StaffCategory::Support, 10.0, 4.0, 1.0, 2.0);
        assert_eq!(c.regular, 20_000.0);
        assert_eq!(c.overtime, 1500.0);
        assert_eq!(c.hiring, 4000.0);
        assert_eq!(c.firing, 5000.0);
        assert_eq!(c.total, 30_500.0);
    }

    #[test]
    fn test_negative_multiplier_rejected() {
        let m = CostModel::default().with_category(
            StaffCategory::Caregiver,
            CategoryCost::new(300.0, -1.0, 5000.0, 3500.0),
        );
        assert!(matches!(m.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_barred_category_with_multiplier_rejected() {
        let mut nurse = CategoryCost::without_overtime(450.0, 7500.0, 5000.0);
        nurse.overtime_multiplier = 1.5;
        let m = CostModel::default().with_category(StaffCategory::Nurse, nurse);
        let err = m.validate().unwrap_err();
        assert!(err.to_string().contains("Nurses"));
    }

    #[test]
    fn test_negative_costs_rejected() {
        let m = CostModel::default().with_category(
            StaffCategory::Support,
            CategoryCost::new(250.0, 1.5, -1.0, 2500.0),
        );
        assert!(m.validate().is_err());

        let nan = CostModel::default().with_category(
            StaffCategory::Support,
            CategoryCost::new(f64::NAN, 1.5, 1.0, 2500.0),
        );
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_shift_hours_rejected() {
        let mut m = CostModel::default();
        m.shift_hours = 0.0;
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_toml_shape() {
        let m: CostModel = toml::from_str(
            r#"
            shift_hours = 8.0
            [caregiver]
            hourly_wage = 320.0
            overtime_multiplier = 2.0
            overtime_allowed = true
            hire_cost = 5000.0
            fire_cost = 3500.0
            "#,
        )
        .unwrap();
        assert_eq!(m.category(StaffCategory::Caregiver).hourly_wage, 320.0);
        // Unlisted categories keep defaults
        assert_eq!(m.category(StaffCategory::Nurse).hourly_wage, 450.0);
    }
}
