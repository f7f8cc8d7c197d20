//! Roster (solution) model.
//!
//! A schedule is the complete output of one solve: staffing per
//! (day, shift, category), pool movements per (day, category), and the
//! cost breakdown. Consumers (dashboards, CSV writers) read it; nothing
//! in the core mutates it after extraction.
//!
//! # Layout
//! `staffing` is ordered by day, then shift, then category;
//! `movements` by day, then category. Index lookups rely on this order.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

use super::{Day, PerCategory, Shift, StaffCategory};

/// Optimality status of a published schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    /// Proven cost-minimal under the constraint set.
    Optimal,
    /// Feasible best-effort incumbent returned when the time budget ran out.
    /// Never equivalent to a proven optimum.
    SubOptimal,
}

/// Staffing of one (day, shift, category) cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftStaffing {
    /// Day index in the horizon.
    pub day: usize,
    pub shift: Shift,
    pub category: StaffCategory,
    /// Required head count.
    pub demand: u32,
    /// Staff assigned.
    pub assigned: u32,
    /// Overtime hours worked on this shift.
    pub overtime_hours: f64,
}

impl ShiftStaffing {
    /// Staff assigned above demand.
    #[inline]
    pub fn surplus(&self) -> i64 {
        self.assigned as i64 - self.demand as i64
    }
}

/// Head-count movement of one category on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolMovement {
    /// Day index in the horizon.
    pub day: usize,
    pub category: StaffCategory,
    /// Staff on the books after the day's hires and departures.
    pub pool: u32,
    pub hired: u32,
    pub fired: u32,
}

/// Cost split into its four components.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub regular: f64,
    pub overtime: f64,
    pub hiring: f64,
    pub firing: f64,
    pub total: f64,
}

impl CostBreakdown {
    /// Creates a breakdown; `total` is the sum of the components.
    pub fn new(regular: f64, overtime: f64, hiring: f64, firing: f64) -> Self {
        Self {
            regular,
            overtime,
            hiring,
            firing,
            total: regular + overtime + hiring + firing,
        }
    }
}

impl Add for CostBreakdown {
    type Output = CostBreakdown;

    fn add(self, rhs: Self) -> Self::Output {
        CostBreakdown::new(
            self.regular + rhs.regular,
            self.overtime + rhs.overtime,
            self.hiring + rhs.hiring,
            self.firing + rhs.firing,
        )
    }
}

impl AddAssign for CostBreakdown {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// A complete roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    /// Days of the horizon.
    pub days: Vec<Day>,
    /// Optimality status.
    pub status: ScheduleStatus,
    /// Whether the schedule passed verification against every roster rule.
    pub feasible: bool,
    /// One row per (day, shift, category).
    pub staffing: Vec<ShiftStaffing>,
    /// One row per (day, category).
    pub movements: Vec<PoolMovement>,
    /// Total cost breakdown.
    pub costs: CostBreakdown,
    /// Cost breakdown per category.
    pub category_costs: PerCategory<CostBreakdown>,
    /// Objective value reported by the solver.
    pub objective_value: f64,
}

/// A broken roster rule found by verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Day the violation refers to, if any.
    pub day: Option<usize>,
    /// Category the violation refers to, if any.
    pub category: Option<StaffCategory>,
    /// Human-readable description.
    pub message: String,
}

/// Classification of roster violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// Fewer staff assigned than demanded.
    CoverageShortfall,
    /// Overtime recorded for a category barred from it.
    OvertimeNotAllowed,
    /// Overtime beyond the hours of the shifts worked.
    OvertimeExceedsShift,
    /// Night staff outnumber Morning + Evening staff.
    ShiftDistribution,
    /// Pool does not follow previous pool + hired − fired.
    PoolContinuity,
    /// More staff assigned on a day than on the books.
    PoolExceeded,
    /// Consecutive-day shift pair without the minimum rest.
    RestPeriod,
    /// Rolling 7-day window above the per-employee shift cap.
    WeeklyCap,
    /// Rolling 7-day window above contract hours plus overtime.
    ContractHours,
    /// More hires on a day than allowed.
    HiringLimit,
    /// Pool above the category's maximum head count.
    HeadcountLimit,
    /// Rows missing or out of order.
    Layout,
}

impl Violation {
    /// Creates a violation.
    pub fn new(
        violation_type: ViolationType,
        day: Option<usize>,
        category: Option<StaffCategory>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            day,
            category,
            message: message.into(),
        }
    }
}

impl Schedule {
    /// Number of days covered.
    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    /// Whether the schedule is a proven optimum.
    pub fn is_optimal(&self) -> bool {
        self.status == ScheduleStatus::Optimal
    }

    /// Staffing cell for (day, shift, category).
    pub fn staffing(
        &self,
        day: usize,
        shift: Shift,
        category: StaffCategory,
    ) -> Option<&ShiftStaffing> {
        let idx = (day * Shift::COUNT + shift.index()) * StaffCategory::COUNT + category.index();
        self.staffing.get(idx)
    }

    /// Pool movement for (day, category).
    pub fn pool_movement(&self, day: usize, category: StaffCategory) -> Option<&PoolMovement> {
        self.movements
            .get(day * StaffCategory::COUNT + category.index())
    }

    /// All staffing rows of a day.
    pub fn rows_for_day(&self, day: usize) -> Vec<&ShiftStaffing> {
        self.staffing.iter().filter(|r| r.day == day).collect()
    }

    /// All staffing rows of a category.
    pub fn rows_for_category(&self, category: StaffCategory) -> Vec<&ShiftStaffing> {
        self.staffing
            .iter()
            .filter(|r| r.category == category)
            .collect()
    }

    /// Staff assigned to a shift on a day, summed over categories.
    pub fn shift_total(&self, day: usize, shift: Shift) -> u32 {
        self.staffing
            .iter()
            .filter(|r| r.day == day && r.shift == shift)
            .map(|r| r.assigned)
            .sum()
    }

    /// Total hires of a category over the horizon.
    pub fn total_hired(&self, category: StaffCategory) -> u32 {
        self.movements
            .iter()
            .filter(|m| m.category == category)
            .map(|m| m.hired)
            .sum()
    }

    /// Total departures of a category over the horizon.
    pub fn total_fired(&self, category: StaffCategory) -> u32 {
        self.movements
            .iter()
            .filter(|m| m.category == category)
            .map(|m| m.fired)
            .sum()
    }

    /// Pool of a category on the last day.
    pub fn final_pool(&self, category: StaffCategory) -> Option<u32> {
        let last = self.days.len().checked_sub(1)?;
        self.pool_movement(last, category).map(|m| m.pool)
    }

    /// Total overtime hours over the horizon.
    pub fn total_overtime_hours(&self) -> f64 {
        self.staffing.iter().map(|r| r.overtime_hours).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_schedule() -> Schedule {
        let start = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let days = vec![Day::new(0, start), Day::new(1, start.succ_opt().unwrap())];
        let mut staffing = Vec::new();
        for day in 0..2 {
            for shift in Shift::ALL {
                for category in StaffCategory::ALL {
                    let demand = if category == StaffCategory::Caregiver { 4 } else { 1 };
                    staffing.push(ShiftStaffing {
                        day,
                        shift,
                        category,
                        demand,
                        assigned: demand + day as u32,
                        overtime_hours: if category == StaffCategory::Support { 2.0 } else { 0.0 },
                    });
                }
            }
        }
        let mut movements = Vec::new();
        for day in 0..2 {
            for category in StaffCategory::ALL {
                movements.push(PoolMovement {
                    day,
                    category,
                    pool: 20,
                    hired: if day == 0 { 5 } else { 0 },
                    fired: if day == 1 && category == StaffCategory::Nurse { 1 } else { 0 },
                });
            }
        }
        Schedule {
            days,
            status: ScheduleStatus::Optimal,
            feasible: true,
            staffing,
            movements,
            costs: CostBreakdown::new(100.0, 10.0, 50.0, 5.0),
            category_costs: PerCategory::default(),
            objective_value: 165.0,
        }
    }

    #[test]
    fn test_cost_breakdown_total() {
        let c = CostBreakdown::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(c.total, 10.0);
        let mut sum = c;
        sum += CostBreakdown::new(1.0, 0.0, 0.0, 0.0);
        assert_eq!(sum.total, 11.0);
        assert_eq!(sum.regular, 2.0);
    }

    #[test]
    fn test_staffing_lookup_matches_layout() {
        let s = sample_schedule();
        for day in 0..2 {
            for shift in Shift::ALL {
                for category in StaffCategory::ALL {
                    let row = s.staffing(day, shift, category).unwrap();
                    assert_eq!((row.day, row.shift, row.category), (day, shift, category));
                }
            }
        }
        assert!(s.staffing(2, Shift::Morning, StaffCategory::Caregiver).is_none());
    }

    #[test]
    fn test_pool_movement_lookup() {
        let s = sample_schedule();
        let m = s.pool_movement(1, StaffCategory::Nurse).unwrap();
        assert_eq!(m.fired, 1);
        assert_eq!(s.total_hired(StaffCategory::Caregiver), 5);
        assert_eq!(s.total_fired(StaffCategory::Nurse), 1);
        assert_eq!(s.final_pool(StaffCategory::Support), Some(20));
    }

    #[test]
    fn test_shift_total_and_rows() {
        let s = sample_schedule();
        // Day 1: caregiver 5 + nurse 2 + support 2
        assert_eq!(s.shift_total(1, Shift::Night), 9);
        assert_eq!(s.rows_for_day(0).len(), 9);
        assert_eq!(s.rows_for_category(StaffCategory::Nurse).len(), 6);
        assert!((s.total_overtime_hours() - 12.0).abs() < 1e-10);
    }

    #[test]
    fn test_surplus() {
        let s = sample_schedule();
        let row = s.staffing(1, Shift::Morning, StaffCategory::Caregiver).unwrap();
        assert_eq!(row.surplus(), 1);
    }

    #[test]
    fn test_schedule_serializes() {
        let s = sample_schedule();
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"status\":\"optimal\""));
        let back: Schedule = serde_json::from_str(&json).unwrap();
        assert_eq!(back.staffing.len(), s.staffing.len());
    }
}
