//! Roster quality metrics (KPIs).
//!
//! Computes the staffing and cost indicators reported for a published
//! schedule.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Staff changes | Hires, departures and final pool per category |
//! | Staffed shifts | Total assigned head count over all cells |
//! | Overtime hours | Sum of overtime over all cells |
//! | Avg coverage surplus | Mean of `assigned - demand` per cell |
//! | Pool utilization | Staffed shifts / pool-days |
//! | Cost share | Fraction of total cost per component |

use serde::{Deserialize, Serialize};

use crate::models::{PerCategory, Schedule, StaffCategory};

/// Head-count change of one category over the horizon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffChange {
    pub hired: u32,
    pub fired: u32,
    /// Pool on the last day.
    pub final_pool: u32,
}

impl StaffChange {
    /// Hires minus departures.
    pub fn net(&self) -> i64 {
        self.hired as i64 - self.fired as i64
    }
}

/// Fraction of total cost per component (each 0.0..=1.0).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostShare {
    pub regular: f64,
    pub overtime: f64,
    pub hiring: f64,
    pub firing: f64,
}

/// Roster performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterKpi {
    /// Per-category hires, departures and final pool.
    pub staff_changes: PerCategory<StaffChange>,
    /// Total staff assigned over all (day, shift, category) cells.
    pub staffed_shifts: u32,
    /// Total overtime hours.
    pub overtime_hours: f64,
    /// Mean staff assigned above demand per cell.
    pub avg_coverage_surplus: f64,
    /// Staffed shifts divided by pool-days (0.0..=1.0 for a feasible roster).
    pub pool_utilization: f64,
    /// Share of total cost per component.
    pub cost_share: CostShare,
}

impl RosterKpi {
    /// Computes KPIs from a schedule.
    pub fn calculate(schedule: &Schedule) -> Self {
        let staff_changes = PerCategory::from_fn(|c: StaffCategory| StaffChange {
            hired: schedule.total_hired(c),
            fired: schedule.total_fired(c),
            final_pool: schedule.final_pool(c).unwrap_or(0),
        });

        let staffed_shifts: u32 = schedule.staffing.iter().map(|r| r.assigned).sum();
        let cells = schedule.staffing.len();
        let avg_coverage_surplus = if cells == 0 {
            0.0
        } else {
            schedule.staffing.iter().map(|r| r.surplus()).sum::<i64>() as f64 / cells as f64
        };

        let pool_days: u64 = schedule.movements.iter().map(|m| m.pool as u64).sum();
        let pool_utilization = if pool_days == 0 {
            0.0
        } else {
            staffed_shifts as f64 / pool_days as f64
        };

        let costs = &schedule.costs;
        let cost_share = if costs.total > 0.0 {
            CostShare {
                regular: costs.regular / costs.total,
                overtime: costs.overtime / costs.total,
                hiring: costs.hiring / costs.total,
                firing: costs.firing / costs.total,
            }
        } else {
            CostShare::default()
        };

        Self {
            staff_changes,
            staffed_shifts,
            overtime_hours: schedule.total_overtime_hours(),
            avg_coverage_surplus,
            pool_utilization,
            cost_share,
        }
    }

    /// Whether the roster stays within the given overtime and surplus limits.
    pub fn meets_thresholds(&self, max_overtime_hours: f64, max_avg_surplus: f64) -> bool {
        self.overtime_hours <= max_overtime_hours && self.avg_coverage_surplus <= max_avg_surplus
    }
}
