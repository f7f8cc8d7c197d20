//! Rostering domain models.
//!
//! Provides the core data types for describing a roster problem and its
//! solution. Staff are tracked as category-level head counts ("pools"),
//! not as named individuals.
//!
//! # Domain Mappings
//!
//! | care-roster | Meaning |
//! |-------------|---------|
//! | Horizon | Consecutive planning days |
//! | Shift | Morning / Evening / Night slot of a day |
//! | StaffCategory | Caregiver / Nurse / Support head-count pool |
//! | Schedule | Staffing levels, pool movements and costs |

mod calendar;
mod schedule;
mod staff;

pub use calendar::{Day, DayKind, Horizon, Month};
pub use schedule::{
    CostBreakdown, PoolMovement, Schedule, ScheduleStatus, ShiftStaffing, Violation,
    ViolationType,
};
pub use staff::{table_value, PerCategory, PerShift, Shift, ShiftTable, StaffCategory};
