//! Staff categories, shifts, and per-key tables.
//!
//! Categories and shifts are closed enumerations. Tables keyed by them
//! (`PerCategory`, `PerShift`) are plain structs with one field per key,
//! so they serialize as readable TOML/JSON maps and can never miss a key.
//!
//! # Shift Times
//! Default shift starts are 06:00 (Morning), 14:00 (Evening) and
//! 22:00 (Night). The shift length is a cost-model parameter
//! (`CostModel::shift_hours`) and is passed in where gaps are computed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A shift within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shift {
    /// Day shift starting in the early morning.
    Morning,
    /// Afternoon/evening shift.
    Evening,
    /// Overnight shift, ending on the following calendar day.
    Night,
}

impl Shift {
    /// All shifts in chronological order within a day.
    pub const ALL: [Shift; 3] = [Shift::Morning, Shift::Evening, Shift::Night];

    /// Number of shifts per day.
    pub const COUNT: usize = 3;

    /// Dense index (0..COUNT).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Shift::Morning => 0,
            Shift::Evening => 1,
            Shift::Night => 2,
        }
    }

    /// Start hour relative to the day's midnight.
    pub fn start_hour(self) -> f64 {
        match self {
            Shift::Morning => 6.0,
            Shift::Evening => 14.0,
            Shift::Night => 22.0,
        }
    }

    /// Whether the shift counts towards the daytime share (Morning or Evening).
    #[inline]
    pub fn is_daytime(self) -> bool {
        !matches!(self, Shift::Night)
    }

    /// Hours of rest between finishing `self` on day D and starting
    /// `next` on day D+1, for shifts of `shift_hours` length.
    pub fn rest_gap_hours(self, next: Shift, shift_hours: f64) -> f64 {
        let end = self.start_hour() + shift_hours;
        24.0 + next.start_hour() - end
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Shift::Morning => "Morning",
            Shift::Evening => "Evening",
            Shift::Night => "Night",
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A staff category. Headcounts are tracked per category, not per person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffCategory {
    /// Personal care staff.
    Caregiver,
    /// Licensed nursing staff. Barred from overtime by default.
    Nurse,
    /// Housekeeping, kitchen and other support staff.
    Support,
}

impl StaffCategory {
    /// All categories.
    pub const ALL: [StaffCategory; 3] = [
        StaffCategory::Caregiver,
        StaffCategory::Nurse,
        StaffCategory::Support,
    ];

    /// Number of categories.
    pub const COUNT: usize = 3;

    /// Dense index (0..COUNT).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            StaffCategory::Caregiver => 0,
            StaffCategory::Nurse => 1,
            StaffCategory::Support => 2,
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            StaffCategory::Caregiver => "Caregivers",
            StaffCategory::Nurse => "Nurses",
            StaffCategory::Support => "Support Staff",
        }
    }
}

impl fmt::Display for StaffCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One value per shift.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerShift<T> {
    pub morning: T,
    pub evening: T,
    pub night: T,
}

impl<T> PerShift<T> {
    /// Creates a table from explicit values.
    pub fn new(morning: T, evening: T, night: T) -> Self {
        Self {
            morning,
            evening,
            night,
        }
    }

    /// Builds a table by evaluating `f` for every shift.
    pub fn from_fn(mut f: impl FnMut(Shift) -> T) -> Self {
        Self {
            morning: f(Shift::Morning),
            evening: f(Shift::Evening),
            night: f(Shift::Night),
        }
    }

    /// Value for a shift.
    pub fn get(&self, shift: Shift) -> &T {
        match shift {
            Shift::Morning => &self.morning,
            Shift::Evening => &self.evening,
            Shift::Night => &self.night,
        }
    }

    /// Mutable value for a shift.
    pub fn get_mut(&mut self, shift: Shift) -> &mut T {
        match shift {
            Shift::Morning => &mut self.morning,
            Shift::Evening => &mut self.evening,
            Shift::Night => &mut self.night,
        }
    }

    /// Iterates `(shift, value)` pairs in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (Shift, &T)> {
        Shift::ALL.into_iter().map(move |s| (s, self.get(s)))
    }
}

/// One value per staff category.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerCategory<T> {
    pub caregiver: T,
    pub nurse: T,
    pub support: T,
}

impl<T> PerCategory<T> {
    /// Creates a table from explicit values.
    pub fn new(caregiver: T, nurse: T, support: T) -> Self {
        Self {
            caregiver,
            nurse,
            support,
        }
    }

    /// Builds a table by evaluating `f` for every category.
    pub fn from_fn(mut f: impl FnMut(StaffCategory) -> T) -> Self {
        Self {
            caregiver: f(StaffCategory::Caregiver),
            nurse: f(StaffCategory::Nurse),
            support: f(StaffCategory::Support),
        }
    }

    /// Value for a category.
    pub fn get(&self, category: StaffCategory) -> &T {
        match category {
            StaffCategory::Caregiver => &self.caregiver,
            StaffCategory::Nurse => &self.nurse,
            StaffCategory::Support => &self.support,
        }
    }

    /// Mutable value for a category.
    pub fn get_mut(&mut self, category: StaffCategory) -> &mut T {
        match category {
            StaffCategory::Caregiver => &mut self.caregiver,
            StaffCategory::Nurse => &mut self.nurse,
            StaffCategory::Support => &mut self.support,
        }
    }

    /// Iterates `(category, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (StaffCategory, &T)> {
        StaffCategory::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

/// Head-count table per (shift, category).
///
/// Used for weekday minimums and monthly historical demand.
pub type ShiftTable = PerCategory<PerShift<u32>>;

/// Looks up a head count in a `ShiftTable`.
#[inline]
pub fn table_value(table: &ShiftTable, shift: Shift, category: StaffCategory) -> u32 {
    *table.get(category).get(shift)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_indices_dense() {
        for (i, s) in Shift::ALL.iter().enumerate() {
            assert_eq!(s.index(), i);
        }
        for (i, c) in StaffCategory::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
    }

    #[test]
    fn test_rest_gaps_with_eight_hour_shifts() {
        // Night ends 06:00 next day, Morning starts 06:00 → no rest at all
        assert_eq!(Shift::Night.rest_gap_hours(Shift::Morning, 8.0), 0.0);
        assert_eq!(Shift::Night.rest_gap_hours(Shift::Evening, 8.0), 8.0);
        assert_eq!(Shift::Evening.rest_gap_hours(Shift::Morning, 8.0), 8.0);
        assert_eq!(Shift::Morning.rest_gap_hours(Shift::Morning, 8.0), 16.0);
        assert_eq!(Shift::Night.rest_gap_hours(Shift::Night, 8.0), 16.0);
    }

    #[test]
    fn test_daytime() {
        assert!(Shift::Morning.is_daytime());
        assert!(Shift::Evening.is_daytime());
        assert!(!Shift::Night.is_daytime());
    }

    #[test]
    fn test_per_category_from_fn() {
        let t = PerCategory::from_fn(|c| c.index() * 10);
        assert_eq!(*t.get(StaffCategory::Nurse), 10);
        assert_eq!(t.iter().map(|(_, v)| *v).sum::<usize>(), 30);
    }

    #[test]
    fn test_shift_table_serde_shape() {
        let table: ShiftTable = PerCategory::new(
            PerShift::new(10, 12, 8),
            PerShift::new(6, 5, 4),
            PerShift::new(5, 4, 3),
        );
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["caregiver"]["evening"], 12);
        assert_eq!(table_value(&table, Shift::Night, StaffCategory::Support), 3);
    }

    #[test]
    fn test_labels() {
        assert_eq!(StaffCategory::Support.to_string(), "Support Staff");
        assert_eq!(Shift::Night.to_string(), "Night");
    }
}
