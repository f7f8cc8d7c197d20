//! Planning horizon and calendar days.
//!
//! A horizon is an ordered run of consecutive calendar days starting at a
//! given date. Each day knows its month (for seasonal demand) and whether
//! it falls on a weekend (for the weekend demand multiplier).
//!
//! # Day Kinds
//! Monday–Friday are weekdays; Saturday and Sunday are weekend days.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigError;

/// Calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    /// All months in calendar order.
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Month from its 1-based number.
    pub fn from_number(number: u32) -> Option<Self> {
        Self::ALL.get(number.checked_sub(1)? as usize).copied()
    }

    /// 1-based month number.
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    /// Month of a date.
    pub fn of(date: NaiveDate) -> Self {
        // month0() is always in 0..12
        Self::ALL[date.month0() as usize]
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Weekday or weekend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayKind {
    Weekday,
    Weekend,
}

impl DayKind {
    /// Classifies a date.
    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => DayKind::Weekend,
            _ => DayKind::Weekday,
        }
    }
}

/// A day in the planning horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    /// Position in the horizon (0-based).
    pub index: usize,
    /// Calendar date.
    pub date: NaiveDate,
    /// Weekday/weekend tag.
    pub kind: DayKind,
    /// Calendar month of `date`.
    pub month: Month,
}

impl Day {
    /// Creates a day from its position and date.
    pub fn new(index: usize, date: NaiveDate) -> Self {
        Self {
            index,
            date,
            kind: DayKind::of(date),
            month: Month::of(date),
        }
    }

    /// Whether this is a weekend day.
    #[inline]
    pub fn is_weekend(&self) -> bool {
        self.kind == DayKind::Weekend
    }
}

/// Ordered sequence of consecutive days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Horizon {
    days: Vec<Day>,
}

impl Horizon {
    /// Creates a horizon of `length` days starting at `start`.
    ///
    /// # Errors
    /// `ConfigError::Invalid` if `length` is zero or the range runs past
    /// the representable calendar.
    pub fn new(start: NaiveDate, length: usize) -> Result<Self, ConfigError> {
        if length == 0 {
            return Err(ConfigError::Invalid(
                "horizon must contain at least one day".into(),
            ));
        }
        let days = (0..length)
            .map(|i| {
                start
                    .checked_add_days(Days::new(i as u64))
                    .map(|date| Day::new(i, date))
                    .ok_or_else(|| {
                        ConfigError::Invalid(format!(
                            "horizon of {length} days from {start} leaves the calendar range"
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { days })
    }

    /// Days in order.
    pub fn days(&self) -> &[Day] {
        &self.days
    }

    /// Day at a position.
    pub fn day(&self, index: usize) -> Option<&Day> {
        self.days.get(index)
    }

    /// Number of days.
    #[inline]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Always false for a constructed horizon; provided for API symmetry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// First date of the horizon.
    pub fn start(&self) -> NaiveDate {
        self.days[0].date
    }

    /// Start indices of every full window of `window` consecutive days.
    ///
    /// Empty when the horizon is shorter than the window.
    pub fn window_starts(&self, window: usize) -> std::ops::Range<usize> {
        if window == 0 || self.days.len() < window {
            0..0
        } else {
            0..self.days.len() - window + 1
        }
    }

    /// Number of weekend days.
    pub fn weekend_count(&self) -> usize {
        self.days.iter().filter(|d| d.is_weekend()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_kind() {
        // 2025-03-01 is a Saturday
        assert_eq!(DayKind::of(date(2025, 3, 1)), DayKind::Weekend);
        assert_eq!(DayKind::of(date(2025, 3, 2)), DayKind::Weekend);
        assert_eq!(DayKind::of(date(2025, 3, 3)), DayKind::Weekday);
    }

    #[test]
    fn test_horizon_days() {
        let h = Horizon::new(date(2025, 3, 3), 7).unwrap();
        assert_eq!(h.len(), 7);
        assert_eq!(h.weekend_count(), 2);
        assert_eq!(h.day(6).unwrap().date, date(2025, 3, 9));
        assert!(h.days().iter().enumerate().all(|(i, d)| d.index == i));
    }

    #[test]
    fn test_horizon_crosses_month() {
        let h = Horizon::new(date(2025, 1, 30), 4).unwrap();
        assert_eq!(h.day(0).unwrap().month, Month::January);
        assert_eq!(h.day(2).unwrap().month, Month::February);
    }

    #[test]
    fn test_empty_horizon_rejected() {
        assert!(matches!(
            Horizon::new(date(2025, 1, 1), 0),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_window_starts() {
        let h = Horizon::new(date(2025, 1, 1), 10).unwrap();
        assert_eq!(h.window_starts(7), 0..4);
        let short = Horizon::new(date(2025, 1, 1), 5).unwrap();
        assert!(short.window_starts(7).is_empty());
    }

    #[test]
    fn test_month_numbers() {
        assert_eq!(Month::from_number(1), Some(Month::January));
        assert_eq!(Month::from_number(12), Some(Month::December));
        assert_eq!(Month::from_number(0), None);
        assert_eq!(Month::from_number(13), None);
        assert_eq!(Month::March.number(), 3);
        assert_eq!(Month::of(date(2024, 12, 31)), Month::December);
    }
}
