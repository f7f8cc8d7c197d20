//! Roster configuration.
//!
//! Load a solve configuration from TOML, or build one in code. Every
//! section is optional and falls back to the facility defaults.
//!
//! # Examples
//!
//! ```
//! use care_roster::config::RosterConfig;
//! use care_roster::models::StaffCategory;
//! use std::time::Duration;
//!
//! let config = RosterConfig::from_toml_str(r#"
//!     start_date = "2025-01-06"
//!     horizon_days = 14
//!     time_limit_secs = 30
//!
//!     [initial_staff]
//!     caregiver = 40
//!     nurse = 30
//!     support = 20
//!
//!     [demand]
//!     weekend_multiplier = 1.10
//!
//!     [rules.max_daily_hires]
//!     caregiver = 10
//! "#).unwrap();
//!
//! assert_eq!(config.horizon_days, 14);
//! assert_eq!(config.time_limit(), Some(Duration::from_secs(30)));
//! assert_eq!(*config.rules.max_daily_hires.get(StaffCategory::Caregiver), Some(10));
//! assert!(config.validate().is_ok());
//! ```

use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cost::CostModel;
use crate::demand::DemandModel;
use crate::error::ConfigError;
use crate::models::{Horizon, PerCategory};
use crate::problem::RosterProblem;

/// Secondary objective applied among equal-cost rosters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Accept whichever optimum the solver returns.
    #[default]
    SolverChoice,
    /// Prefer the smallest total head count among equal-cost rosters.
    MinimizeHeadcount,
}

/// Labor rules and staffing limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterRules {
    /// Minimum hours between the end of one shift and the start of the
    /// next shift worked from the same pool.
    pub min_rest_hours: f64,
    /// Maximum shifts per employee in any rolling 7-day window.
    pub max_shifts_per_week: u32,
    /// Contracted weekly hours per employee; hours above this are overtime.
    pub weekly_contract_hours: PerCategory<f64>,
    /// Maximum hires per day, per category (`None` = unlimited).
    pub max_daily_hires: PerCategory<Option<u32>>,
    /// Maximum head count, per category (`None` = unlimited).
    pub max_headcount: PerCategory<Option<u32>>,
}

impl Default for RosterRules {
    fn default() -> Self {
        Self {
            min_rest_hours: 12.0,
            max_shifts_per_week: 6,
            weekly_contract_hours: PerCategory::new(40.0, 35.0, 30.0),
            max_daily_hires: PerCategory::default(),
            max_headcount: PerCategory::default(),
        }
    }
}

impl RosterRules {
    /// Checks rule values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_rest_hours.is_finite() || !(0.0..=24.0).contains(&self.min_rest_hours) {
            return Err(ConfigError::Invalid(format!(
                "min_rest_hours must be within [0, 24], got {}",
                self.min_rest_hours
            )));
        }
        if !(1..=7).contains(&self.max_shifts_per_week) {
            return Err(ConfigError::Invalid(format!(
                "max_shifts_per_week must be within [1, 7], got {}",
                self.max_shifts_per_week
            )));
        }
        for (category, hours) in self.weekly_contract_hours.iter() {
            if !hours.is_finite() || *hours <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{category}: weekly_contract_hours must be positive, got {hours}"
                )));
            }
        }
        Ok(())
    }
}

/// Input configuration of one solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct RosterConfig {
    /// First day of the horizon.
    pub start_date: NaiveDate,
    /// Number of days to roster.
    pub horizon_days: usize,
    /// Head count per category before the first day.
    pub initial_staff: PerCategory<u32>,
    /// Cost parameters.
    pub costs: CostModel,
    /// Demand parameters.
    pub demand: DemandModel,
    /// Labor rules and limits.
    pub rules: RosterRules,
    /// Secondary objective among equal-cost rosters.
    pub tie_break: TieBreak,
    /// Solver time budget in seconds (`None` = run to optimality).
    pub time_limit_secs: Option<f64>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::default(),
            horizon_days: 28,
            initial_staff: PerCategory::new(40, 30, 20),
            costs: CostModel::default(),
            demand: DemandModel::default(),
            rules: RosterRules::default(),
            tie_break: TieBreak::default(),
            time_limit_secs: None,
        }
    }
}

impl RosterConfig {
    /// Creates a default configuration starting at `start_date`.
    pub fn new(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            ..Self::default()
        }
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Sets the horizon length.
    pub fn with_horizon_days(mut self, days: usize) -> Self {
        self.horizon_days = days;
        self
    }

    /// Sets the initial head counts.
    pub fn with_initial_staff(mut self, staff: PerCategory<u32>) -> Self {
        self.initial_staff = staff;
        self
    }

    /// Sets the cost model.
    pub fn with_costs(mut self, costs: CostModel) -> Self {
        self.costs = costs;
        self
    }

    /// Sets the demand model.
    pub fn with_demand(mut self, demand: DemandModel) -> Self {
        self.demand = demand;
        self
    }

    /// Sets the labor rules.
    pub fn with_rules(mut self, rules: RosterRules) -> Self {
        self.rules = rules;
        self
    }

    /// Sets the tie-break policy.
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Sets the solver time budget.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit_secs = Some(limit.as_secs_f64());
        self
    }

    /// Solver time budget.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs
            .filter(|s| *s > 0.0)
            .and_then(|s| Duration::try_from_secs_f64(s).ok())
    }

    /// Checks every section. Nothing is clamped.
    ///
    /// # Errors
    /// `ConfigError::Invalid` describing the first invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.horizon_days == 0 {
            return Err(ConfigError::Invalid(
                "horizon_days must be at least 1".into(),
            ));
        }
        if let Some(secs) = self.time_limit_secs {
            if !secs.is_finite() || secs <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "time_limit_secs must be positive, got {secs}"
                )));
            }
            if Duration::try_from_secs_f64(secs).is_err() {
                return Err(ConfigError::Invalid(format!(
                    "time_limit_secs is too large, got {secs}"
                )));
            }
        }
        self.costs.validate()?;
        self.demand.validate()?;
        self.rules.validate()
    }

    /// Validates the configuration and builds the solve input.
    pub fn problem(&self) -> Result<RosterProblem, ConfigError> {
        self.validate()?;
        let horizon = Horizon::new(self.start_date, self.horizon_days)?;
        let demand = self.demand.table(&horizon);
        RosterProblem::new(
            horizon,
            demand,
            self.costs.clone(),
            self.initial_staff,
            self.rules.clone(),
        )
        .map(|p| p.with_tie_break(self.tie_break))
    }
}
