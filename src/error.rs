//! Error types.
//!
//! Every failure path returns one of these; nothing is downgraded to a
//! default value. A timed-out solve that still has a feasible incumbent is
//! not an error: it yields a `Schedule` tagged `SubOptimal`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::models::StaffCategory;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The model has an unbounded objective. Every variable is bounded by
    /// construction, so this means the inputs are malformed.
    #[error("Model is unbounded; check cost parameters and limits")]
    UnboundedModel,
}

/// Roster rule a demand conflict was detected under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictRule {
    /// Daily demand over all shifts exceeds the reachable pool.
    DailyPool,
    /// Demand of a rest-excluded shift pair exceeds the reachable pool.
    RestPeriod,
    /// Weekly shifts exceed the per-employee cap times the reachable pool.
    WeeklyCap,
    /// Weekly hours exceed contract hours for a category without overtime.
    ContractHours,
}

impl fmt::Display for ConflictRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConflictRule::DailyPool => "daily pool",
            ConflictRule::RestPeriod => "rest period",
            ConflictRule::WeeklyCap => "weekly cap",
            ConflictRule::ContractHours => "contract hours",
        };
        f.write_str(s)
    }
}

/// Demand that no reachable head count can cover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandConflict {
    /// Day index (for windowed rules, the last day of the window).
    pub day: usize,
    pub category: StaffCategory,
    pub rule: ConflictRule,
    /// Capacity the demand requires, in the rule's unit.
    pub required: f64,
    /// Largest capacity reachable under the hiring and head-count limits.
    pub reachable: f64,
}

impl fmt::Display for DemandConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "day {} {} ({}): requires {:.1}, at most {:.1} reachable",
            self.day, self.category, self.rule, self.required, self.reachable
        )
    }
}

/// Roster solving error.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("{}", infeasible_message(.conflicts))]
    Infeasible { conflicts: Vec<DemandConflict> },

    #[error("Solver exceeded its {budget:?} budget without a feasible incumbent")]
    SolverTimeout { budget: Duration },

    #[error("Internal consistency error: {0}")]
    InternalConsistency(String),

    #[error("Solver error: {0}")]
    Solver(String),
}

fn infeasible_message(conflicts: &[DemandConflict]) -> String {
    if conflicts.is_empty() {
        return "Model is infeasible: the roster rules conflict jointly".to_string();
    }
    let listed: Vec<String> = conflicts.iter().take(5).map(|c| c.to_string()).collect();
    let more = conflicts.len().saturating_sub(listed.len());
    let mut msg = format!("Model is infeasible: {}", listed.join("; "));
    if more > 0 {
        msg.push_str(&format!(" (and {more} more)"));
    }
    msg
}

impl RosterError {
    /// Demand conflicts, when the error is an infeasibility.
    pub fn conflicts(&self) -> &[DemandConflict] {
        match self {
            RosterError::Infeasible { conflicts } => conflicts,
            _ => &[],
        }
    }
}
