//! Cost-minimal staff rostering for residential care facilities.
//!
//! Plans, for every day of a horizon, how many staff of each category
//! (caregivers, nurses, support staff) work each shift (morning, evening,
//! night), how many are hired or released, and how much overtime is
//! worked, at minimum total labor cost.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Shift`, `StaffCategory`, `Horizon`,
//!   `Schedule`, `CostBreakdown`, `Violation`
//! - **`demand`**: Required head count per (day, shift, category) from
//!   monthly history, seasonal factors and the weekend uplift
//! - **`cost`**: Wage, overtime, hiring and release costs per category
//! - **`config`**: TOML-loadable solve configuration and labor rules
//! - **`problem`**: Validated, immutable input of one solve
//! - **`milp`**: Solver-neutral MILP model, the roster constraint builder,
//!   and the `MilpSolver` adapter (default: `good_lp` + microlp)
//! - **`heuristic`**: Greedy constant-pool roster used as warm start and fallback
//!   incumbent when the solver runs out of time
//! - **`extract`**: Raw assignment → verified `Schedule`
//! - **`validation`**: Roster rule verification and infeasibility diagnostics
//! - **`kpi`**: Staffing and cost indicators of a schedule
//! - **`planner`**: End-to-end solve and parallel batch solves
//!
//! # Example
//!
//! ```
//! use care_roster::config::RosterConfig;
//! use care_roster::planner::RosterPlanner;
//!
//! let config = RosterConfig::from_toml_str(r#"
//!     start_date = "2025-03-03"
//!     horizon_days = 1
//!
//!     [initial_staff]
//!     caregiver = 0
//!     nurse = 0
//!     support = 0
//!
//!     [demand]
//!     weekday_minimum = { caregiver = { morning = 5, evening = 5, night = 3 }, nurse = { morning = 0, evening = 0, night = 0 }, support = { morning = 0, evening = 0, night = 0 } }
//!     baseline = { caregiver = { morning = 5, evening = 5, night = 3 }, nurse = { morning = 0, evening = 0, night = 0 }, support = { morning = 0, evening = 0, night = 0 } }
//!     monthly = {}
//! "#).unwrap();
//!
//! let schedule = RosterPlanner::new().solve(&config).unwrap();
//! assert!(schedule.feasible);
//! assert_eq!(schedule.costs.hiring, 13.0 * 5000.0);
//! ```
//!
//! # References
//!
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of
//!   applications, methods and models"
//! - Burke et al. (2004), "The state of the art of nurse rostering"
//! - Wolsey (1998), "Integer Programming"

pub mod config;
pub mod cost;
pub mod demand;
pub mod error;
pub mod extract;
pub mod heuristic;
pub mod kpi;
pub mod milp;
pub mod models;
pub mod planner;
pub mod problem;
pub mod validation;
