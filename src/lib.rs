//! Shift rostering as constraint optimization.
//!
//! Encodes an employee shift-assignment problem (who works MORNING, NIGHT
//! or OFF on each day of a horizon) as a boolean/integer model with a
//! single minimized objective, hands it to a solver oracle, and decodes
//! the answer into a roster.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `ShiftType`, `Employee`, `UnfilledSlack`,
//!   `RosterPolicy`, `RosterRequest`, `Roster`
//! - **`cp`**: Model vocabulary (`CpModel`, literals, linear expressions),
//!   the `SolverOracle` contract, the default `good_lp` MILP oracle and a
//!   small exhaustive branch-and-bound oracle
//! - **`encoding`**: `ModelBuilder` and the sequence, sum, transition and
//!   cover encoders
//! - **`decode`**: Assignment → roster, timelines and penalty report
//! - **`solve`**: `RosterSolver` pipeline with a configurable timeout policy
//! - **`kpi`**: Roster quality metrics
//! - **`config`**: TOML configuration
//! - **`validation`**: Input integrity checks (names, ranges)
//!
//! # Example
//!
//! ```
//! use u_roster::models::{EmployeeRecord, RosterRequest};
//! use u_roster::solve::RosterSolver;
//!
//! let body = r#"[
//!     {"name": "Ana", "preferred": [0], "unavailable": [],
//!      "min": 0, "max": 30, "prefer_double": false},
//!     {"name": "Ben", "preferred": [], "unavailable": [1],
//!      "min": 0, "max": 30, "prefer_double": false}
//! ]"#;
//! let request = RosterRequest::from_json_str(body, 2).unwrap();
//! let outcome = RosterSolver::default().solve(&request).unwrap();
//! assert_eq!(outcome.to_pairs().len(), 2);
//! ```
//!
//! # References
//!
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of
//!   applications, methods and models"

pub mod config;
pub mod cp;
pub mod decode;
pub mod encoding;
pub mod error;
pub mod kpi;
pub mod models;
pub mod solve;
pub mod validation;

pub use error::{Result, RosterError};
