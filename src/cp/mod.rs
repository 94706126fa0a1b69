//! Constraint-programming layer.
//!
//! Defines the model vocabulary the roster encoders write into, the
//! narrow [`SolverOracle`] contract that any search backend satisfies, the
//! default [`MilpOracle`] built on `good_lp`, and a small exhaustive
//! [`BranchAndBoundOracle`] used to cross-check it on small models.
//!
//! The encoders never search: they build a [`CpModel`], hand it to an
//! oracle once, and read back an [`Assignment`].
//!
//! # Reference
//! - Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"
//! - Perron & Didier (2024), "CP-SAT", Google OR-Tools

mod branch_and_bound;
mod milp;
mod model;
mod oracle;

pub use branch_and_bound::BranchAndBoundOracle;
pub use milp::MilpOracle;
pub use model::{
    Assignment, BoolVar, Constraint, CpModel, IntDomain, IntVar, LinearExpr, Literal, Violation,
};
pub use oracle::{
    LogObserver, OracleError, SearchStats, SolutionEvent, SolutionObserver, SolveParams,
    SolveStatus, SolverOracle, SolverResponse,
};
