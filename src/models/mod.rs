//! Rostering domain models.
//!
//! Provides the input records, normalized employees, policy rules and
//! the decoded roster.
//!
//! # Domain Mappings
//!
//! | u-roster | Clinic | Model |
//! |----------|--------|-------|
//! | Employee | Doctor / nurse | Row of the work grid |
//! | UnfilledSlack | Locum budget | Extra row absorbing shortfalls |
//! | ShiftType | Morning / night / off | Column group of the work grid |
//! | Roster | Duty rota | Decoded assignment |

mod employee;
mod policy;
mod request;
mod roster;
mod shift;

pub use employee::{
    Employee, EmployeeRecord, Participant, ShiftRange, UnfilledSlack, DEFAULT_MAX_UNFILLED,
    UNFILLED,
};
pub use policy::{
    CoverDemand, ExcessCoverRates, RosterPolicy, ShiftRule, SoftBounds, TransitionRule,
    WorkloadCosts, DAYS_PER_WEEK,
};
pub use request::RosterRequest;
pub use roster::{Assignee, PenaltyReport, Roster, RosterDay, Timeline};
pub use shift::ShiftType;
