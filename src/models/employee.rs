//! Employee model.
//!
//! Two shapes exist: [`EmployeeRecord`] is the raw input record as it
//! arrives from a caller, [`Employee`] is the normalized roster member the
//! encoders work with. Unmet demand is absorbed by [`UnfilledSlack`], a
//! reserved-capacity participant that is never an employee.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Reserved display name of the slack participant.
pub const UNFILLED: &str = "Unfilled";

/// Default number of shift slots the slack participant may absorb.
pub const DEFAULT_MAX_UNFILLED: i64 = 7;

/// Input record for one employee.
///
/// Day indices are zero-based offsets into the horizon. Each listed day
/// applies to both working shifts of that day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// Display name, unique within a request.
    pub name: String,
    /// Days the employee would like to work.
    #[serde(default)]
    pub preferred: Vec<usize>,
    /// Days the employee would rather not work.
    #[serde(default)]
    pub unavailable: Vec<usize>,
    /// Minimum number of working shifts over the horizon.
    #[serde(default)]
    pub min: i64,
    /// Maximum number of working shifts over the horizon.
    pub max: i64,
    /// Whether both shifts of a day may be worked.
    #[serde(default)]
    pub prefer_double: bool,
}

impl EmployeeRecord {
    /// Creates a record with a desired shift range and no day requests.
    pub fn new(name: impl Into<String>, min: i64, max: i64) -> Self {
        Self {
            name: name.into(),
            preferred: Vec::new(),
            unavailable: Vec::new(),
            min,
            max,
            prefer_double: false,
        }
    }

    /// Sets the preferred days.
    pub fn with_preferred(mut self, days: Vec<usize>) -> Self {
        self.preferred = days;
        self
    }

    /// Sets the unavailable days.
    pub fn with_unavailable(mut self, days: Vec<usize>) -> Self {
        self.unavailable = days;
        self
    }

    /// Allows both shifts on the same day.
    pub fn with_double_shifts(mut self, allowed: bool) -> Self {
        self.prefer_double = allowed;
        self
    }
}

/// Inclusive range of working shifts over the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftRange {
    pub min: i64,
    pub max: i64,
}

impl ShiftRange {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, count: i64) -> bool {
        self.min <= count && count <= self.max
    }
}

/// A normalized roster member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Ordinal position in the roster (row of the work grid).
    pub index: usize,
    /// Display name.
    pub name: String,
    /// Desired number of working shifts.
    pub desired: ShiftRange,
    /// Days the employee asked for (deduplicated, sorted).
    pub preferred_days: BTreeSet<usize>,
    /// Days the employee asked to avoid (deduplicated, sorted).
    pub unavailable_days: BTreeSet<usize>,
    /// Whether morning and night may be worked on the same day.
    pub allows_double: bool,
}

impl Employee {
    /// Normalizes an input record into a roster member at `index`.
    pub fn from_record(index: usize, record: &EmployeeRecord) -> Self {
        Self {
            index,
            name: record.name.clone(),
            desired: ShiftRange::new(record.min, record.max),
            preferred_days: record.preferred.iter().copied().collect(),
            unavailable_days: record.unavailable.iter().copied().collect(),
            allows_double: record.prefer_double,
        }
    }

    /// Normalizes a list of records, assigning indices in input order.
    pub fn roster_from_records(records: &[EmployeeRecord]) -> Vec<Employee> {
        records
            .iter()
            .enumerate()
            .map(|(i, r)| Employee::from_record(i, r))
            .collect()
    }
}

/// Reserved capacity that absorbs staffing shortfalls.
///
/// Counts toward daily cover like an employee, is bounded by `capacity`
/// over the horizon, and is excluded from exclusivity, run-length,
/// weekly-count and transition rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnfilledSlack {
    /// Maximum number of shift slots left unfilled over the horizon.
    pub capacity: i64,
}

impl UnfilledSlack {
    pub fn new(capacity: i64) -> Self {
        Self { capacity }
    }

    /// Total-count range of the slack row: nothing required, `capacity` allowed.
    pub fn range(&self) -> ShiftRange {
        ShiftRange::new(0, self.capacity)
    }
}

impl Default for UnfilledSlack {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNFILLED)
    }
}

/// A row of the work grid: a real employee or the slack participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Participant {
    Employee(usize),
    Unfilled,
}

impl Participant {
    /// Whether this participant is the slack row.
    #[inline]
    pub fn is_unfilled(self) -> bool {
        matches!(self, Participant::Unfilled)
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Participant::Employee(index) => write!(f, "employee {index}"),
            Participant::Unfilled => f.write_str(UNFILLED),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_defaults_from_json() {
        let json = r#"{"name": "Ana", "max": 10}"#;
        let record: EmployeeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.min, 0);
        assert!(record.preferred.is_empty());
        assert!(record.unavailable.is_empty());
        assert!(!record.prefer_double);
    }

    #[test]
    fn test_from_record_dedups_days() {
        let record = EmployeeRecord::new("Ana", 2, 5)
            .with_preferred(vec![3, 1, 3])
            .with_unavailable(vec![4, 4]);
        let e = Employee::from_record(0, &record);
        assert_eq!(e.preferred_days.iter().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(e.unavailable_days.len(), 1);
        assert_eq!(e.desired, ShiftRange::new(2, 5));
    }

    #[test]
    fn test_roster_indices_follow_input_order() {
        let records = vec![EmployeeRecord::new("A", 0, 1), EmployeeRecord::new("B", 0, 1)];
        let roster = Employee::roster_from_records(&records);
        assert_eq!(roster[0].index, 0);
        assert_eq!(roster[1].name, "B");
        assert_eq!(roster[1].index, 1);
    }

    #[test]
    fn test_unfilled_slack_range() {
        let slack = UnfilledSlack::default();
        assert_eq!(slack.range(), ShiftRange::new(0, DEFAULT_MAX_UNFILLED));
        assert!(slack.range().contains(0));
        assert!(!slack.range().contains(DEFAULT_MAX_UNFILLED + 1));
    }

    #[test]
    fn test_participant_display() {
        assert_eq!(Participant::Unfilled.to_string(), "Unfilled");
        assert_eq!(Participant::Employee(2).to_string(), "employee 2");
        assert!(Participant::Unfilled.is_unfilled());
    }
}
