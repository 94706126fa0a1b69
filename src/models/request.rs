//! Scheduling request.

use serde::{Deserialize, Serialize};

use super::EmployeeRecord;

/// Everything needed to build one roster: the employee records and the
/// horizon length in days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRequest {
    /// Employee input records, in roster order.
    pub employees: Vec<EmployeeRecord>,
    /// Horizon length in days. Day 0 is a Monday for cover purposes.
    pub num_days: usize,
}

impl RosterRequest {
    /// Creates a request.
    pub fn new(employees: Vec<EmployeeRecord>, num_days: usize) -> Self {
        Self {
            employees,
            num_days,
        }
    }

    /// Parses a JSON array of employee records.
    ///
    /// The horizon travels separately (e.g. as a query parameter), so it
    /// is passed in rather than read from the body.
    pub fn from_json_str(body: &str, num_days: usize) -> Result<Self, serde_json::Error> {
        let employees: Vec<EmployeeRecord> = serde_json::from_str(body)?;
        Ok(Self::new(employees, num_days))
    }

    /// Whether there is nothing to schedule.
    pub fn is_trivial(&self) -> bool {
        self.num_days == 0 || self.employees.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_str() {
        let body = r#"[
            {"name": "Ana", "preferred": [1, 2], "unavailable": [5],
             "min": 2, "max": 10, "prefer_double": false},
            {"name": "Ben", "preferred": [], "unavailable": [],
             "min": 0, "max": 30, "prefer_double": true}
        ]"#;
        let request = RosterRequest::from_json_str(body, 14).unwrap();
        assert_eq!(request.num_days, 14);
        assert_eq!(request.employees.len(), 2);
        assert_eq!(request.employees[0].preferred, vec![1, 2]);
        assert!(request.employees[1].prefer_double);
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(RosterRequest::from_json_str(r#"[{"name": "Ana"}]"#, 7).is_err());
        let negative_day = r#"[{"name": "Ana", "max": 3, "preferred": [-1]}]"#;
        assert!(RosterRequest::from_json_str(negative_day, 7).is_err());
    }

    #[test]
    fn test_is_trivial() {
        assert!(RosterRequest::new(vec![], 7).is_trivial());
        assert!(RosterRequest::new(vec![EmployeeRecord::new("A", 0, 1)], 0).is_trivial());
        assert!(!RosterRequest::new(vec![EmployeeRecord::new("A", 0, 1)], 1).is_trivial());
    }
}
